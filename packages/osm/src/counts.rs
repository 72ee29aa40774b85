//! Exploratory tallies over an OSM extract.
//!
//! These are the first things to look at when handed an unfamiliar
//! extract: which XML elements it contains and which tag keys dominate.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::Event;

use crate::{OsmReader, ReadError};

/// Counts every XML element by name (`osm`, `bounds`, `node`, `tag`, ...).
///
/// Both `<x>` and `<x/>` forms count once.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not well-formed XML.
pub fn count_elements(path: &Path) -> Result<BTreeMap<String, u64>, ReadError> {
    if !path.exists() {
        return Err(ReadError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path).map_err(|e| ReadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    count_elements_from(BufReader::new(file))
}

/// Counts every XML element by name from any buffered reader.
///
/// # Errors
///
/// Returns an error if the input is not well-formed XML.
pub fn count_elements_from(input: impl BufRead) -> Result<BTreeMap<String, u64>, ReadError> {
    let mut reader = quick_xml::Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut counts = BTreeMap::new();

    loop {
        buf.clear();
        let position = u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX);
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                *counts.entry(name).or_insert(0) += 1;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ReadError::Xml {
                    position,
                    source: e,
                });
            }
        }
    }

    Ok(counts)
}

/// Counts how often each tag key appears on nodes and ways.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn count_tag_keys(path: &Path) -> Result<BTreeMap<String, u64>, ReadError> {
    tally_tag_keys(OsmReader::from_path(path)?)
}

/// Counts tag keys over an already-open reader.
///
/// # Errors
///
/// Returns the first read error encountered.
pub fn tally_tag_keys<R: BufRead>(reader: OsmReader<R>) -> Result<BTreeMap<String, u64>, ReadError> {
    let mut counts = BTreeMap::new();
    for element in reader {
        for tag in element?.tags() {
            *counts.entry(tag.key.clone()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Returns the `n` most frequent keys, most frequent first.
///
/// Ties are ordered alphabetically so the output is stable.
#[must_use]
pub fn top_tag_keys(counts: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}
