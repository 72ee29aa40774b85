//! Forward-only `<node>`/`<way>` reader built on `quick-xml` events.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use osm_clean_osm_models::{Attributes, OsmElement, OsmNode, OsmTag, OsmWay};
use quick_xml::events::{BytesStart, Event};

use crate::ReadError;

/// One parser event reduced to what the reader acts on, so the event
/// buffer borrow ends before any state is touched.
enum Step {
    Open {
        name: String,
        attributes: Attributes,
        empty: bool,
    },
    Close(String),
    Eof,
    Ignore,
}

/// Streaming reader yielding nodes and ways in document order.
///
/// Relations (and anything else that is not a node or way) are skipped,
/// including their `<tag>` and `<member>` children.
pub struct OsmReader<R: BufRead> {
    reader: quick_xml::Reader<R>,
    buf: Vec<u8>,
    current: Option<OsmElement>,
    finished: bool,
}

impl OsmReader<BufReader<File>> {
    /// Opens an OSM XML file for streaming.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReadError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| ReadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        log::debug!("Opened OSM extract {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> OsmReader<R> {
    /// Wraps any buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            reader: quick_xml::Reader::from_reader(inner),
            buf: Vec::new(),
            current: None,
            finished: false,
        }
    }

    /// Number of input bytes consumed so far.
    #[must_use]
    pub fn byte_position(&self) -> u64 {
        u64::try_from(self.reader.buffer_position()).unwrap_or(u64::MAX)
    }

    fn next_step(&mut self) -> Result<Step, ReadError> {
        self.buf.clear();
        let position = self.byte_position();
        let event = self
            .reader
            .read_event_into(&mut self.buf)
            .map_err(|e| ReadError::Xml {
                position,
                source: e,
            })?;

        let step = match event {
            Event::Start(start) => Step::Open {
                name: element_name(&start),
                attributes: read_attributes(&start, position)?,
                empty: false,
            },
            Event::Empty(start) => Step::Open {
                name: element_name(&start),
                attributes: read_attributes(&start, position)?,
                empty: true,
            },
            Event::End(end) => Step::Close(String::from_utf8_lossy(end.name().as_ref()).into_owned()),
            Event::Eof => Step::Eof,
            _ => Step::Ignore,
        };
        Ok(step)
    }

    fn next_element(&mut self) -> Result<Option<OsmElement>, ReadError> {
        loop {
            let position = self.byte_position();
            match self.next_step()? {
                Step::Open {
                    name,
                    attributes,
                    empty,
                } => match name.as_str() {
                    "node" => {
                        self.current = Some(OsmElement::Node(OsmNode {
                            attributes,
                            tags: Vec::new(),
                        }));
                        if empty {
                            return Ok(self.current.take());
                        }
                    }
                    "way" => {
                        self.current = Some(OsmElement::Way(OsmWay {
                            attributes,
                            ..OsmWay::default()
                        }));
                        if empty {
                            return Ok(self.current.take());
                        }
                    }
                    "tag" => {
                        if let Some(current) = self.current.as_mut() {
                            let tag = OsmTag {
                                key: required(&attributes, "tag", "k", position)?,
                                value: required(&attributes, "tag", "v", position)?,
                            };
                            match current {
                                OsmElement::Node(node) => node.tags.push(tag),
                                OsmElement::Way(way) => way.tags.push(tag),
                            }
                        }
                    }
                    "nd" => {
                        if let Some(OsmElement::Way(way)) = self.current.as_mut() {
                            way.node_refs
                                .push(required(&attributes, "nd", "ref", position)?);
                        }
                    }
                    other => log::trace!("Skipping <{other}>"),
                },
                Step::Close(name) => {
                    if (name == "node" || name == "way") && self.current.is_some() {
                        return Ok(self.current.take());
                    }
                }
                Step::Eof => {
                    if let Some(open) = self.current.take() {
                        return Err(ReadError::Truncated(open.kind().to_string()));
                    }
                    return Ok(None);
                }
                Step::Ignore => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmReader<R> {
    type Item = Result<OsmElement, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn read_attributes(start: &BytesStart<'_>, position: u64) -> Result<Attributes, ReadError> {
    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ReadError::Xml {
            position,
            source: quick_xml::Error::from(e),
        })?;
        let value = attr.unescape_value().map_err(|e| ReadError::Xml {
            position,
            source: e,
        })?;
        attributes.insert(
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value.into_owned(),
        );
    }
    Ok(attributes)
}

fn required(
    attributes: &Attributes,
    element: &str,
    attribute: &'static str,
    position: u64,
) -> Result<String, ReadError> {
    attributes
        .get(attribute)
        .map(ToString::to_string)
        .ok_or_else(|| ReadError::MissingAttribute {
            element: element.to_string(),
            attribute,
            position,
        })
}

#[cfg(test)]
mod tests {
    use osm_clean_osm_models::ElementKind;

    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <bounds minlat="51.5" minlon="-0.2" maxlat="51.6" maxlon="0.0"/>
  <node id="1" lat="51.51" lon="-0.12" user="alice" uid="10" version="2" changeset="100" timestamp="2016-01-01T00:00:00Z"/>
  <node id="2" lat="51.52" lon="-0.13" user="bob" uid="11" version="1" changeset="101" timestamp="2016-01-02T00:00:00Z">
    <tag k="addr:street" v="Baker St"/>
    <tag k="addr:postcode" v="NW1 6XE"/>
  </node>
  <way id="10" user="carol" uid="12" version="3" changeset="102" timestamp="2016-01-03T00:00:00Z">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="residential"/>
  </way>
  <relation id="20" user="dave" uid="13" version="1" changeset="103" timestamp="2016-01-04T00:00:00Z">
    <member type="way" ref="10" role="outer"/>
    <tag k="type" v="multipolygon"/>
  </relation>
</osm>"#;

    fn read_all(xml: &str) -> Vec<OsmElement> {
        OsmReader::new(xml.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn yields_nodes_and_ways_in_document_order() {
        let elements = read_all(SAMPLE);
        let kinds: Vec<ElementKind> = elements.iter().map(OsmElement::kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Node, ElementKind::Node, ElementKind::Way]
        );
        let ids: Vec<&str> = elements.iter().filter_map(OsmElement::raw_id).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn attaches_tags_and_node_refs() {
        let elements = read_all(SAMPLE);
        assert!(elements[0].tags().is_empty());
        assert_eq!(elements[1].tags()[0], OsmTag::new("addr:street", "Baker St"));
        let OsmElement::Way(way) = &elements[2] else {
            panic!("expected a way");
        };
        assert_eq!(way.node_refs, vec!["1", "2"]);
        assert_eq!(way.tags, vec![OsmTag::new("highway", "residential")]);
    }

    #[test]
    fn relation_tags_are_not_attached_anywhere() {
        let elements = read_all(SAMPLE);
        assert!(
            elements
                .iter()
                .flat_map(OsmElement::tags)
                .all(|t| t.key != "type")
        );
    }

    #[test]
    fn byte_position_advances_while_reading() {
        let mut reader = OsmReader::new(SAMPLE.as_bytes());
        assert_eq!(reader.byte_position(), 0);
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.raw_id(), Some("1"));
        let after_first = reader.byte_position();
        assert!(after_first > 0);
        reader.next().unwrap().unwrap();
        assert!(reader.byte_position() > after_first);
        assert!(reader.byte_position() <= SAMPLE.len() as u64);
    }

    #[test]
    fn unescapes_attribute_values() {
        let xml = r#"<osm><node id="1" lat="0" lon="0"><tag k="name" v="Fish &amp; Chips"/></node></osm>"#;
        let elements = read_all(xml);
        assert_eq!(elements[0].tags()[0].value, "Fish & Chips");
    }

    #[test]
    fn tag_without_value_is_an_error() {
        let xml = r#"<osm><node id="1" lat="0" lon="0"><tag k="name"/></node></osm>"#;
        let result: Result<Vec<_>, _> = OsmReader::new(xml.as_bytes()).collect();
        assert!(matches!(
            result,
            Err(ReadError::MissingAttribute { attribute: "v", .. })
        ));
    }

    #[test]
    fn truncated_input_is_an_error() {
        let xml = r#"<osm><way id="1"><nd ref="2"/>"#;
        let result: Result<Vec<_>, _> = OsmReader::new(xml.as_bytes()).collect();
        assert!(result.is_err());
    }

    #[test]
    fn stops_after_first_error() {
        let xml = r#"<osm><node id="1" lat="0" lon="0"><tag k="a"/></node><node id="2"/></osm>"#;
        let mut reader = OsmReader::new(xml.as_bytes());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        let result = OsmReader::from_path("/definitely/not/here.osm");
        assert!(matches!(result, Err(ReadError::FileNotFound(_))));
    }
}
