#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Relational projection of OpenStreetMap extracts.
//!
//! Streams an extract through the [`shape::Shaper`], optionally checks each
//! shaped element against a [`Schema`], and hands the result to a
//! [`sink::ProjectionSink`]. Street names are cleaned by the same
//! street-type classifier the audit uses, with one vocabulary for the whole
//! pass, so promotions made early in the file apply to everything after.

pub mod shape;
pub mod sink;
pub mod validate;

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use osm_clean_audit::street_type::StreetTypeAuditor;
use osm_clean_audit_models::Config;
use osm_clean_osm::progress::{ProgressCallback, REPORT_EVERY};
use osm_clean_osm::{OsmReader, ReadError};
use osm_clean_projection_models::{Schema, ShapedElement, ValidationFailure, ValidationMode};

use crate::shape::{ShapeError, Shaper};
use crate::sink::{ProjectionSink, SinkError};
use crate::validate::validate_element;

/// Errors that abort a projection pass.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// The extract could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// An element lacks a required attribute or has a malformed one.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Output could not be written.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Schema violation in strict mode.
    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    /// I/O error inspecting the input.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Knobs for a projection pass beyond the shared [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ProjectionOptions {
    /// What to do with elements that break the schema.
    pub validation: ValidationMode,
    /// Schema checked when validation is on.
    pub schema: Schema,
}

/// What a projection pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionSummary {
    pub nodes: u64,
    pub node_tags: u64,
    pub ways: u64,
    pub way_nodes: u64,
    pub way_tags: u64,
    /// Tags dropped for a problem character in their key.
    pub dropped_tags: u64,
    /// Elements left out for failing validation (report mode).
    pub skipped_elements: u64,
    /// Every failure seen in report mode.
    pub failures: Vec<ValidationFailure>,
    /// Street-type vocabulary at the end of the pass.
    pub vocabulary: Vec<String>,
    /// Street type → number of distinct street names bucketed under it.
    pub street_type_sizes: BTreeMap<String, usize>,
}

impl ProjectionSummary {
    fn record(&mut self, element: &ShapedElement) {
        match element {
            ShapedElement::Node { tags, .. } => {
                self.nodes += 1;
                self.node_tags += tags.len() as u64;
            }
            ShapedElement::Way { nodes, tags, .. } => {
                self.ways += 1;
                self.way_nodes += nodes.len() as u64;
                self.way_tags += tags.len() as u64;
            }
        }
    }
}

/// Projects every element produced by `reader` into `sink`.
///
/// # Errors
///
/// Returns an error if reading, shaping or writing fails, or on the first
/// schema violation in [`ValidationMode::Strict`].
pub fn project_reader<R: BufRead>(
    mut reader: OsmReader<R>,
    config: &Config,
    options: &ProjectionOptions,
    sink: &mut dyn ProjectionSink,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ProjectionSummary, ProjectionError> {
    let mut shaper = Shaper::new(StreetTypeAuditor::from_config(&config.street_types));
    let mut summary = ProjectionSummary::default();
    let mut seen: u64 = 0;

    while let Some(element) = reader.next() {
        let shaped = shaper.shape(&element?)?;
        seen += 1;
        if seen % REPORT_EVERY == 0 {
            progress.set_position(reader.byte_position());
            progress.set_message(format!("{seen} elements"));
        }

        if options.validation != ValidationMode::Off {
            let failures = validate_element(&shaped, &options.schema);
            if let Some(first) = failures.first() {
                if options.validation == ValidationMode::Strict {
                    return Err(ProjectionError::Validation(first.clone()));
                }
                for failure in &failures {
                    log::warn!("Skipping element: {failure}");
                }
                summary.skipped_elements += 1;
                summary.failures.extend(failures);
                continue;
            }
        }

        sink.write(&shaped)?;
        summary.record(&shaped);
    }

    sink.finish()?;
    summary.dropped_tags = shaper.dropped_tags();
    summary.vocabulary = shaper.streets().vocabulary().to_vec();
    summary.street_type_sizes = shaper
        .streets()
        .buckets()
        .iter()
        .map(|(street_type, names)| (street_type.clone(), names.len()))
        .collect();

    progress.finish(format!(
        "Projected {} nodes and {} ways",
        summary.nodes, summary.ways
    ));
    Ok(summary)
}

/// Opens `path` and projects it into `sink`.
///
/// # Errors
///
/// See [`project_reader`]; also fails if the file cannot be opened.
pub fn run_projection(
    path: &Path,
    config: &Config,
    options: &ProjectionOptions,
    sink: &mut dyn ProjectionSink,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ProjectionSummary, ProjectionError> {
    let reader = OsmReader::from_path(path)?;
    let total = std::fs::metadata(path)
        .map_err(|e| ProjectionError::Io {
            path: path.display().to_string(),
            source: e,
        })?
        .len();
    progress.set_total(total);

    log::info!(
        "Projecting {} (validation: {})",
        path.display(),
        options.validation
    );
    let summary = project_reader(reader, config, options, sink, progress)?;
    log::info!(
        "Projection complete: {} nodes, {} ways, {} tags dropped, {} elements skipped",
        summary.nodes,
        summary.ways,
        summary.dropped_tags,
        summary.skipped_elements
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use osm_clean_audit::postal_code::NOT_A_POSTAL_CODE;
    use osm_clean_osm::progress::null_progress;

    use super::*;
    use crate::sink::MemorySink;

    const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="51.5" lon="-0.1" user="alice" uid="10" version="2" changeset="5" timestamp="2015-01-01T00:00:00Z">
    <tag k="addr:street" v="Abbey Mews"/>
    <tag k="addr:postal_code" v="nowhere"/>
  </node>
  <node id="2" lat="51.6" lon="-0.2" version="1" changeset="6" timestamp="2015-01-02T00:00:00Z">
    <tag k="note" v=""/>
  </node>
  <way id="100" user="alice" uid="10" version="1" changeset="7" timestamp="2015-01-03T00:00:00Z">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="addr:street" v="Kings Mews"/>
    <tag k="bad key" v="x"/>
  </way>
  <relation id="9" version="1" changeset="8" timestamp="2015-01-04T00:00:00Z">
    <member type="way" ref="100" role="outer"/>
  </relation>
</osm>
"#;

    fn project(
        mode: ValidationMode,
        sink: &mut MemorySink,
    ) -> Result<ProjectionSummary, ProjectionError> {
        let options = ProjectionOptions {
            validation: mode,
            ..ProjectionOptions::default()
        };
        project_reader(
            OsmReader::new(EXTRACT.as_bytes()),
            &Config::default(),
            &options,
            sink,
            &null_progress(),
        )
    }

    #[test]
    fn writes_every_table() {
        let mut sink = MemorySink::default();
        let summary = project(ValidationMode::Off, &mut sink).unwrap();

        assert_eq!(sink.nodes.len(), 2);
        assert_eq!(sink.ways.len(), 1);
        assert_eq!(sink.way_nodes.len(), 2);
        assert_eq!(sink.node_tags.len(), 3);
        assert_eq!(sink.way_tags.len(), 1);
        assert!(sink.finished);
        assert_eq!(summary.dropped_tags, 1);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.way_nodes, 2);
    }

    #[test]
    fn cleans_values_and_fills_sentinels() {
        let mut sink = MemorySink::default();
        project(ValidationMode::Off, &mut sink).unwrap();

        assert_eq!(sink.node_tags[1].value, NOT_A_POSTAL_CODE);
        assert_eq!(sink.nodes[1].user, "unknown");
        assert_eq!(sink.nodes[1].uid, -1);
    }

    #[test]
    fn vocabulary_is_shared_across_the_pass() {
        let mut sink = MemorySink::default();
        let summary = project(ValidationMode::Off, &mut sink).unwrap();
        assert!(summary.vocabulary.contains(&"Mews".to_string()));
        assert_eq!(sink.way_tags[0].value, "Kings Mews");
        assert_eq!(summary.street_type_sizes["Mews"], 2);
    }

    #[test]
    fn report_mode_skips_invalid_elements() {
        let mut sink = MemorySink::default();
        let summary = project(ValidationMode::Report, &mut sink).unwrap();

        assert_eq!(summary.skipped_elements, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].id, 2);
        assert_eq!(summary.failures[0].field, "value");
        assert_eq!(sink.nodes.len(), 1);
        assert_eq!(sink.ways.len(), 1);
    }

    #[test]
    fn strict_mode_aborts() {
        let mut sink = MemorySink::default();
        let err = project(ValidationMode::Strict, &mut sink).unwrap_err();
        assert!(matches!(err, ProjectionError::Validation(ref f) if f.id == 2));
        assert!(!sink.finished);
    }

    #[test]
    fn missing_required_attribute_aborts() {
        let xml = r#"<osm><node id="1" lat="51.5" lon="-0.1" version="1" timestamp="t"/></osm>"#;
        let mut sink = MemorySink::default();
        let err = project_reader(
            OsmReader::new(xml.as_bytes()),
            &Config::default(),
            &ProjectionOptions::default(),
            &mut sink,
            &null_progress(),
        )
        .unwrap_err();
        assert!(matches!(err, ProjectionError::Shape(_)));
    }
}
