#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data-quality audit for OpenStreetMap extracts.
//!
//! The heart of the crate is [`street_type::StreetTypeAuditor`], which sorts
//! street names by their trailing word, rewrites known misspellings and
//! grows its vocabulary as it goes. Around it sit classifiers for postal
//! codes ([`postal_code`]), address styles ([`address_style`]), attribute
//! value kinds ([`attributes`]) and node coordinates ([`coordinates`]).
//!
//! [`Auditor`] runs all of them over a stream of elements and folds the
//! results into an [`AuditReport`]. [`audit_file`] is the one-call entry
//! point used by the CLI.

pub mod address_style;
pub mod attributes;
pub mod config;
pub mod coordinates;
pub mod postal_code;
pub mod street_type;
pub mod vocabulary;

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use osm_clean_audit_models::{
    AddressStyle, AuditReport, BoundingBox, Classification, Config, FieldGroup,
    PostalCodeCategory,
};
use osm_clean_osm::progress::{ProgressCallback, REPORT_EVERY};
use osm_clean_osm::{OsmElement, OsmReader, ReadError};

use crate::address_style::classify_address_style;
use crate::attributes::FieldTypes;
use crate::coordinates::{CoordinateStatus, check_coordinates};
use crate::postal_code::classify_postal_code;
use crate::street_type::StreetTypeAuditor;

/// Errors from an audit pass.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The extract could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// I/O error inspecting the input.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Accumulates every audit over one pass.
#[derive(Debug)]
pub struct Auditor {
    street_keys: BTreeSet<String>,
    postal_code_keys: BTreeSet<String>,
    area: BoundingBox,
    street_types: StreetTypeAuditor,
    postal_codes: BTreeMap<PostalCodeCategory, BTreeSet<String>>,
    postal_code_counts: BTreeMap<PostalCodeCategory, u64>,
    address_style_counts: BTreeMap<AddressStyle, u64>,
    coordinates_out_of_area: BTreeMap<String, (f64, f64)>,
    field_types: FieldTypes,
    nodes: u64,
    ways: u64,
}

impl Auditor {
    /// Creates an auditor with a fresh vocabulary seeded from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            street_keys: config.keys.street.iter().cloned().collect(),
            postal_code_keys: config.keys.postal_code.iter().cloned().collect(),
            area: config.area,
            street_types: StreetTypeAuditor::from_config(&config.street_types),
            postal_codes: BTreeMap::new(),
            postal_code_counts: BTreeMap::new(),
            address_style_counts: BTreeMap::new(),
            coordinates_out_of_area: BTreeMap::new(),
            field_types: FieldTypes::default(),
            nodes: 0,
            ways: 0,
        }
    }

    /// Audits one node or way.
    pub fn audit_element(&mut self, element: &OsmElement) {
        let (group, tag_group) = match element {
            OsmElement::Node(node) => {
                self.nodes += 1;
                self.audit_coordinates(element.raw_id(), &node.attributes);
                (FieldGroup::Node, FieldGroup::NodeTag)
            }
            OsmElement::Way(way) => {
                self.ways += 1;
                for node_ref in &way.node_refs {
                    self.field_types.record(FieldGroup::WayNode, "ref", node_ref);
                }
                (FieldGroup::Way, FieldGroup::WayTag)
            }
        };

        self.field_types.record_all(group, element.attributes());

        for tag in element.tags() {
            self.field_types.record(tag_group, "k", &tag.key);
            self.field_types.record(tag_group, "v", &tag.value);

            if self.postal_code_keys.contains(&tag.key) {
                self.audit_postal_code(&tag.value);
            }
            if self.street_keys.contains(&tag.key) {
                self.audit_street(&tag.value);
            }
        }
    }

    /// Classifies a street name by style and street type.
    pub fn audit_street(&mut self, value: &str) -> Classification {
        let style = classify_address_style(value);
        *self.address_style_counts.entry(style).or_insert(0) += 1;
        self.street_types.classify(value)
    }

    /// Classifies a postal code and records it under its category.
    pub fn audit_postal_code(&mut self, value: &str) -> PostalCodeCategory {
        let category = classify_postal_code(value);
        *self.postal_code_counts.entry(category).or_insert(0) += 1;
        self.postal_codes
            .entry(category)
            .or_default()
            .insert(value.to_string());
        category
    }

    fn audit_coordinates(&mut self, id: Option<&str>, attributes: &osm_clean_osm::Attributes) {
        let id = id.unwrap_or("?");
        match check_coordinates(attributes, &self.area) {
            CoordinateStatus::Inside => {}
            CoordinateStatus::Outside(lat, lon) => {
                log::trace!("Node {id} at ({lat}, {lon}) is outside the area of interest");
                self.coordinates_out_of_area
                    .insert(id.to_string(), (lat, lon));
            }
            CoordinateStatus::Unparseable => {
                log::warn!("Node {id} has unparseable coordinates, skipping area check");
            }
        }
    }

    /// The street-type classifier, for inspection mid-pass.
    #[must_use]
    pub const fn street_types(&self) -> &StreetTypeAuditor {
        &self.street_types
    }

    /// Finishes the pass.
    #[must_use]
    pub fn into_report(self) -> AuditReport {
        AuditReport {
            vocabulary: self.street_types.vocabulary().to_vec(),
            aliases: self.street_types.aliases().entries().clone(),
            street_types: self.street_types.buckets().clone(),
            candidate_street_types: self.street_types.candidates().clone(),
            classification_counts: self.street_types.counts().clone(),
            postal_codes: self.postal_codes,
            postal_code_counts: self.postal_code_counts,
            address_style_counts: self.address_style_counts,
            coordinates_out_of_area: self.coordinates_out_of_area,
            field_types: self.field_types.into_inner(),
            nodes: self.nodes,
            ways: self.ways,
        }
    }
}

/// Audits every element produced by `reader`.
///
/// # Errors
///
/// Returns an error if the reader fails part-way; nothing is reported for
/// a partially read extract.
pub fn audit_reader<R: BufRead>(
    mut reader: OsmReader<R>,
    config: &Config,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AuditReport, AuditError> {
    let mut auditor = Auditor::new(config);
    let mut seen: u64 = 0;

    while let Some(element) = reader.next() {
        auditor.audit_element(&element?);
        seen += 1;
        if seen % REPORT_EVERY == 0 {
            progress.set_position(reader.byte_position());
            progress.set_message(format!("{seen} elements"));
        }
    }

    let report = auditor.into_report();
    progress.finish(format!(
        "Audited {} nodes and {} ways",
        report.nodes, report.ways
    ));
    Ok(report)
}

/// Opens `path` and audits it.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not well-formed
/// OSM XML.
pub fn audit_file(
    path: &Path,
    config: &Config,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AuditReport, AuditError> {
    let reader = OsmReader::from_path(path)?;
    let total = std::fs::metadata(path)
        .map_err(|e| AuditError::Io {
            path: path.display().to_string(),
            source: e,
        })?
        .len();
    progress.set_total(total);

    log::info!("Auditing {}", path.display());
    let report = audit_reader(reader, config, progress)?;
    log::info!(
        "Audit complete: {} nodes, {} ways, {} street types",
        report.nodes,
        report.ways,
        report.street_types.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use osm_clean_audit_models::{AttributeKind, ClassificationOutcome};
    use osm_clean_osm::progress::null_progress;

    use super::*;

    const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="51.5074" lon="-0.1278" user="alice" uid="10" version="2" changeset="5" timestamp="2015-01-01T00:00:00Z">
    <tag k="addr:street" v="Baker St."/>
    <tag k="postal_code" v="NW1 6XE"/>
  </node>
  <node id="2" lat="48.8566" lon="2.3522" user="bob" uid="11" version="1" changeset="6" timestamp="2015-01-02T00:00:00Z"/>
  <way id="100" user="alice" uid="10" version="1" changeset="7" timestamp="2015-01-03T00:00:00Z">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="addr:street" v="Abbey Mews"/>
    <tag k="postal_code" v="London"/>
    <tag k="highway" v="residential"/>
  </way>
</osm>
"#;

    fn audit(xml: &str) -> AuditReport {
        audit_reader(
            OsmReader::new(xml.as_bytes()),
            &Config::default(),
            &null_progress(),
        )
        .unwrap()
    }

    #[test]
    fn counts_elements() {
        let report = audit(EXTRACT);
        assert_eq!(report.nodes, 2);
        assert_eq!(report.ways, 1);
    }

    #[test]
    fn buckets_streets_and_promotes() {
        let report = audit(EXTRACT);
        assert!(report.street_types["Street"].contains("Baker Street"));
        assert!(report.street_types["Mews"].contains("Abbey Mews"));
        assert!(report.vocabulary.contains(&"Mews".to_string()));
        assert_eq!(
            report.classification_counts[&ClassificationOutcome::AliasHit],
            1
        );
        assert_eq!(
            report.classification_counts[&ClassificationOutcome::Promoted],
            1
        );
    }

    #[test]
    fn postal_codes_by_category() {
        let report = audit(EXTRACT);
        assert!(report.postal_codes[&PostalCodeCategory::WithSpace].contains("NW1 6XE"));
        assert!(report.postal_codes[&PostalCodeCategory::Unknown].contains("London"));
    }

    #[test]
    fn address_styles_only_cover_street_values() {
        let report = audit(EXTRACT);
        let total: u64 = report.address_style_counts.values().sum();
        assert_eq!(total, 2);
        assert_eq!(report.address_style_counts[&AddressStyle::Capitalized], 1);
        assert_eq!(report.address_style_counts[&AddressStyle::ProblemChars], 1);
    }

    #[test]
    fn flags_nodes_outside_the_area() {
        let report = audit(EXTRACT);
        assert_eq!(report.coordinates_out_of_area.len(), 1);
        assert_eq!(report.coordinates_out_of_area["2"], (48.8566, 2.3522));
    }

    #[test]
    fn tallies_field_types() {
        let report = audit(EXTRACT);
        let node_fields = &report.field_types[&FieldGroup::Node];
        assert!(node_fields["lat"].contains(&AttributeKind::Float));
        assert!(node_fields["user"].contains(&AttributeKind::String));
        let nd_fields = &report.field_types[&FieldGroup::WayNode];
        assert_eq!(
            nd_fields["ref"].iter().copied().collect::<Vec<_>>(),
            vec![AttributeKind::Integer]
        );
    }

    #[test]
    fn configured_street_keys_are_honoured() {
        let mut config = Config::default();
        config.keys.street = vec!["name".to_string()];
        let xml = r#"<osm><way id="1"><tag k="name" v="Camden Passage"/><tag k="addr:street" v="Oxford St"/></way></osm>"#;
        let report = audit_reader(OsmReader::new(xml.as_bytes()), &config, &null_progress()).unwrap();
        assert!(report.street_types.contains_key("Passage"));
        assert!(!report.street_types.contains_key("Street"));
    }

    #[test]
    fn malformed_xml_aborts() {
        let result = audit_reader(
            OsmReader::new("<osm><node id=\"1\">".as_bytes()),
            &Config::default(),
            &null_progress(),
        );
        assert!(matches!(result, Err(AuditError::Read(_))));
    }
}
