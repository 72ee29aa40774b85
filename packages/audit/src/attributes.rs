//! Attribute value kinds, tallied per field group.

use std::collections::{BTreeMap, BTreeSet};

use osm_clean_audit_models::{AttributeKind, FieldGroup};
use osm_clean_osm::Attributes;

/// Classifies a raw attribute value.
///
/// Integers and floats are recognized after trimming surrounding
/// whitespace; the empty string and `NULL` count as no value.
#[must_use]
pub fn attribute_kind(value: &str) -> AttributeKind {
    if value.is_empty() || value == "NULL" {
        return AttributeKind::None;
    }
    if value.starts_with('{') && value.ends_with('}') {
        return AttributeKind::List;
    }
    let trimmed = value.trim();
    if trimmed.parse::<i128>().is_ok() {
        AttributeKind::Integer
    } else if trimmed.parse::<f64>().is_ok() {
        AttributeKind::Float
    } else {
        AttributeKind::String
    }
}

/// Field group → attribute name → kinds seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTypes {
    groups: BTreeMap<FieldGroup, BTreeMap<String, BTreeSet<AttributeKind>>>,
}

impl FieldTypes {
    /// Records the kind of one attribute value.
    pub fn record(&mut self, group: FieldGroup, name: &str, value: &str) {
        let kinds = self
            .groups
            .entry(group)
            .or_default()
            .entry(name.to_string())
            .or_default();
        kinds.insert(attribute_kind(value));
    }

    /// Records every attribute of one element.
    pub fn record_all(&mut self, group: FieldGroup, attributes: &Attributes) {
        for (name, value) in attributes.iter() {
            self.record(group, name, value);
        }
    }

    /// Kinds seen for `name` within `group`.
    #[must_use]
    pub fn kinds(&self, group: FieldGroup, name: &str) -> Option<&BTreeSet<AttributeKind>> {
        self.groups.get(&group).and_then(|fields| fields.get(name))
    }

    /// Consumes the tally.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<FieldGroup, BTreeMap<String, BTreeSet<AttributeKind>>> {
        self.groups
    }
}
