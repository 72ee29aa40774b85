#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw OpenStreetMap record types.
//!
//! Records are produced by the streaming XML reader in document order.
//! Every XML attribute is kept as its unparsed string so that auditors can
//! inspect the text exactly as it appeared in the extract; typed parsing
//! happens downstream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Kind of top-level OSM element handled by the toolchain.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElementKind {
    /// A point with coordinates.
    Node,
    /// An ordered list of node references.
    Way,
}

/// Unparsed XML attributes of an element, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the raw value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A `<tag k="..." v="..."/>` child of a node or way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsmTag {
    /// The `k` attribute.
    pub key: String,
    /// The `v` attribute.
    pub value: String,
}

impl OsmTag {
    /// Creates a tag from a key and value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A `<node>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsmNode {
    /// Raw attributes (`id`, `lat`, `lon`, `user`, `uid`, ...).
    pub attributes: Attributes,
    /// Tag children in document order.
    pub tags: Vec<OsmTag>,
}

/// A `<way>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsmWay {
    /// Raw attributes (`id`, `user`, `uid`, ...).
    pub attributes: Attributes,
    /// Tag children in document order.
    pub tags: Vec<OsmTag>,
    /// Raw `ref` attribute of each `<nd>` child, in document order.
    pub node_refs: Vec<String>,
}

/// A top-level element yielded by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsmElement {
    /// A node.
    Node(OsmNode),
    /// A way.
    Way(OsmWay),
}

impl OsmElement {
    /// Kind of this element.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Way(_) => ElementKind::Way,
        }
    }

    /// Raw attributes of this element.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        match self {
            Self::Node(node) => &node.attributes,
            Self::Way(way) => &way.attributes,
        }
    }

    /// Tag children of this element.
    #[must_use]
    pub fn tags(&self) -> &[OsmTag] {
        match self {
            Self::Node(node) => &node.tags,
            Self::Way(way) => &way.tags,
        }
    }

    /// Raw `id` attribute, if present.
    #[must_use]
    pub fn raw_id(&self) -> Option<&str> {
        self.attributes().get("id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_kind_round_trips_through_strum() {
        assert_eq!(ElementKind::Node.to_string(), "node");
        assert_eq!("way".parse::<ElementKind>().unwrap(), ElementKind::Way);
    }

    #[test]
    fn attributes_collect_and_lookup() {
        let attrs: Attributes = [("id", "1"), ("lat", "51.5")].into_iter().collect();
        assert_eq!(attrs.get("lat"), Some("51.5"));
        assert_eq!(attrs.get("lon"), None);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn element_accessors_dispatch_on_kind() {
        let way = OsmElement::Way(OsmWay {
            attributes: [("id", "7")].into_iter().collect(),
            tags: vec![OsmTag::new("highway", "residential")],
            node_refs: vec!["1".to_string()],
        });
        assert_eq!(way.kind(), ElementKind::Way);
        assert_eq!(way.raw_id(), Some("7"));
        assert_eq!(way.tags().len(), 1);
    }
}
