#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the OSM street-type and postal-code audit.
//!
//! This crate contains only data types, configuration structs, and the
//! audit report. It has no I/O and no regex machinery; the classifiers
//! themselves live in `osm_clean_audit`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

// ── Street type classification ───────────────────────────────────────────

/// Result of pushing one address string through the street-type classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The trailing token was already canonical; the string is bucketed
    /// unchanged.
    CanonicalHit {
        /// Bucket key.
        street_type: String,
    },
    /// The trailing token is a known alias; the rewritten string is
    /// bucketed under the alias target.
    AliasHit {
        /// Bucket key (the alias target).
        street_type: String,
        /// The address with its trailing token replaced.
        rewritten: String,
    },
    /// The trailing token was accepted as a new canonical street type.
    Promoted {
        /// Bucket key (the freshly promoted token).
        street_type: String,
    },
    /// The string was not bucketed.
    Unclassified(UnclassifiedReason),
}

impl Classification {
    /// Bucket key, if the string was bucketed.
    #[must_use]
    pub fn street_type(&self) -> Option<&str> {
        match self {
            Self::CanonicalHit { street_type }
            | Self::AliasHit { street_type, .. }
            | Self::Promoted { street_type } => Some(street_type),
            Self::Unclassified(_) => None,
        }
    }

    /// Flat outcome label for tallying.
    #[must_use]
    pub const fn outcome(&self) -> ClassificationOutcome {
        match self {
            Self::CanonicalHit { .. } => ClassificationOutcome::CanonicalHit,
            Self::AliasHit { .. } => ClassificationOutcome::AliasHit,
            Self::Promoted { .. } => ClassificationOutcome::Promoted,
            Self::Unclassified(UnclassifiedReason::NoToken) => ClassificationOutcome::NoToken,
            Self::Unclassified(UnclassifiedReason::Suppressed) => {
                ClassificationOutcome::Suppressed
            }
            Self::Unclassified(UnclassifiedReason::Dropped) => ClassificationOutcome::Dropped,
        }
    }
}

/// Why an address string was left out of every bucket.
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
pub enum UnclassifiedReason {
    /// No trailing token could be extracted.
    NoToken,
    /// The token looked like a house-number or postcode fragment.
    Suppressed,
    /// The token was unknown and failed the promotion heuristic.
    Dropped,
}

/// Terminal state of a classification, without payload.
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
pub enum ClassificationOutcome {
    /// See [`Classification::CanonicalHit`].
    CanonicalHit,
    /// See [`Classification::AliasHit`].
    AliasHit,
    /// See [`Classification::Promoted`].
    Promoted,
    /// See [`UnclassifiedReason::NoToken`].
    NoToken,
    /// See [`UnclassifiedReason::Suppressed`].
    Suppressed,
    /// See [`UnclassifiedReason::Dropped`].
    Dropped,
}

// ── Surface-style and postal classification ──────────────────────────────

/// How an address string is written, by casing and punctuation.
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
pub enum AddressStyle {
    /// Lowercase letters, underscores and whitespace only.
    Lower,
    /// Uppercase letters, underscores and whitespace only.
    Uppercase,
    /// Capitalized words.
    Capitalized,
    /// `lower:lower`.
    LowerColon,
    /// Uppercase with colons.
    UppercaseColon,
    /// Capitalized words with colons.
    CapitalizedColon,
    /// Contains a character that is unsafe as a column key.
    ProblemChars,
    /// None of the above.
    Other,
}

impl AddressStyle {
    /// Every style, in classification precedence order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Lower,
            Self::Uppercase,
            Self::Capitalized,
            Self::LowerColon,
            Self::UppercaseColon,
            Self::CapitalizedColon,
            Self::ProblemChars,
            Self::Other,
        ]
    }
}

/// Validity category of a UK postal code.
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
pub enum PostalCodeCategory {
    /// Well-formed with no space between outward and inward code.
    NoSpace,
    /// Well-formed with a single separating space.
    WithSpace,
    /// Not a recognizable UK postcode.
    Unknown,
}

impl PostalCodeCategory {
    /// Returns `true` for both well-formed categories.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Kind of value seen in a raw XML attribute.
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
pub enum AttributeKind {
    /// Empty or `NULL`.
    None,
    /// Brace-delimited list (`{a|b}`).
    List,
    /// Parses as an integer.
    Integer,
    /// Parses as a float.
    Float,
    /// Anything else.
    String,
}

/// Which part of the extract an attribute belongs to.
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
pub enum FieldGroup {
    /// `<node>` attributes.
    Node,
    /// `<tag>` attributes under a node.
    NodeTag,
    /// `<way>` attributes.
    Way,
    /// `<tag>` attributes under a way.
    WayTag,
    /// `<nd>` attributes under a way.
    WayNode,
}

// ── Configuration ────────────────────────────────────────────────────────

/// Top-level toolchain configuration, usually read from TOML.
///
/// Every section is optional; omitted sections take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Street-type vocabulary and alias table.
    pub street_types: StreetTypeConfig,
    /// Which tag keys the audit treats as streets and postal codes.
    pub keys: KeyConfig,
    /// Area of interest for the coordinate audit.
    pub area: BoundingBox,
    /// Output file names for the relational projection.
    pub output: OutputConfig,
}

/// Seed vocabulary and alias table for the street-type classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetTypeConfig {
    /// Initial canonical street types.
    pub expected: Vec<String>,
    /// Non-canonical spelling → canonical street type.
    pub aliases: BTreeMap<String, String>,
}

impl Default for StreetTypeConfig {
    fn default() -> Self {
        Self {
            expected: ["Street", "Road", "Avenue", "Boulevard"]
                .into_iter()
                .map(String::from)
                .collect(),
            aliases: default_aliases(),
        }
    }
}

/// Alias table curated from auditing a Greater London extract.
fn default_aliases() -> BTreeMap<String, String> {
    [
        ("St", "Street"),
        ("St.", "Street"),
        ("st", "Street"),
        ("street", "Street"),
        ("STREET", "Street"),
        ("road", "Road"),
        ("Rd", "Road"),
        ("Rd,", "Road"),
        ("Rd)", "Road"),
        ("Road)", "Road"),
        ("ROAD", "Road"),
        ("ROAD,", "Road"),
        ("Ave", "Avenue"),
        ("boulevard", "Boulevard"),
        ("HIll", "Hill"),
        ("close", "Close"),
        ("drive", "Drive"),
        ("footway", "Footway"),
        ("house", "House"),
        ("lane", "Lane"),
        ("market", "Market"),
        ("parade", "Parade"),
        ("park", "Park"),
        ("Park,", "Park"),
        ("passage", "Passage"),
        ("place", "Place"),
        ("Pl", "Place"),
        ("residential", "Residential"),
        ("Sq", "Square"),
        ("square", "Square"),
        ("North)", "North"),
        ("Lower)", "Lower"),
        ("James'", "James"),
        ("James's", "James"),
        ("GROVE", "Grove"),
        ("station", "Station"),
        ("shops", "Shops"),
        ("row", "Row"),
    ]
    .into_iter()
    .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
    .collect()
}

/// Tag keys routed to the street and postal code auditors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Full tag keys holding street names.
    pub street: Vec<String>,
    /// Full tag keys holding postal codes.
    pub postal_code: Vec<String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            street: vec!["addr:street".to_string()],
            postal_code: vec!["postal_code".to_string()],
        }
    }
}

/// Inclusive latitude/longitude box (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Returns `true` if the point lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

impl Default for BoundingBox {
    /// Greater London.
    fn default() -> Self {
        Self {
            min_lat: 51.2550,
            max_lat: 51.7573,
            min_lon: -0.8253,
            max_lon: 0.5699,
        }
    }
}

/// File names of the five projection tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `Nodes` table.
    pub nodes: String,
    /// `NodeTags` table.
    pub node_tags: String,
    /// `Ways` table.
    pub ways: String,
    /// `WayNodes` table.
    pub way_nodes: String,
    /// `WayTags` table.
    pub way_tags: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            nodes: "nodes.csv".to_string(),
            node_tags: "nodes_tags.csv".to_string(),
            ways: "ways.csv".to_string(),
            way_nodes: "ways_nodes.csv".to_string(),
            way_tags: "ways_tags.csv".to_string(),
        }
    }
}

// ── Report ───────────────────────────────────────────────────────────────

/// Everything one audit pass learned about an extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Canonical vocabulary after the pass, in insertion order.
    pub vocabulary: Vec<String>,
    /// Alias table used for the pass.
    pub aliases: BTreeMap<String, String>,
    /// Street type → address strings bucketed under it.
    pub street_types: BTreeMap<String, BTreeSet<String>>,
    /// Every trailing token extracted, classified or not.
    pub candidate_street_types: BTreeSet<String>,
    /// Classification outcome → number of address strings.
    pub classification_counts: BTreeMap<ClassificationOutcome, u64>,
    /// Postal code category → distinct values seen.
    pub postal_codes: BTreeMap<PostalCodeCategory, BTreeSet<String>>,
    /// Postal code category → number of occurrences.
    pub postal_code_counts: BTreeMap<PostalCodeCategory, u64>,
    /// Address style → number of street values written that way.
    pub address_style_counts: BTreeMap<AddressStyle, u64>,
    /// Node id → `(lat, lon)` for nodes outside the area of interest.
    pub coordinates_out_of_area: BTreeMap<String, (f64, f64)>,
    /// Attribute kinds seen, per field group and attribute name.
    pub field_types: BTreeMap<FieldGroup, BTreeMap<String, BTreeSet<AttributeKind>>>,
    /// Number of nodes audited.
    pub nodes: u64,
    /// Number of ways audited.
    pub ways: u64,
}
