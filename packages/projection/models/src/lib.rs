#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row types for the relational projection of an OSM extract.
//!
//! An extract is flattened into five tables: `Nodes`, `NodeTags`, `Ways`,
//! `WayNodes` and `WayTags`. Each shaped `<node>` or `<way>` becomes a
//! [`ShapedElement`] holding its row plus its child rows. The [`Schema`]
//! types describe what a well-formed row looks like and are checked by the
//! projection's validator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

// ── Tables ───────────────────────────────────────────────────────────────

/// One of the five output tables.
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
pub enum Table {
    /// One row per node.
    Nodes,
    /// One row per node tag.
    NodeTags,
    /// One row per way.
    Ways,
    /// One row per node reference of a way.
    WayNodes,
    /// One row per way tag.
    WayTags,
}

impl Table {
    /// Every table, in output order.
    pub const ALL: [Self; 5] = [
        Self::Nodes,
        Self::NodeTags,
        Self::Ways,
        Self::WayNodes,
        Self::WayTags,
    ];

    /// Column names, in output order.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Nodes => &[
                "id",
                "lat",
                "lon",
                "user",
                "uid",
                "version",
                "changeset",
                "timestamp",
            ],
            Self::Ways => &["id", "user", "uid", "version", "changeset", "timestamp"],
            Self::NodeTags | Self::WayTags => &["id", "key", "value", "type"],
            Self::WayNodes => &["id", "node_id", "position"],
        }
    }
}

// ── Rows ─────────────────────────────────────────────────────────────────

/// A typed cell, as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Integer column.
    Integer(i64),
    /// Floating-point column.
    Float(f64),
    /// Text column.
    Text(&'a str),
}

/// A row of the `Nodes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub user: String,
    pub uid: i64,
    pub version: String,
    pub changeset: i64,
    pub timestamp: String,
}

impl NodeRow {
    /// Cells in column order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Integer(self.id)),
            ("lat", FieldValue::Float(self.lat)),
            ("lon", FieldValue::Float(self.lon)),
            ("user", FieldValue::Text(&self.user)),
            ("uid", FieldValue::Integer(self.uid)),
            ("version", FieldValue::Text(&self.version)),
            ("changeset", FieldValue::Integer(self.changeset)),
            ("timestamp", FieldValue::Text(&self.timestamp)),
        ]
    }
}

/// A row of the `Ways` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WayRow {
    pub id: i64,
    pub user: String,
    pub uid: i64,
    pub version: String,
    pub changeset: i64,
    pub timestamp: String,
}

impl WayRow {
    /// Cells in column order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Integer(self.id)),
            ("user", FieldValue::Text(&self.user)),
            ("uid", FieldValue::Integer(self.uid)),
            ("version", FieldValue::Text(&self.version)),
            ("changeset", FieldValue::Integer(self.changeset)),
            ("timestamp", FieldValue::Text(&self.timestamp)),
        ]
    }
}

/// A row of the `NodeTags` or `WayTags` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRow {
    /// Id of the owning node or way.
    pub id: i64,
    /// Key with any `type:` prefix removed.
    pub key: String,
    /// Tag value, possibly cleaned.
    pub value: String,
    /// Text before the first colon of the raw key, or `regular`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TagRow {
    /// Cells in column order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("id", FieldValue::Integer(self.id)),
            ("key", FieldValue::Text(&self.key)),
            ("value", FieldValue::Text(&self.value)),
            ("type", FieldValue::Text(&self.kind)),
        ]
    }
}

/// A row of the `WayNodes` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WayNodeRow {
    /// Id of the owning way.
    pub id: i64,
    /// Referenced node id.
    pub node_id: i64,
    /// Zero-based position within the way.
    pub position: i64,
}

impl WayNodeRow {
    /// Cells in column order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'static>)> {
        vec![
            ("id", FieldValue::Integer(self.id)),
            ("node_id", FieldValue::Integer(self.node_id)),
            ("position", FieldValue::Integer(self.position)),
        ]
    }
}

/// One `<node>` or `<way>` flattened into rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapedElement {
    /// A node and its tags.
    Node {
        node: NodeRow,
        tags: Vec<TagRow>,
    },
    /// A way, its node references and its tags.
    Way {
        way: WayRow,
        nodes: Vec<WayNodeRow>,
        tags: Vec<TagRow>,
    },
}

impl ShapedElement {
    /// Id of the node or way.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Node { node, .. } => node.id,
            Self::Way { way, .. } => way.id,
        }
    }

    /// Every row of the element with the table it belongs to, parent row
    /// first.
    #[must_use]
    pub fn rows(&self) -> Vec<(Table, Vec<(&'static str, FieldValue<'_>)>)> {
        match self {
            Self::Node { node, tags } => std::iter::once((Table::Nodes, node.fields()))
                .chain(tags.iter().map(|t| (Table::NodeTags, t.fields())))
                .collect(),
            Self::Way { way, nodes, tags } => std::iter::once((Table::Ways, way.fields()))
                .chain(nodes.iter().map(|n| (Table::WayNodes, n.fields())))
                .chain(tags.iter().map(|t| (Table::WayTags, t.fields())))
                .collect(),
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────────

/// Expected type of a column.
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
pub enum FieldKind {
    Integer,
    Float,
    String,
}

/// Constraints on a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Expected type.
    pub kind: FieldKind,
    /// Whether the column must be present.
    pub required: bool,
    /// Whether an empty string is acceptable (text columns only).
    pub allow_empty: bool,
}

impl FieldRule {
    /// A required, non-empty column of the given kind.
    #[must_use]
    pub const fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            allow_empty: false,
        }
    }
}

/// Table → column → rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: BTreeMap<Table, BTreeMap<String, FieldRule>>,
}

impl Schema {
    /// Rules for one table.
    #[must_use]
    pub fn table(&self, table: Table) -> Option<&BTreeMap<String, FieldRule>> {
        self.tables.get(&table)
    }
}

impl Default for Schema {
    /// Every column of the five tables, required and non-empty, typed to
    /// match the row structs.
    fn default() -> Self {
        let kind_of = |column: &str| match column {
            "lat" | "lon" => FieldKind::Float,
            "id" | "uid" | "changeset" | "node_id" | "position" => FieldKind::Integer,
            _ => FieldKind::String,
        };
        let tables = Table::ALL
            .into_iter()
            .map(|table| {
                let rules = table
                    .columns()
                    .iter()
                    .map(|&column| (column.to_string(), FieldRule::required(kind_of(column))))
                    .collect();
                (table, rules)
            })
            .collect();
        Self { tables }
    }
}

// ── Validation ───────────────────────────────────────────────────────────

/// How the projection treats rows that break the schema.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationMode {
    /// Do not validate.
    #[default]
    Off,
    /// Log and record failures, skip the element, keep going.
    Report,
    /// Abort on the first failure.
    Strict,
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// `node` or `way`.
    pub element: String,
    /// Id of the offending element.
    pub id: i64,
    /// Table of the offending row.
    pub table: Table,
    /// Offending column.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {}.{} {}",
            self.element, self.id, self.table, self.field, self.message
        )
    }
}
