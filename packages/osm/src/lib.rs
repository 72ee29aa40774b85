#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Streaming OpenStreetMap XML reader.
//!
//! [`OsmReader`] walks an `.osm` XML extract forward-only and yields one
//! [`OsmElement`] per `<node>` or `<way>`, in document order, with its tag
//! and node-reference children attached. Only the element being assembled
//! is held in memory, so arbitrarily large extracts can be processed.
//!
//! The [`counts`] module provides the simple exploratory tallies (element
//! names, tag keys) used to get a feel for an extract before auditing it.
//!
//! # Usage
//!
//! ```rust,no_run
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use osm_clean_osm::OsmReader;
//!
//! for element in OsmReader::from_path("maps/london.osm")? {
//!     let element = element?;
//!     println!("{} {:?}", element.kind(), element.raw_id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod counts;
pub mod progress;
pub mod reader;

pub use osm_clean_osm_models::{Attributes, ElementKind, OsmElement, OsmNode, OsmTag, OsmWay};
pub use reader::OsmReader;

/// Errors from reading an OSM XML extract.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Input file not found.
    #[error("OSM file not found: {0}")]
    FileNotFound(String),

    /// I/O error opening or reading the input.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Malformed XML.
    #[error("XML error near byte {position}: {source}")]
    Xml {
        /// Byte offset reported by the parser.
        position: u64,
        /// Underlying parser error.
        source: quick_xml::Error,
    },

    /// A child element lacks an attribute the reader cannot do without.
    #[error("<{element}> near byte {position} is missing the `{attribute}` attribute")]
    MissingAttribute {
        /// Element name (`tag` or `nd`).
        element: String,
        /// Missing attribute name.
        attribute: &'static str,
        /// Byte offset of the element.
        position: u64,
    },

    /// The input ended while a node or way was still open.
    #[error("Unexpected end of input inside <{0}>")]
    Truncated(String),
}
