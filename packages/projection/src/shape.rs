//! Flattening a raw OSM element into relational rows.
//!
//! Tag keys with a problem character are dropped. A key with a colon is
//! split at the first colon into `type` and `key`; any other key gets the
//! `regular` type. Values under the `street` key go through the shared
//! street-type classifier and values under `postal_code` are replaced by a
//! sentinel when they are not postcodes.

use osm_clean_audit::address_style::has_problem_chars;
use osm_clean_audit::postal_code::clean_postal_code;
use osm_clean_audit::street_type::StreetTypeAuditor;
use osm_clean_osm::{Attributes, ElementKind, OsmElement, OsmTag};
use osm_clean_projection_models::{NodeRow, ShapedElement, TagRow, WayNodeRow, WayRow};

/// `type` of a tag whose key has no colon.
pub const DEFAULT_TAG_TYPE: &str = "regular";

/// `user` stored when the attribute is missing.
pub const UNKNOWN_USER: &str = "unknown";

/// `uid` stored when the attribute is missing or not an integer.
pub const UNKNOWN_UID: i64 = -1;

/// Errors from shaping a single element.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// A required attribute is absent.
    #[error("{element} {} is missing the `{attribute}` attribute", .id.as_deref().unwrap_or("?"))]
    MissingAttribute {
        /// Element kind.
        element: ElementKind,
        /// Raw id, when present.
        id: Option<String>,
        /// Attribute name.
        attribute: &'static str,
    },

    /// A required attribute does not parse.
    #[error("{element} {} has an invalid `{attribute}`: {value:?}", .id.as_deref().unwrap_or("?"))]
    InvalidAttribute {
        /// Element kind.
        element: ElementKind,
        /// Raw id, when present.
        id: Option<String>,
        /// Attribute name.
        attribute: &'static str,
        /// The offending text.
        value: String,
    },
}

/// Shapes elements for one projection pass, sharing a single street-type
/// vocabulary across the whole pass.
#[derive(Debug)]
pub struct Shaper {
    streets: StreetTypeAuditor,
    dropped_tags: u64,
}

impl Shaper {
    /// Creates a shaper around `streets`.
    #[must_use]
    pub const fn new(streets: StreetTypeAuditor) -> Self {
        Self {
            streets,
            dropped_tags: 0,
        }
    }

    /// Flattens one element.
    ///
    /// # Errors
    ///
    /// Returns an error if a required attribute is missing or malformed,
    /// or if a way references a non-integer node id.
    pub fn shape(&mut self, element: &OsmElement) -> Result<ShapedElement, ShapeError> {
        let fields = Fields::new(element.kind(), element.attributes());
        let id = fields.integer("id")?;

        match element {
            OsmElement::Node(node) => {
                let row = NodeRow {
                    id,
                    lat: fields.float("lat")?,
                    lon: fields.float("lon")?,
                    user: fields.user(),
                    uid: fields.uid(),
                    version: fields.text("version")?,
                    changeset: fields.integer("changeset")?,
                    timestamp: fields.text("timestamp")?,
                };
                let tags = self.shape_tags(id, &node.tags);
                Ok(ShapedElement::Node { node: row, tags })
            }
            OsmElement::Way(way) => {
                let row = WayRow {
                    id,
                    user: fields.user(),
                    uid: fields.uid(),
                    version: fields.text("version")?,
                    changeset: fields.integer("changeset")?,
                    timestamp: fields.text("timestamp")?,
                };
                let nodes = way
                    .node_refs
                    .iter()
                    .zip(0_i64..)
                    .map(|(node_ref, position)| {
                        let node_id = node_ref.trim().parse::<i64>().map_err(|_| {
                            ShapeError::InvalidAttribute {
                                element: ElementKind::Way,
                                id: Some(id.to_string()),
                                attribute: "ref",
                                value: node_ref.clone(),
                            }
                        })?;
                        Ok(WayNodeRow {
                            id,
                            node_id,
                            position,
                        })
                    })
                    .collect::<Result<Vec<_>, ShapeError>>()?;
                let tags = self.shape_tags(id, &way.tags);
                Ok(ShapedElement::Way {
                    way: row,
                    nodes,
                    tags,
                })
            }
        }
    }

    fn shape_tags(&mut self, id: i64, tags: &[OsmTag]) -> Vec<TagRow> {
        tags.iter()
            .filter_map(|tag| self.shape_tag(id, tag))
            .collect()
    }

    fn shape_tag(&mut self, id: i64, tag: &OsmTag) -> Option<TagRow> {
        if has_problem_chars(&tag.key) {
            log::trace!("Dropping tag with problem key {:?} on {id}", tag.key);
            self.dropped_tags += 1;
            return None;
        }

        let (kind, key) = split_key(&tag.key);

        let value = match key {
            "street" => self.streets.normalize(&tag.value),
            "postal_code" => clean_postal_code(&tag.value).to_string(),
            _ => tag.value.clone(),
        };

        Some(TagRow {
            id,
            key: key.to_string(),
            value,
            kind: kind.to_string(),
        })
    }

    /// Tags dropped so far for having a problem character in their key.
    #[must_use]
    pub const fn dropped_tags(&self) -> u64 {
        self.dropped_tags
    }

    /// The street-type classifier shared by the pass.
    #[must_use]
    pub const fn streets(&self) -> &StreetTypeAuditor {
        &self.streets
    }
}

/// Splits `prefix:rest` keys into tag type and key. A key needs text on both
/// sides of the first colon to be split; anything else stays whole under
/// [`DEFAULT_TAG_TYPE`].
fn split_key(key: &str) -> (&str, &str) {
    match key.split_once(':') {
        Some((kind, rest)) if !kind.is_empty() && !rest.is_empty() => (kind, rest),
        _ => (DEFAULT_TAG_TYPE, key),
    }
}

/// Typed access to an element's attributes with error context.
struct Fields<'a> {
    kind: ElementKind,
    attributes: &'a Attributes,
}

impl<'a> Fields<'a> {
    const fn new(kind: ElementKind, attributes: &'a Attributes) -> Self {
        Self { kind, attributes }
    }

    fn raw_id(&self) -> Option<String> {
        self.attributes.get("id").map(str::to_string)
    }

    fn text(&self, attribute: &'static str) -> Result<String, ShapeError> {
        self.attributes
            .get(attribute)
            .map(str::to_string)
            .ok_or_else(|| ShapeError::MissingAttribute {
                element: self.kind,
                id: self.raw_id(),
                attribute,
            })
    }

    fn parsed<T: std::str::FromStr>(&self, attribute: &'static str) -> Result<T, ShapeError> {
        let value = self.text(attribute)?;
        if let Ok(parsed) = value.trim().parse::<T>() {
            return Ok(parsed);
        }
        Err(ShapeError::InvalidAttribute {
            element: self.kind,
            id: self.raw_id(),
            attribute,
            value,
        })
    }

    fn integer(&self, attribute: &'static str) -> Result<i64, ShapeError> {
        self.parsed(attribute)
    }

    fn float(&self, attribute: &'static str) -> Result<f64, ShapeError> {
        self.parsed(attribute)
    }

    fn user(&self) -> String {
        self.attributes
            .get("user")
            .unwrap_or(UNKNOWN_USER)
            .to_string()
    }

    fn uid(&self) -> i64 {
        self.attributes
            .get("uid")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(UNKNOWN_UID)
    }
}
