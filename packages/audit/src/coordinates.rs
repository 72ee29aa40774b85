//! Area-of-interest check for node coordinates.

use osm_clean_audit_models::BoundingBox;
use osm_clean_osm::Attributes;

/// Where a node sits relative to the area of interest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateStatus {
    /// Inside the box, edges included.
    Inside,
    /// Outside the box, with the parsed `(lat, lon)`.
    Outside(f64, f64),
    /// `lat` or `lon` is missing or not a number.
    Unparseable,
}

/// Checks a node's `lat`/`lon` attributes against `area`.
#[must_use]
pub fn check_coordinates(attributes: &Attributes, area: &BoundingBox) -> CoordinateStatus {
    let lat = attributes.get("lat").and_then(|v| v.trim().parse::<f64>().ok());
    let lon = attributes.get("lon").and_then(|v| v.trim().parse::<f64>().ok());
    match (lat, lon) {
        (Some(lat), Some(lon)) if area.contains(lat, lon) => CoordinateStatus::Inside,
        (Some(lat), Some(lon)) => CoordinateStatus::Outside(lat, lon),
        _ => CoordinateStatus::Unparseable,
    }
}
