//! Human-readable summaries printed after a pass.

use std::path::Path;

use osm_clean_audit_models::{AddressStyle, AuditReport};
use osm_clean_projection::ProjectionSummary;

/// How many sample addresses to show per street type.
const SAMPLES_PER_TYPE: usize = 3;

pub fn print_audit_summary(report: &AuditReport) {
    println!();
    println!("Audited {} nodes and {} ways", report.nodes, report.ways);

    println!();
    println!("Street type classification:");
    for (outcome, count) in &report.classification_counts {
        println!("  {:<14} {count:>8}", outcome.as_ref());
    }

    println!();
    println!(
        "Street types ({} buckets, vocabulary of {}):",
        report.street_types.len(),
        report.vocabulary.len()
    );
    for (street_type, addresses) in &report.street_types {
        let samples: Vec<&str> = addresses
            .iter()
            .take(SAMPLES_PER_TYPE)
            .map(String::as_str)
            .collect();
        println!(
            "  {street_type:<16} {:>6}  {}",
            addresses.len(),
            samples.join(" | ")
        );
    }

    println!();
    println!("Postal codes:");
    for (category, count) in &report.postal_code_counts {
        println!("  {:<14} {count:>8}", category.as_ref());
    }

    println!();
    println!("Street name styles:");
    for style in AddressStyle::all() {
        let count = report.address_style_counts.get(style).copied().unwrap_or(0);
        println!("  {:<18} {count:>8}", style.as_ref());
    }

    println!();
    println!(
        "{} nodes outside the area of interest",
        report.coordinates_out_of_area.len()
    );
}

pub fn print_projection_summary(summary: &ProjectionSummary, out_dir: &Path) {
    println!();
    println!("Wrote to {}:", out_dir.display());
    println!("  nodes      {:>10}", summary.nodes);
    println!("  node tags  {:>10}", summary.node_tags);
    println!("  ways       {:>10}", summary.ways);
    println!("  way nodes  {:>10}", summary.way_nodes);
    println!("  way tags   {:>10}", summary.way_tags);

    if summary.dropped_tags > 0 {
        println!();
        println!(
            "{} tags dropped for problem characters in their key",
            summary.dropped_tags
        );
    }
    if summary.skipped_elements > 0 {
        println!(
            "{} elements skipped with {} validation failures",
            summary.skipped_elements,
            summary.failures.len()
        );
    }

    println!();
    println!("Street types ({} in vocabulary):", summary.vocabulary.len());
    for (street_type, size) in &summary.street_type_sizes {
        println!("  {street_type:<16} {size:>6}");
    }
}
