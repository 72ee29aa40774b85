#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the `osm_clean` toolchain.
//!
//! ```text
//! osm_clean audit <INPUT> [--config FILE] [--output FILE]
//! osm_clean export <INPUT> [--config FILE] [--out-dir DIR] [--validate off|report|strict]
//! osm_clean count-elements <INPUT>
//! osm_clean count-keys <INPUT> [--top 20]
//! ```
//!
//! Uses `indicatif-log-bridge` (via [`osm_clean_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod report;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use osm_clean_audit::config::load_config;
use osm_clean_cli_utils::IndicatifProgress;
use osm_clean_osm::counts::{count_elements, count_tag_keys, top_tag_keys};
use osm_clean_projection::sink::CsvSink;
use osm_clean_projection::{ProjectionOptions, run_projection};
use osm_clean_projection_models::ValidationMode;

#[derive(Parser)]
#[command(
    name = "osm_clean",
    about = "Audit and clean OpenStreetMap XML extracts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit street types, postal codes, address styles and coordinates
    Audit {
        /// OSM XML extract
        input: PathBuf,
        /// TOML config replacing the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the full report as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Clean the extract and write it as five CSV tables
    Export {
        /// OSM XML extract
        input: PathBuf,
        /// TOML config replacing the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory for the CSV files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Schema validation: off, report or strict
        #[arg(long, default_value = "off")]
        validate: ValidationMode,
    },
    /// Count XML elements by name
    CountElements {
        /// OSM XML extract
        input: PathBuf,
    },
    /// Show the most frequent tag keys
    CountKeys {
        /// OSM XML extract
        input: PathBuf,
        /// Number of keys to show
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = osm_clean_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            input,
            config,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let progress = IndicatifProgress::bytes_bar(&multi, "Auditing");
            let report = osm_clean_audit::audit_file(&input, &config, &progress)?;

            report::print_audit_summary(&report);

            if let Some(output) = output {
                write_json(&output, &report)?;
                println!();
                println!("Report written to {}", output.display());
            }
        }
        Commands::Export {
            input,
            config,
            out_dir,
            validate,
        } => {
            let config = load_config(config.as_deref())?;
            let options = ProjectionOptions {
                validation: validate,
                ..ProjectionOptions::default()
            };
            let mut sink = CsvSink::create(&out_dir, &config.output)?;
            let progress = IndicatifProgress::bytes_bar(&multi, "Exporting");
            let summary = run_projection(&input, &config, &options, &mut sink, &progress)?;

            report::print_projection_summary(&summary, &out_dir);
        }
        Commands::CountElements { input } => {
            let counts = count_elements(&input)?;
            for (name, count) in &counts {
                println!("{name:<12} {count:>10}");
            }
        }
        Commands::CountKeys { input, top } => {
            let counts = count_tag_keys(&input)?;
            println!("{} distinct keys", counts.len());
            println!();
            for (key, count) in top_tag_keys(&counts, top) {
                println!("{count:>10}  {key}");
            }
        }
    }

    Ok(())
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
