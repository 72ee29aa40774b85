//! Destinations for shaped elements.
//!
//! [`CsvSink`] writes the five tables as CSV files; [`MemorySink`] keeps
//! the rows in vectors, which is what tests and library callers that want
//! to post-process the rows use.

use std::fs::File;
use std::path::{Path, PathBuf};

use osm_clean_audit_models::OutputConfig;
use osm_clean_projection_models::{NodeRow, ShapedElement, Table, TagRow, WayNodeRow, WayRow};
use serde::Serialize;

/// Errors from writing projection output.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// CSV encoding or write error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path of the output file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// I/O error creating or flushing an output file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Receives shaped elements in document order.
pub trait ProjectionSink {
    /// Writes every row of one element.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be written.
    fn write(&mut self, element: &ShapedElement) -> Result<(), SinkError>;

    /// Flushes buffered output. Called once, after the last element.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// One CSV output file.
struct TableWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl TableWriter {
    /// Creates the file and writes its header row.
    fn create(path: PathBuf, table: Table) -> Result<Self, SinkError> {
        let file = File::create(&path).map_err(|e| SinkError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(table.columns())
            .map_err(|e| SinkError::Csv {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(Self { path, writer })
    }

    fn serialize(&mut self, row: impl Serialize) -> Result<(), SinkError> {
        self.writer.serialize(row).map_err(|e| SinkError::Csv {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(|e| SinkError::Io {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

/// Writes the five tables as CSV files into one directory.
///
/// Every file gets a header row, even if no rows follow.
pub struct CsvSink {
    nodes: TableWriter,
    node_tags: TableWriter,
    ways: TableWriter,
    way_nodes: TableWriter,
    way_tags: TableWriter,
}

impl CsvSink {
    /// Creates `dir` if needed and opens the five output files named by
    /// `output`, truncating any existing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be created.
    pub fn create(dir: &Path, output: &OutputConfig) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir).map_err(|e| SinkError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;

        log::info!("Writing CSV tables to {}", dir.display());
        Ok(Self {
            nodes: TableWriter::create(dir.join(&output.nodes), Table::Nodes)?,
            node_tags: TableWriter::create(dir.join(&output.node_tags), Table::NodeTags)?,
            ways: TableWriter::create(dir.join(&output.ways), Table::Ways)?,
            way_nodes: TableWriter::create(dir.join(&output.way_nodes), Table::WayNodes)?,
            way_tags: TableWriter::create(dir.join(&output.way_tags), Table::WayTags)?,
        })
    }
}

impl ProjectionSink for CsvSink {
    fn write(&mut self, element: &ShapedElement) -> Result<(), SinkError> {
        match element {
            ShapedElement::Node { node, tags } => {
                self.nodes.serialize(node)?;
                for tag in tags {
                    self.node_tags.serialize(tag)?;
                }
            }
            ShapedElement::Way { way, nodes, tags } => {
                self.ways.serialize(way)?;
                for way_node in nodes {
                    self.way_nodes.serialize(way_node)?;
                }
                for tag in tags {
                    self.way_tags.serialize(tag)?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        for writer in [
            &mut self.nodes,
            &mut self.node_tags,
            &mut self.ways,
            &mut self.way_nodes,
            &mut self.way_tags,
        ] {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Collects rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub nodes: Vec<NodeRow>,
    pub node_tags: Vec<TagRow>,
    pub ways: Vec<WayRow>,
    pub way_nodes: Vec<WayNodeRow>,
    pub way_tags: Vec<TagRow>,
    pub finished: bool,
}

impl ProjectionSink for MemorySink {
    fn write(&mut self, element: &ShapedElement) -> Result<(), SinkError> {
        match element {
            ShapedElement::Node { node, tags } => {
                self.nodes.push(node.clone());
                self.node_tags.extend(tags.iter().cloned());
            }
            ShapedElement::Way { way, nodes, tags } => {
                self.ways.push(way.clone());
                self.way_nodes.extend(nodes.iter().copied());
                self.way_tags.extend(tags.iter().cloned());
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
