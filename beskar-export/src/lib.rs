//! Scan export
//!
//! Serializes finished scan grids for analysis outside the application.
//!
//! # Formats
//!
//! - CSV: header `Column 1`..`Column 8`, then one record per grid row.
//!   Values use the shortest representation that round-trips, with
//!   two-digit signed exponents (`0.5`, `1e-05`), CRLF line endings.
//! - PNG: heat map of the grid, one square block per cell.

use std::path::{Path, PathBuf};

pub mod archive;
pub mod csv;
pub mod png;

pub use archive::{ArchivedScan, ScanArchive};

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write the export file")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize the CSV file")]
    Csv(#[from] ::csv::Error),
    #[error("failed to encode the image")]
    Image(#[from] image::ImageError),
    #[error("unsupported export format for {0:?} (expected .csv or .png)")]
    UnknownFormat(PathBuf),
    #[error("no archived scan numbered {0}")]
    NoSuchScan(usize),
}

/// File format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Png,
}

impl ExportFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("png") => Ok(ExportFormat::Png),
            _ => Err(ExportError::UnknownFormat(path.to_path_buf())),
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Png => "png",
        }
    }
}
