//! Finished scans of a session
//!
//! Every completed scan is archived under a sequential label ("Scan 1",
//! "Scan 2", ...) so it can be exported after the batch ends.

use std::path::{Path, PathBuf};

use beskar_core::grid::ScanGrid;

use crate::{csv, png, ExportError, ExportFormat};

/// One archived scan
#[derive(Debug, Clone)]
pub struct ArchivedScan {
    /// 1-based scan number
    pub number: usize,
    /// Readings
    pub grid: ScanGrid,
}

impl ArchivedScan {
    /// Display label
    pub fn label(&self) -> String {
        format!("Scan {}", self.number)
    }

    /// Default file name for `format`
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!("scan-{}.{}", self.number, format.extension())
    }
}

/// Archive of finished scans
#[derive(Debug, Clone)]
pub struct ScanArchive {
    scans: Vec<ArchivedScan>,
    cell_px: u32,
}

impl Default for ScanArchive {
    fn default() -> Self {
        Self {
            scans: Vec::new(),
            cell_px: png::CELL_PX,
        }
    }
}

impl ScanArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heat-map cell size used for PNG exports
    pub fn with_cell_px(mut self, cell_px: u32) -> Self {
        self.cell_px = cell_px;
        self
    }

    /// Archive a finished grid and return its number
    pub fn push(&mut self, grid: ScanGrid) -> usize {
        let number = self.scans.len() + 1;
        self.scans.push(ArchivedScan { number, grid });
        number
    }

    /// Scan by 1-based number
    pub fn get(&self, number: usize) -> Option<&ArchivedScan> {
        number.checked_sub(1).and_then(|i| self.scans.get(i))
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArchivedScan> {
        self.scans.iter()
    }

    /// Export one scan, choosing the format from the file extension
    pub fn export(&self, number: usize, path: &Path) -> Result<(), ExportError> {
        let scan = self.get(number).ok_or(ExportError::NoSuchScan(number))?;
        match ExportFormat::from_path(path)? {
            ExportFormat::Csv => csv::save_csv(&scan.grid, path),
            ExportFormat::Png => png::save_png(&scan.grid, path, self.cell_px),
        }
    }

    /// Export every scan into `dir` (created if missing)
    ///
    /// Returns the paths written, in scan order.
    pub fn export_all(
        &self,
        dir: &Path,
        formats: &[ExportFormat],
    ) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for scan in &self.scans {
            for &format in formats {
                let path = dir.join(scan.file_name(format));
                self.export(scan.number, &path)?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_sequential() {
        let mut archive = ScanArchive::new();
        assert!(archive.is_empty());
        assert_eq!(archive.push(ScanGrid::new()), 1);
        assert_eq!(archive.push(ScanGrid::new()), 2);
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.get(2).map(|s| s.label()), Some("Scan 2".to_string()));
        assert!(archive.get(0).is_none());
        assert!(archive.get(3).is_none());
    }

    #[test]
    fn test_file_names() {
        let mut archive = ScanArchive::new();
        archive.push(ScanGrid::new());
        let scan = archive.get(1).unwrap();
        assert_eq!(scan.file_name(ExportFormat::Csv), "scan-1.csv");
        assert_eq!(scan.file_name(ExportFormat::Png), "scan-1.png");
    }

    #[test]
    fn test_export_unknown_scan() {
        let archive = ScanArchive::new();
        assert!(matches!(
            archive.export(1, Path::new("x.csv")),
            Err(ExportError::NoSuchScan(1))
        ));
    }

    #[test]
    fn test_export_all() {
        let dir = std::env::temp_dir().join(format!("beskar-archive-{}", std::process::id()));
        let mut archive = ScanArchive::new();
        let mut grid = ScanGrid::new();
        grid.write(0, 0, 0.5).unwrap();
        archive.push(grid.clone());
        archive.push(grid);

        let written = archive
            .export_all(&dir, &[ExportFormat::Csv, ExportFormat::Png])
            .unwrap();
        assert_eq!(
            written,
            vec![
                dir.join("scan-1.csv"),
                dir.join("scan-1.png"),
                dir.join("scan-2.csv"),
                dir.join("scan-2.png"),
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_png_cell_size() {
        let dir = std::env::temp_dir().join(format!("beskar-archive-px-{}", std::process::id()));
        let mut archive = ScanArchive::new().with_cell_px(4);
        archive.push(ScanGrid::new());

        let written = archive.export_all(&dir, &[ExportFormat::Png]).unwrap();
        let img = image::open(&written[0]).unwrap();
        assert_eq!((img.width(), img.height()), (32, 32));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
