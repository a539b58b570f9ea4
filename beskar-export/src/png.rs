//! Heat-map rendering of a scan grid

use std::path::Path;

use beskar_core::grid::{ScanGrid, GRID_SIZE};
use image::{ImageFormat, Rgb, RgbImage};

use crate::ExportError;

/// Default edge length of one cell, in pixels
pub const CELL_PX: u32 = 32;

/// Position of `value` between `lo` and `hi`, in `[0, 1]`
fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Render `grid` with the viridis colour map, scaled to its own range
///
/// Row 0 is drawn at the top, column 0 at the left.
pub fn render(grid: &ScanGrid, cell_px: u32) -> RgbImage {
    let cell_px = cell_px.max(1);
    let (lo, hi) = grid.min_max();
    let edge = cell_px * GRID_SIZE as u32;

    RgbImage::from_fn(edge, edge, |x, y| {
        let row = (y / cell_px) as usize;
        let column = (x / cell_px) as usize;
        let value = grid.get(row, column).unwrap_or(lo);
        let color = colorous::VIRIDIS.eval_continuous(normalize(value, lo, hi));
        Rgb([color.r, color.g, color.b])
    })
}

/// Render `grid` and save it as a PNG file
pub fn save_png(grid: &ScanGrid, path: &Path, cell_px: u32) -> Result<(), ExportError> {
    render(grid, cell_px).save_with_format(path, ImageFormat::Png)?;
    log::info!("Exported scan heat map: {}", path.display());
    Ok(())
}
