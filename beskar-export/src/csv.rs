//! CSV serialization of a scan grid

use std::fs::File;
use std::io::Write;
use std::path::Path;

use beskar_core::grid::{ScanGrid, GRID_SIZE};

use crate::ExportError;

/// Header record: `Column 1` .. `Column 8`
pub fn header() -> Vec<String> {
    (1..=GRID_SIZE).map(|c| format!("Column {}", c)).collect()
}

/// Shortest round-trip form of `value`
///
/// `{:?}` gives the digits and the switch to scientific notation; the
/// exponent is widened to a signed two-digit field (`1e-05`, `1e+16`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let s = format!("{:?}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

/// Write `grid` as CSV to `writer`
pub fn write_csv<W: Write>(grid: &ScanGrid, writer: W) -> Result<(), ExportError> {
    let mut wtr = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::CRLF)
        .from_writer(writer);
    wtr.write_record(header())?;
    for row in grid.rows() {
        wtr.write_record(row.iter().map(|&v| format_value(v)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `grid` as CSV to the file at `path`
pub fn save_csv(grid: &ScanGrid, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(grid, file)?;
    log::info!("Exported scan CSV: {}", path.display());
    Ok(())
}
