//! 8×8 accumulator with write averaging

use heapless::HistoryBuffer;

use crate::traversal::LedPosition;

/// Rows and columns of the LED array
pub const GRID_SIZE: usize = 8;

/// Number of recent writes inspected for stalled readings
pub const STALL_WINDOW: usize = 4;

/// Grid access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GridError {
    /// Coordinates outside the 8×8 array
    OutOfBounds { row: usize, column: usize },
}

impl core::fmt::Display for GridError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GridError::OutOfBounds { row, column } => {
                write!(f, "grid position ({}, {}) is out of bounds", row, column)
            }
        }
    }
}

/// Readings of one scan
///
/// Cells start at 0.0. Writing a cell that is already non-zero stores the
/// mean of the old and new values rather than overwriting.
#[derive(Debug, Clone)]
pub struct ScanGrid {
    cells: [[f64; GRID_SIZE]; GRID_SIZE],
    recent: HistoryBuffer<f64, STALL_WINDOW>,
    writes: usize,
}

impl Default for ScanGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanGrid {
    /// An all-zero grid
    pub const fn new() -> Self {
        Self {
            cells: [[0.0; GRID_SIZE]; GRID_SIZE],
            recent: HistoryBuffer::new(),
            writes: 0,
        }
    }

    /// Store a reading at `(row, column)`
    ///
    /// A cell that already holds a reading keeps the mean of the old and new
    /// values. Returns the value now held by the cell; that stored value is
    /// what enters the recent-write history.
    pub fn write(&mut self, row: usize, column: usize, value: f64) -> Result<f64, GridError> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(GridError::OutOfBounds { row, column })?;

        *cell = if *cell != 0.0 {
            (*cell + value) / 2.0
        } else {
            value
        };

        self.recent.write(*cell);
        self.writes += 1;
        Ok(*cell)
    }

    /// Store a reading at an LED position
    pub fn write_at(&mut self, position: LedPosition, value: f64) -> Result<f64, GridError> {
        let (row, column) = position.coords();
        self.write(row, column, value)
    }

    /// Value of a cell, or `None` when out of bounds
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    /// All cells, row-major
    pub fn rows(&self) -> &[[f64; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    /// Total writes since creation
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// True once at least [`STALL_WINDOW`] writes happened and the most
    /// recent ones were all exactly zero
    pub fn last_values_zero(&self) -> bool {
        self.recent.len() == STALL_WINDOW && self.recent.as_slice().iter().all(|&v| v == 0.0)
    }

    /// Smallest and largest cell values
    pub fn min_max(&self) -> (f64, f64) {
        self.cells
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}
