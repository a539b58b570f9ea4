//! Deterministic LED position generator

/// Row visiting order within a column (1-based)
pub const ROW_PATTERN: [u8; 8] = [7, 2, 5, 4, 3, 6, 1, 8];

/// Column visiting order after the origin column (1-based)
pub const COLUMN_PATTERN: [u8; 7] = [8, 2, 6, 7, 3, 5, 1];

/// Column every traversal starts in (1-based)
pub const ORIGIN_COLUMN: u8 = 4;

/// Column order of every traversal after the first
const CYCLE_COLUMNS: [u8; 8] = [
    ORIGIN_COLUMN,
    COLUMN_PATTERN[0],
    COLUMN_PATTERN[1],
    COLUMN_PATTERN[2],
    COLUMN_PATTERN[3],
    COLUMN_PATTERN[4],
    COLUMN_PATTERN[5],
    COLUMN_PATTERN[6],
];

/// Readings taken by a scan that starts on the origin sentinel
pub const FIRST_TRAVERSAL_LEN: usize = 64;

/// Readings taken by every later scan (one extra origin-column read)
pub const CYCLE_TRAVERSAL_LEN: usize = 65;

/// Number of readings a scan takes given its starting position
pub const fn traversal_length(starts_on_origin: bool) -> usize {
    if starts_on_origin {
        FIRST_TRAVERSAL_LEN
    } else {
        CYCLE_TRAVERSAL_LEN
    }
}

/// One LED of the array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedPosition {
    /// Row index
    pub row: u8,
    /// Column index
    pub column: u8,
    /// Set only on the very first position a generator yields
    pub origin: bool,
}

impl LedPosition {
    /// A regular position
    pub const fn new(row: u8, column: u8) -> Self {
        Self {
            row,
            column,
            origin: false,
        }
    }

    /// The origin sentinel
    const fn sentinel(row: u8, column: u8) -> Self {
        Self {
            row,
            column,
            origin: true,
        }
    }

    /// Grid coordinates as `(row, column)`
    pub fn coords(&self) -> (usize, usize) {
        (self.row as usize, self.column as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sentinel,
    RepeatOrigin,
    OriginColumn { row: usize },
    FirstSweep { column: usize, row: usize },
    CycleStart,
    CycleSweep { column: usize, row: usize },
}

/// Infinite LED position sequence
///
/// The first traversal opens with the sentinel at (2, 4), repeats it as a
/// regular position, finishes column 4 and then sweeps the remaining
/// columns. Every later traversal opens with (7, 4) and sweeps all eight
/// columns, column 4 included.
#[derive(Debug, Clone)]
pub struct LedPositions {
    offset: u8,
    phase: Phase,
}

impl LedPositions {
    /// Start a generator at the origin sentinel
    ///
    /// # Arguments
    /// * `start_at_zero` - Yield 0-based indices instead of 1-based
    pub const fn new(start_at_zero: bool) -> Self {
        Self {
            offset: start_at_zero as u8,
            phase: Phase::Sentinel,
        }
    }

    /// Start a generator at the beginning of the repeating cycle
    pub const fn cycling(start_at_zero: bool) -> Self {
        Self {
            offset: start_at_zero as u8,
            phase: Phase::CycleStart,
        }
    }

    /// Produce the next position
    ///
    /// The sequence never ends, so unlike [`Iterator::next`] this cannot
    /// fail.
    pub fn advance(&mut self) -> LedPosition {
        let (position, next) = match self.phase {
            Phase::Sentinel => {
                let p = self.at(ROW_PATTERN[1], ORIGIN_COLUMN);
                (
                    LedPosition::sentinel(p.row, p.column),
                    Phase::RepeatOrigin,
                )
            }
            Phase::RepeatOrigin => (
                self.at(ROW_PATTERN[1], ORIGIN_COLUMN),
                Phase::OriginColumn { row: 2 },
            ),
            Phase::OriginColumn { row } => {
                let next = if row + 1 < ROW_PATTERN.len() {
                    Phase::OriginColumn { row: row + 1 }
                } else {
                    Phase::FirstSweep { column: 0, row: 0 }
                };
                (self.at(ROW_PATTERN[row], ORIGIN_COLUMN), next)
            }
            Phase::FirstSweep { column, row } => {
                let next = match step(column, row, COLUMN_PATTERN.len()) {
                    Some((column, row)) => Phase::FirstSweep { column, row },
                    None => Phase::CycleStart,
                };
                (self.at(ROW_PATTERN[row], COLUMN_PATTERN[column]), next)
            }
            Phase::CycleStart => (
                self.at(ROW_PATTERN[0], ORIGIN_COLUMN),
                Phase::CycleSweep { column: 0, row: 0 },
            ),
            Phase::CycleSweep { column, row } => {
                let next = match step(column, row, CYCLE_COLUMNS.len()) {
                    Some((column, row)) => Phase::CycleSweep { column, row },
                    None => Phase::CycleStart,
                };
                (self.at(ROW_PATTERN[row], CYCLE_COLUMNS[column]), next)
            }
        };
        self.phase = next;
        position
    }

    fn at(&self, row: u8, column: u8) -> LedPosition {
        LedPosition::new(row - self.offset, column - self.offset)
    }
}

/// Advance a column-major sweep, returning `None` once it is exhausted
fn step(column: usize, row: usize, columns: usize) -> Option<(usize, usize)> {
    if row + 1 < ROW_PATTERN.len() {
        Some((column, row + 1))
    } else if column + 1 < columns {
        Some((column + 1, 0))
    } else {
        None
    }
}

impl Iterator for LedPositions {
    type Item = LedPosition;

    fn next(&mut self) -> Option<LedPosition> {
        Some(self.advance())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl core::iter::FusedIterator for LedPositions {}
