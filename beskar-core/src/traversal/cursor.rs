//! Position tracking across scans

use super::pattern::{traversal_length, LedPosition, LedPositions};

/// Current LED position of a session
///
/// The cursor is created once per session and never rewound. Its current
/// position is where the next reading is written; each write moves it on
/// by one. A scan begun while the cursor rests on the origin sentinel is one
/// reading shorter than every later scan, which leaves the cycle-opening
/// cell unwritten in the first scan and writes the origin cell twice.
#[derive(Debug, Clone)]
pub struct LedCursor {
    positions: LedPositions,
    current: LedPosition,
}

impl Default for LedCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl LedCursor {
    /// Cursor resting on the origin sentinel (0-based)
    pub fn new() -> Self {
        Self::from_positions(LedPositions::new(true))
    }

    /// Cursor resting on the first position `positions` yields
    pub fn from_positions(mut positions: LedPositions) -> Self {
        let current = positions.advance();
        Self { positions, current }
    }

    /// Position the next reading belongs to
    pub fn current(&self) -> LedPosition {
        self.current
    }

    /// Number of readings the next scan takes
    pub fn scan_length(&self) -> usize {
        traversal_length(self.current.origin)
    }

    /// Move to the next position and return it
    pub fn advance(&mut self) -> LedPosition {
        self.current = self.positions.advance();
        self.current
    }
}
