//! Reading monitor implementation

use crate::acquisition::DarkCurrent;
use crate::grid::ScanGrid;

/// Reading health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingStatus {
    /// All conditions normal
    Ok,
    /// The most recent writes were all zero
    Stalled,
    /// The scan's dark current exceeded the warning level
    HighDarkCurrent,
}

/// Tracks reading health across a scan
#[derive(Debug, Clone, Default)]
pub struct ReadingMonitor {
    stalled: bool,
    high_dark_current: bool,
    /// Number of times the stalled notice was raised
    stall_events: u32,
}

impl ReadingMonitor {
    /// Create a new monitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from a fresh dark-current measurement
    pub fn update_dark_current(&mut self, dark: &DarkCurrent) {
        self.high_dark_current = dark.is_unusually_high();
    }

    /// Update after a grid write
    ///
    /// Returns `true` when the stalled notice changed.
    pub fn update_grid(&mut self, grid: &ScanGrid) -> bool {
        let stalled = grid.last_values_zero();
        let changed = stalled != self.stalled;
        if changed && stalled {
            self.stall_events = self.stall_events.saturating_add(1);
        }
        self.stalled = stalled;
        changed
    }

    /// Clear per-scan state
    pub fn reset_scan(&mut self) {
        self.stalled = false;
        self.high_dark_current = false;
    }

    /// Check if the stalled-reading notice is raised
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Times the stalled notice was raised since creation
    pub fn stall_events(&self) -> u32 {
        self.stall_events
    }

    /// Check all conditions
    ///
    /// Stalled readings take priority over a high baseline.
    pub fn check(&self) -> ReadingStatus {
        if self.stalled {
            return ReadingStatus::Stalled;
        }
        if self.high_dark_current {
            return ReadingStatus::HighDarkCurrent;
        }
        ReadingStatus::Ok
    }
}
