//! Compensated wait budgets
//!
//! The LED driver board advances on its own clock. After each reading the
//! sequencer waits for the next flash, shortened by however long the
//! reading took. Budgets never go negative; a slow step is not made up
//! later.

use crate::config::TimingConfig;

/// Where a reading sits within its scan and batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepPosition {
    /// Index of the reading within the scan (0-based)
    pub step: usize,
    /// Readings in the scan
    pub length: usize,
    /// The scan is the last of its batch
    pub last_scan: bool,
}

impl StepPosition {
    fn is_last_step(&self) -> bool {
        self.step + 1 == self.length
    }
}

/// Wait after a reading, in microseconds
///
/// # Arguments
/// * `timing` - Budgets in milliseconds
/// * `position` - The reading just taken
/// * `elapsed_us` - Time the reading took
pub fn wait_budget_us(timing: &TimingConfig, position: StepPosition, elapsed_us: u64) -> u64 {
    let budget_ms = match position.step {
        0 => timing.first_interval_ms,
        1 => timing.second_interval_ms,
        _ if position.is_last_step() && !position.last_scan => {
            // The next scan re-primes, so no compensation
            return u64::from(timing.inter_scan_ms) * 1000;
        }
        _ => timing.interval_ms,
    };
    (u64::from(budget_ms) * 1000).saturating_sub(elapsed_us)
}
