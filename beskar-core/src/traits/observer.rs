//! Progress reporting and cooperative cancellation

use core::sync::atomic::{AtomicBool, Ordering};

use crate::acquisition::DarkCurrent;
use crate::grid::ScanGrid;
use crate::traversal::LedPosition;

/// Receives scan progress
///
/// All methods default to doing nothing so observers only implement what
/// they display. Calls happen synchronously between device operations.
pub trait ScanObserver {
    /// A scan of `length` readings is starting
    ///
    /// # Arguments
    /// * `index` - Position of the scan within its batch (0-based)
    /// * `length` - Number of readings the scan will take
    fn scan_started(&mut self, _index: u8, _length: usize) {}

    /// The dark-current baseline of the current scan was measured
    fn dark_current(&mut self, _dark: &DarkCurrent) {}

    /// `completed` readings are done; `next` is the upcoming LED position
    fn progress(&mut self, _completed: usize, _next: LedPosition) {}

    /// Set (`true`) or clear the stalled-reading notice
    fn reading_notice(&mut self, _stalled: bool) {}

    /// A scan finished; `grid` holds its readings
    fn scan_finished(&mut self, _index: u8, _grid: &ScanGrid) {}
}

impl ScanObserver for () {}

impl<T: ScanObserver + ?Sized> ScanObserver for &mut T {
    fn scan_started(&mut self, index: u8, length: usize) {
        (**self).scan_started(index, length)
    }

    fn dark_current(&mut self, dark: &DarkCurrent) {
        (**self).dark_current(dark)
    }

    fn progress(&mut self, completed: usize, next: LedPosition) {
        (**self).progress(completed, next)
    }

    fn reading_notice(&mut self, stalled: bool) {
        (**self).reading_notice(stalled)
    }

    fn scan_finished(&mut self, index: u8, grid: &ScanGrid) {
        (**self).scan_finished(index, grid)
    }
}

/// Process-wide exit request, polled at the top of every reading
pub trait ExitSignal {
    /// Check if the application is exiting
    fn exiting(&self) -> bool;
}

impl ExitSignal for AtomicBool {
    fn exiting(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: ExitSignal + ?Sized> ExitSignal for &T {
    fn exiting(&self) -> bool {
        (**self).exiting()
    }
}

/// Exit signal that is never raised
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExit;

impl ExitSignal for NeverExit {
    fn exiting(&self) -> bool {
        false
    }
}
