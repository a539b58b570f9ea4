//! Scan progress reporting
//!
//! [`ChannelObserver`] is handed to the sequencer. It forwards what happens
//! during a scan to [`progress_task`] without blocking and keeps every
//! finished grid for export.

use embassy_time::Timer;
use log::*;

use beskar_core::acquisition::DarkCurrent;
use beskar_core::grid::ScanGrid;
use beskar_core::traits::ScanObserver;
use beskar_core::traversal::LedPosition;
use beskar_export::ScanArchive;

use crate::channels::PROGRESS;

/// What the progress task reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    ScanStarted {
        /// 1-based scan number within the batch
        number: u8,
        of: u8,
        length: usize,
    },
    DarkCurrent {
        baseline: f64,
        peak: f64,
        high: bool,
    },
    Progress {
        completed: usize,
        length: usize,
        next: LedPosition,
    },
    Notice {
        stalled: bool,
    },
    ScanFinished {
        number: u8,
        min: f64,
        max: f64,
    },
}

/// Percentage of a scan completed, rounded down
pub fn percent(completed: usize, length: usize) -> usize {
    if length == 0 {
        return 100;
    }
    completed.min(length) * 100 / length
}

/// Observer forwarding to [`PROGRESS`] and archiving finished grids
pub struct ChannelObserver {
    scans: u8,
    length: usize,
    stalled: bool,
    archive: ScanArchive,
}

impl ChannelObserver {
    /// Observer for a batch of `scans`
    pub fn new(scans: u8) -> Self {
        Self {
            scans,
            length: 0,
            stalled: false,
            archive: ScanArchive::new(),
        }
    }

    /// Finished grids, in scan order
    pub fn into_archive(self) -> ScanArchive {
        self.archive
    }

    fn send(&self, event: ProgressEvent) {
        if PROGRESS.try_send(event).is_err() {
            debug!("Progress channel full, dropped {:?}", event);
        }
    }
}

impl ScanObserver for ChannelObserver {
    fn scan_started(&mut self, index: u8, length: usize) {
        self.length = length;
        self.stalled = false;
        self.send(ProgressEvent::ScanStarted {
            number: index + 1,
            of: self.scans,
            length,
        });
    }

    fn dark_current(&mut self, dark: &DarkCurrent) {
        self.send(ProgressEvent::DarkCurrent {
            baseline: dark.baseline(),
            peak: dark.peak(),
            high: dark.is_unusually_high(),
        });
    }

    fn progress(&mut self, completed: usize, next: LedPosition) {
        self.send(ProgressEvent::Progress {
            completed,
            length: self.length,
            next,
        });
    }

    fn reading_notice(&mut self, stalled: bool) {
        // Only edges are reported
        if stalled != self.stalled {
            self.stalled = stalled;
            self.send(ProgressEvent::Notice { stalled });
        }
    }

    fn scan_finished(&mut self, index: u8, grid: &ScanGrid) {
        let (min, max) = grid.min_max();
        self.archive.push(grid.clone());
        self.send(ProgressEvent::ScanFinished {
            number: index + 1,
            min,
            max,
        });
    }
}

/// Progress task
///
/// Logs every event sent by [`ChannelObserver`].
#[embassy_executor::task]
pub async fn progress_task() {
    info!("Progress task started");

    loop {
        match PROGRESS.receive().await {
            ProgressEvent::ScanStarted { number, of, length } => {
                info!("Scan {} of {} started ({} readings)", number, of, length);
            }
            ProgressEvent::DarkCurrent {
                baseline,
                peak,
                high,
            } => {
                info!("Dark current baseline {:.4} V (peak {:.4} V)", baseline, peak);
                if high {
                    warn!(
                        "Dark current is unusually high ({:.3} V); check the kit is covered",
                        peak
                    );
                }
            }
            ProgressEvent::Progress {
                completed,
                length,
                next,
            } => {
                info!(
                    "{:>3}% ({}/{}), next LED row {} column {}",
                    percent(completed, length),
                    completed,
                    length,
                    next.row,
                    next.column
                );
            }
            ProgressEvent::Notice { stalled: true } => {
                warn!("Readings are all zero; check the photodiode connection");
            }
            ProgressEvent::Notice { stalled: false } => {
                info!("Readings recovered");
            }
            ProgressEvent::ScanFinished { number, min, max } => {
                info!("Scan {} finished (min {:.4} V, max {:.4} V)", number, min, max);
            }
        }
    }
}

/// Wait until the progress task has taken every queued event
pub async fn flush() {
    while !PROGRESS.is_empty() {
        Timer::after_millis(5).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 64), 0);
        assert_eq!(percent(32, 64), 50);
        assert_eq!(percent(64, 64), 100);
        assert_eq!(percent(70, 64), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn test_observer_archives_finished_grids() {
        let mut observer = ChannelObserver::new(2);
        let mut grid = ScanGrid::new();
        grid.write(0, 0, 0.25).unwrap();

        observer.scan_started(0, 64);
        observer.scan_finished(0, &grid);
        observer.scan_finished(1, &ScanGrid::new());

        let archive = observer.into_archive();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.get(1).unwrap().grid.get(0, 0), Some(0.25));
        assert_eq!(archive.get(2).unwrap().grid.get(0, 0), Some(0.0));

        // Drain what the observer queued
        while PROGRESS.try_receive().is_ok() {}
    }

    #[test]
    fn test_notice_tracks_edges() {
        let mut observer = ChannelObserver::new(1);
        observer.scan_started(0, 64);
        observer.reading_notice(true);
        assert!(observer.stalled);
        observer.reading_notice(true);
        observer.reading_notice(false);
        assert!(!observer.stalled);

        observer.reading_notice(true);
        observer.scan_started(0, 65);
        assert!(!observer.stalled);

        while PROGRESS.try_receive().is_ok() {}
    }
}
