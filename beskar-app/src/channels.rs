//! Shared state between the scan and its reporting tasks
//!
//! The scan itself runs on the main task. Progress is forwarded to the
//! progress task through a channel so logging never delays a reading.

use core::sync::atomic::AtomicBool;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use beskar_core::sequencer::ScanLock;

use crate::tasks::progress::ProgressEvent;

/// Channel capacity for progress events
const PROGRESS_CHANNEL_SIZE: usize = 32;

/// Scan progress for the progress task
pub static PROGRESS: Channel<CriticalSectionRawMutex, ProgressEvent, PROGRESS_CHANNEL_SIZE> =
    Channel::new();

/// Raised when the user asks the application to exit
pub static EXITING: AtomicBool = AtomicBool::new(false);

/// Held for the duration of a scan batch
pub static SCAN_LOCK: ScanLock = ScanLock::new();
