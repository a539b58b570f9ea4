//! Background work running next to the scan
//!
//! - [`progress`] - Embassy task logging scan progress
//! - [`exit`] - stdin watcher raising the exit signal

pub mod exit;
pub mod progress;

pub use exit::watch_stdin;
pub use progress::{flush, progress_task, ChannelObserver, ProgressEvent};
