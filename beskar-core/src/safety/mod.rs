//! Reading health monitoring
//!
//! Flags conditions the operator should see while a scan runs: the
//! photodiode returning nothing but zeros, or a baseline too high to trust.

mod monitor;

pub use monitor::{ReadingMonitor, ReadingStatus};
