//! Scan sequencer
//!
//! Runs batches of scans: takes the dark-current baseline, pulses the LED
//! driver, then reads one grid cell per LED flash while keeping in step with
//! the driver board's cadence.

pub mod lock;
pub mod session;
pub mod timing;

pub use lock::{ScanGuard, ScanLock};
pub use session::{ScanError, ScanOutcome, ScanRig, ScanSession};
pub use timing::{wait_budget_us, StepPosition};
