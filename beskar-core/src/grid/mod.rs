//! Scan grid accumulation
//!
//! Each scan writes its readings into an 8×8 grid of `f64` values. The grid
//! also keeps a short history of the most recent writes so the sequencer can
//! notice when the photodiode stops responding.

mod accumulator;

pub use accumulator::{GridError, ScanGrid, GRID_SIZE, STALL_WINDOW};
