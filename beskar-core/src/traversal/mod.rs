//! LED traversal order
//!
//! The SEAL kit has an 8×8 array of LEDs. Scans visit them in a fixed,
//! interleaved order so that neighbouring cells are never flashed back to
//! back. [`LedPositions`] produces that order forever; [`LedCursor`] tracks
//! which position the next reading belongs to across a batch of scans.

pub mod cursor;
pub mod pattern;

pub use cursor::LedCursor;
pub use pattern::{
    traversal_length, LedPosition, LedPositions, COLUMN_PATTERN, CYCLE_TRAVERSAL_LEN,
    FIRST_TRAVERSAL_LEN, ROW_PATTERN,
};
