//! Scan execution state machine
//!
//! The sequencer drives this machine; observers and the front end only read
//! it. Transitions are explicit and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::ScanState;
