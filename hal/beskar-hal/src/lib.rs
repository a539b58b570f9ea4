//! Beskar Hardware Abstraction Layer
//!
//! This crate defines the data-acquisition traits the scan sequencer and the
//! front end are written against. A concrete DAQ binding (NI-DAQmx on the
//! desktop) or a test double implements them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (beskar-app)               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  beskar-core / beskar-drivers           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  beskar-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  NI-DAQmx binding / test doubles        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`daq::AnalogInput`] - Finite voltage sample reads
//! - [`daq::AnalogOutput`] - Static voltage writes
//! - [`daq::DigitalOutput`] - Single line writes
//! - [`clock::Clock`] - Monotonic time source

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod clock;
pub mod daq;

// Re-export key traits at crate root for convenience
pub use channel::{AnalogInputChannel, AnalogOutputChannel, DigitalLine, VoltageRange};
pub use clock::Clock;
pub use daq::{AnalogInput, AnalogOutput, DaqError, DigitalOutput};
