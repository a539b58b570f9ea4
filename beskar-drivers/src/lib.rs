//! SEAL kit driver implementations
//!
//! This crate provides concrete implementations of the traits defined in
//! beskar-core on top of the beskar-hal DAQ traits:
//!
//! - Photodiode sampler (finite analog reads)
//! - LED driver control line (active-low digital output)
//! - Bias supply (static analog output)
//! - Mocked variants producing pseudo-random samples for offline use

#![no_std]
#![deny(unsafe_code)]

pub mod bias;
pub mod led;
pub mod mock;
pub mod sampler;

pub use bias::DaqBias;
pub use led::DaqLed;
pub use mock::{MockBias, MockLed, MockSampler};
pub use sampler::DaqSampler;
