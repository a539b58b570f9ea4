//! Desktop device access
//!
//! - [`nidaqmx`] - NI-DAQmx binding, loaded at runtime
//! - [`time`] - Embassy-backed monotonic clock

pub mod nidaqmx;
pub mod time;

pub use nidaqmx::NiDaqmx;
pub use time::EmbassyClock;
