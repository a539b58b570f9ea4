//! Bias voltage math
//!
//! The kit's bias supply is driven by a 0–5 V analog output through an
//! inverting stage centred on [`KIT_CENTER`]. Requested voltages are
//! quantized to millivolts before any arithmetic.

mod bias;

pub use bias::{BiasError, BiasWindow, Millivolts, KIT_CENTER, OFFSET_MAX, OUTPUT_MAX};
