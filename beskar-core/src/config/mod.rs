//! Configuration types
//!
//! Board-agnostic scan configuration and persisted user settings. The front
//! end deserializes these from TOML when the `serde` feature is enabled.

pub mod types;

pub use types::*;
