//! Board-agnostic core logic for the SEAL kit scanner
//!
//! This crate contains all scanning logic that does not depend on a
//! specific DAQ binding:
//!
//! - LED traversal order (which grid cell each flash belongs to)
//! - Scan grid accumulation with stalled-reading detection
//! - Scan sequencer with compensated flash timing
//! - State machine for scan execution
//! - Dark-current baseline and bias-voltage window math
//! - Configuration type definitions and collaborator traits

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod acquisition;
pub mod config;
pub mod grid;
pub mod safety;
pub mod sequencer;
pub mod state;
pub mod traits;
pub mod traversal;
pub mod voltage;
