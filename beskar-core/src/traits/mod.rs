//! Collaborator traits
//!
//! These traits define the interface between the scan sequencer and the
//! device-, UI- and storage-specific implementations around it.

pub mod kit;
pub mod observer;
pub mod settings;

pub use kit::{BiasOutput, LedControl, SampleSource};
pub use observer::{ExitSignal, NeverExit, ScanObserver};
pub use settings::SettingsStore;
