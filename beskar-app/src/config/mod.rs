//! Configuration loading and settings persistence
//!
//! `beskar.toml` holds the static configuration (device, channels, scan
//! timing, export). `settings.toml` holds values the user changes from the
//! command line and is rewritten on every change.

pub mod loader;
pub mod settings;

pub use loader::{load, AppConfig, Channels, ConfigFileError};
pub use settings::{SettingsError, TomlSettings};
