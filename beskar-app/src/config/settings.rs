//! `settings.toml` persistence

use std::path::{Path, PathBuf};

use log::*;

use beskar_core::config::{validate_scan_count, Settings};
use beskar_core::traits::SettingsStore;
use beskar_core::voltage::BiasWindow;

/// Settings store errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access the settings file")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize the settings")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings kept in a TOML file
///
/// A missing file yields the defaults. A file that cannot be parsed, or
/// holds values outside their valid ranges, is reset to the defaults.
pub struct TomlSettings {
    path: PathBuf,
}

impl TomlSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(text: &str) -> Option<Settings> {
        let settings: Settings = toml::from_str(text).ok()?;
        validate_scan_count(settings.scans).ok()?;
        BiasWindow::from_offset_volts(settings.voltage_offset).ok()?;
        Some(settings)
    }
}

impl SettingsStore for TomlSettings {
    type Error = SettingsError;

    fn load(&mut self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let text = std::fs::read_to_string(&self.path)?;
        match Self::parse(&text) {
            Some(settings) => Ok(settings),
            None => {
                warn!(
                    "Settings file {} is corrupt, resetting to defaults",
                    self.path.display()
                );
                let settings = Settings::default();
                self.store(&settings)?;
                Ok(settings)
            }
        }
    }

    fn store(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        let text = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, text)?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
