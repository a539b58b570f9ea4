//! `beskar.toml` loading

use std::path::{Path, PathBuf};

use log::*;
use serde::{Deserialize, Serialize};

use beskar_core::config::{ConfigError, ScanConfig};
use beskar_hal::{AnalogInputChannel, AnalogOutputChannel, DigitalLine};

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("failed to read the configuration file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse the configuration file")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scan configuration: {0}")]
    Invalid(ConfigError),
    #[error("invalid {kind} channel name {name:?}")]
    Channel { kind: &'static str, name: String },
}

/// Channel names as written in the file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChannelNames {
    pub photodiode: String,
    pub led: String,
    pub bias: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            photodiode: "ai1".into(),
            led: "port0/line0".into(),
            bias: "ao0".into(),
        }
    }
}

/// Parsed channel identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    pub photodiode: AnalogInputChannel,
    pub led: DigitalLine,
    pub bias: AnalogOutputChannel,
}

impl ChannelNames {
    /// Parse every name
    pub fn resolve(&self) -> Result<Channels, ConfigFileError> {
        fn parse<T: std::str::FromStr>(kind: &'static str, name: &str) -> Result<T, ConfigFileError> {
            name.parse().map_err(|_| ConfigFileError::Channel {
                kind,
                name: name.to_string(),
            })
        }

        Ok(Channels {
            photodiode: parse("photodiode", &self.photodiode)?,
            led: parse("led", &self.led)?,
            bias: parse("bias", &self.bias)?,
        })
    }
}

/// Export defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Directory finished scans are written to
    pub directory: PathBuf,
    /// Also write a PNG heat map per scan
    pub png: bool,
    /// Heat-map cell size in pixels
    pub cell_px: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("scans"),
            png: false,
            cell_px: beskar_export::png::CELL_PX,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    /// NI device name
    pub device: Option<String>,
    /// Path of the persisted settings
    pub settings_file: PathBuf,
    pub channels: ChannelNames,
    pub scan: ScanConfig,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: None,
            settings_file: PathBuf::from("settings.toml"),
            channels: ChannelNames::default(),
            scan: ScanConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        let config: AppConfig = toml::from_str(text)?;
        config.scan.validate().map_err(ConfigFileError::Invalid)?;
        config.channels.resolve()?;
        Ok(config)
    }

    /// Parsed channel identifiers
    pub fn channels(&self) -> Result<Channels, ConfigFileError> {
        self.channels.resolve()
    }
}

/// Load the configuration at `path`, or the defaults when it does not exist
pub fn load(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        info!("No configuration at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let text = std::fs::read_to_string(path)?;
    let config = AppConfig::parse(&text)?;
    info!("Configuration loaded from {}", path.display());
    debug!("{:?}", config);
    Ok(config)
}
