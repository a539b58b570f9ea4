//! Application error type

use beskar_core::config::ConfigError;
use beskar_core::sequencer::ScanError;
use beskar_core::voltage::BiasError;
use beskar_drivers::bias::BiasSupplyError;
use beskar_hal::DaqError;

use crate::config::{ConfigFileError, SettingsError};

/// Errors surfaced by the command-line front end
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error")]
    Config(#[from] ConfigFileError),
    #[error("settings error")]
    Settings(#[from] SettingsError),
    #[error("export failed")]
    Export(#[from] beskar_export::ExportError),
    #[error("{0}")]
    Daq(DaqError),
    #[error("scan failed: {0}")]
    Scan(ScanError),
    #[error("invalid bias voltage: {0}")]
    Bias(BiasError),
    #[error("invalid request: {0}")]
    Request(ConfigError),
    #[error("no SEAL kit found; connect one or pass --mocked")]
    NoDevice,
    #[error("failed to spawn the {0} task")]
    Spawn(&'static str),
}

impl From<DaqError> for AppError {
    fn from(e: DaqError) -> Self {
        match e {
            DaqError::DriverMissing | DaqError::DeviceNotFound => AppError::NoDevice,
            e => AppError::Daq(e),
        }
    }
}

impl From<ScanError> for AppError {
    fn from(e: ScanError) -> Self {
        AppError::Scan(e)
    }
}

impl From<BiasError> for AppError {
    fn from(e: BiasError) -> Self {
        AppError::Bias(e)
    }
}

impl From<BiasSupplyError> for AppError {
    fn from(e: BiasSupplyError) -> Self {
        match e {
            BiasSupplyError::Window(e) => AppError::Bias(e),
            BiasSupplyError::Daq(e) => e.into(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Request(e)
    }
}
