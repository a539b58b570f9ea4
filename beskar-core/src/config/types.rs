//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::acquisition::MAX_SAMPLES;

/// Maximum scans in one batch
pub const MAX_SCANS_PER_BATCH: u8 = 10;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A sample count is zero
    NoSamples,
    /// A sample count exceeds the acquisition buffer
    TooManySamples,
    /// Scans per batch outside `1..=MAX_SCANS_PER_BATCH`
    InvalidScanCount,
    /// Settle or interval duration is zero
    InvalidTiming,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoSamples => f.write_str("sample count must be at least 1"),
            ConfigError::TooManySamples => {
                write!(f, "sample count must be at most {}", MAX_SAMPLES)
            }
            ConfigError::InvalidScanCount => {
                write!(f, "scans per batch must be 1..={}", MAX_SCANS_PER_BATCH)
            }
            ConfigError::InvalidTiming => f.write_str("timing durations must be non-zero"),
        }
    }
}

/// Wait budgets between LED flashes, in milliseconds
///
/// The defaults keep the photodiode response in step with the LED driver
/// board's own cadence. Each budget is shortened by the time the step spent
/// reading and writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct TimingConfig {
    /// Delay between the LED pulse and the first reading
    pub settle_ms: u32,
    /// Budget after the first reading
    pub first_interval_ms: u32,
    /// Budget after the second reading
    pub second_interval_ms: u32,
    /// Budget after every other reading
    pub interval_ms: u32,
    /// Flat wait after the last reading of a scan followed by another scan
    pub inter_scan_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 412,
            first_interval_ms: 492,
            second_interval_ms: 820 - 1,
            interval_ms: 860 - 1,
            inter_scan_ms: 1000,
        }
    }
}

/// Scan acquisition configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ScanConfig {
    /// Raw samples per reading (the peak is kept)
    pub samples_per_reading: u8,
    /// Samples averaged into the dark-current baseline
    pub dark_current_samples: u8,
    /// Scans per batch when the settings store has no value
    pub default_scans: u8,
    /// Wait budgets
    pub timing: TimingConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            samples_per_reading: 10,
            dark_current_samples: 10,
            default_scans: 1,
            timing: TimingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Check every field is usable by the sequencer
    pub fn validate(&self) -> Result<(), ConfigError> {
        for count in [self.samples_per_reading, self.dark_current_samples] {
            if count == 0 {
                return Err(ConfigError::NoSamples);
            }
            if count as usize > MAX_SAMPLES {
                return Err(ConfigError::TooManySamples);
            }
        }
        validate_scan_count(self.default_scans)?;

        let t = &self.timing;
        if t.settle_ms == 0 || t.interval_ms == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        Ok(())
    }
}

/// Check a requested number of scans per batch
pub fn validate_scan_count(scans: u8) -> Result<(), ConfigError> {
    if (1..=MAX_SCANS_PER_BATCH).contains(&scans) {
        Ok(())
    } else {
        Err(ConfigError::InvalidScanCount)
    }
}

/// User settings persisted between runs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Settings {
    /// Scans per batch
    pub scans: u8,
    /// Last bias voltage applied to the kit (V)
    pub applied_voltage: f64,
    /// Calibrated voltage offset (V)
    pub voltage_offset: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scans: 1,
            applied_voltage: 0.0,
            voltage_offset: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ScanConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_timing() {
        let t = TimingConfig::default();
        assert_eq!(t.settle_ms, 412);
        assert_eq!(t.first_interval_ms, 492);
        assert_eq!(t.second_interval_ms, 819);
        assert_eq!(t.interval_ms, 859);
        assert_eq!(t.inter_scan_ms, 1000);
    }

    #[test]
    fn test_rejects_bad_sample_counts() {
        let mut config = ScanConfig::default();
        config.samples_per_reading = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoSamples));

        config.samples_per_reading = 10;
        config.dark_current_samples = u8::MAX;
        assert_eq!(config.validate(), Err(ConfigError::TooManySamples));
    }

    #[test]
    fn test_scan_count_bounds() {
        assert_eq!(validate_scan_count(0), Err(ConfigError::InvalidScanCount));
        assert_eq!(validate_scan_count(1), Ok(()));
        assert_eq!(validate_scan_count(10), Ok(()));
        assert_eq!(validate_scan_count(11), Err(ConfigError::InvalidScanCount));
    }

    #[test]
    fn test_rejects_zero_cadence() {
        let mut config = ScanConfig::default();
        config.timing.interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }
}
