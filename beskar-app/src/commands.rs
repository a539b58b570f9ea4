//! Command implementations
//!
//! Each command opens the kit (or its mocked stand-in), performs one job and
//! returns. Values the user chooses (bias voltage, offset, scans per batch)
//! are persisted through [`TomlSettings`].

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use embedded_hal_async::delay::DelayNs;
use log::*;

use beskar_core::acquisition::DarkCurrent;
use beskar_core::config::validate_scan_count;
use beskar_core::sequencer::{ScanOutcome, ScanRig, ScanSession};
use beskar_core::traits::{LedControl, SampleSource, SettingsStore};
use beskar_core::voltage::{BiasWindow, Millivolts};
use beskar_drivers::bias::{apply_bias, apply_offset};
use beskar_drivers::{DaqBias, DaqLed, DaqSampler, MockBias, MockLed, MockSampler};
use beskar_export::{ExportFormat, ScanArchive};
use beskar_hal::{DaqError, VoltageRange};

use crate::channels::{EXITING, SCAN_LOCK};
use crate::config::{AppConfig, Channels, TomlSettings};
use crate::daq::{EmbassyClock, NiDaqmx};
use crate::error::AppError;
use crate::tasks::ChannelObserver;

/// What to do with the LED driver line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedAction {
    On,
    Off,
    Flash,
}

impl std::str::FromStr for LedAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(LedAction::On),
            "off" => Ok(LedAction::Off),
            "flash" => Ok(LedAction::Flash),
            other => Err(format!("unknown LED action {:?} (on, off, flash)", other)),
        }
    }
}

/// The SEAL kit, or nothing in mocked mode
pub enum Kit {
    Hardware(NiDaqmx),
    Mocked,
}

impl Kit {
    pub fn open(config: &AppConfig, mocked: bool) -> Result<Self, AppError> {
        if mocked {
            info!("Mocked mode: no device access");
            return Ok(Kit::Mocked);
        }
        Ok(Kit::Hardware(NiDaqmx::open(config.device.as_deref())?))
    }
}

/// Fold a timestamp into a 64-bit seed
fn seed_from(since_epoch: Duration) -> u64 {
    since_epoch.as_secs() ^ u64::from(since_epoch.subsec_nanos())
}

fn mock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(seed_from)
        .unwrap_or_default()
}

/// List attached DAQ devices
pub fn list_devices() -> Result<(), AppError> {
    let devices = match NiDaqmx::devices() {
        Ok(devices) => devices,
        Err(DaqError::DriverMissing) => {
            warn!("NI-DAQmx is not installed");
            Vec::new()
        }
        Err(e) => return Err(AppError::Daq(e)),
    };

    info!("{} device(s) found", devices.len());
    for name in &devices {
        println!("{}", name);
    }
    Ok(())
}

/// Measure and report the dark current
pub fn dark_current(config: &AppConfig, kit: &Kit) -> Result<DarkCurrent, AppError> {
    let count = usize::from(config.scan.dark_current_samples);
    let channels = config.channels()?;

    let dark = match kit {
        Kit::Hardware(daq) => {
            let mut sampler = photodiode(daq, &channels);
            DarkCurrent::measure(&mut sampler, count)?
        }
        Kit::Mocked => DarkCurrent::measure(&mut MockSampler::dark_current(mock_seed()), count)?,
    };

    info!("Dark current baseline {:.4} V (peak {:.4} V)", dark.baseline(), dark.peak());
    if dark.is_unusually_high() {
        warn!("Dark current is unusually high; check the kit is covered");
    }
    Ok(dark)
}

/// Apply a bias voltage and remember it
pub fn apply_voltage(
    kit: &Kit,
    channels: &Channels,
    settings: &mut TomlSettings,
    volts: f64,
) -> Result<Millivolts, AppError> {
    let stored = settings.load()?;
    let window = BiasWindow::from_offset_volts(stored.voltage_offset)?;
    let requested = Millivolts::from_volts(volts);

    if window.near_limit(requested) {
        warn!(
            "{} is close to the limit of {} to {}; accuracy may suffer",
            requested,
            window.min(),
            window.max()
        );
    }

    let level = match kit {
        Kit::Hardware(daq) => apply_bias(&mut DaqBias::new(daq, channels.bias), &window, requested)?,
        Kit::Mocked => apply_bias(&mut MockBias, &window, requested)?,
    };
    info!("Applied {} (output {})", requested, level);

    settings.update(|s| s.applied_voltage = requested.as_volts())?;
    Ok(requested)
}

/// Drive the calibration offset alone and remember it
pub fn calibrate_offset(
    kit: &Kit,
    channels: &Channels,
    settings: &mut TomlSettings,
    volts: f64,
) -> Result<BiasWindow, AppError> {
    let window = BiasWindow::from_offset_volts(volts)?;

    let level = match kit {
        Kit::Hardware(daq) => apply_offset(&mut DaqBias::new(daq, channels.bias), &window)?,
        Kit::Mocked => apply_offset(&mut MockBias, &window)?,
    };
    info!(
        "Calibration output {}; selectable bias is now {} to {}",
        level,
        window.min(),
        window.max()
    );

    settings.update(|s| s.voltage_offset = window.offset().as_volts())?;
    Ok(window)
}

/// Switch the LED driver line
pub fn leds(kit: &Kit, channels: &Channels, action: LedAction) -> Result<(), AppError> {
    match kit {
        Kit::Hardware(daq) => drive_led(&mut DaqLed::new(daq, channels.led), action)?,
        Kit::Mocked => drive_led(&mut MockLed, action)?,
    }
    info!("LED driver: {:?}", action);
    Ok(())
}

fn drive_led<L: LedControl>(led: &mut L, action: LedAction) -> Result<(), DaqError> {
    match action {
        LedAction::On => led.on(),
        LedAction::Off => led.off(),
        LedAction::Flash => led.flash(),
    }
}

fn photodiode<'a>(daq: &'a NiDaqmx, channels: &Channels) -> DaqSampler<&'a NiDaqmx> {
    DaqSampler::new(daq, channels.photodiode, VoltageRange::BIPOLAR_10V)
}

/// A finished (or cancelled) batch, ready for export
pub struct Batch {
    /// Scans requested
    pub scans: u8,
    /// Grids of the scans that finished
    pub archive: ScanArchive,
    /// How the batch ended
    pub outcome: Result<ScanOutcome, AppError>,
}

impl Batch {
    /// Export every finished scan, then report how the batch ended
    ///
    /// Scans finished before an exit request or a device error are still
    /// exported. Returns the paths written.
    pub fn export(
        self,
        config: &AppConfig,
        out: Option<&Path>,
        png: bool,
    ) -> Result<Vec<PathBuf>, AppError> {
        let written = export(config, &self.archive, out, png)?;

        match self.outcome? {
            ScanOutcome::Completed => info!("Batch of {} scan(s) completed", self.scans),
            ScanOutcome::Cancelled => warn!(
                "Batch cancelled after {} of {} scan(s)",
                self.archive.len(),
                self.scans
            ),
        }
        Ok(written)
    }
}

/// Run a batch of scans
///
/// `scans` overrides the stored scans per batch and is persisted. Progress
/// goes to [`PROGRESS`](crate::channels::PROGRESS); `delay` paces the
/// readings.
pub async fn scan<T: DelayNs>(
    config: &AppConfig,
    kit: &Kit,
    settings: &mut TomlSettings,
    scans: Option<u8>,
    delay: T,
) -> Result<Batch, AppError> {
    let scans = match scans {
        Some(scans) => {
            validate_scan_count(scans)?;
            settings.update(|s| s.scans = scans)?;
            scans
        }
        None => settings.load()?.scans,
    };
    let channels = config.channels()?;

    let mut observer = ChannelObserver::new(scans);
    let outcome = match kit {
        Kit::Hardware(daq) => {
            let rig = ScanRig {
                signal: photodiode(daq, &channels),
                dark: photodiode(daq, &channels),
                led: DaqLed::new(daq, channels.led),
                delay,
                clock: EmbassyClock,
            };
            run_batch(config, false, rig, &mut observer, scans).await
        }
        Kit::Mocked => {
            let seed = mock_seed();
            let rig = ScanRig {
                signal: MockSampler::signal(seed),
                dark: MockSampler::dark_current(seed.rotate_left(32)),
                led: MockLed,
                delay,
                clock: EmbassyClock,
            };
            run_batch(config, true, rig, &mut observer, scans).await
        }
    };

    Ok(Batch {
        scans,
        archive: observer.into_archive().with_cell_px(config.export.cell_px),
        outcome,
    })
}

async fn run_batch<S, D, L, T>(
    config: &AppConfig,
    mocked: bool,
    mut rig: ScanRig<S, D, L, T, EmbassyClock>,
    observer: &mut ChannelObserver,
    scans: u8,
) -> Result<ScanOutcome, AppError>
where
    S: SampleSource,
    D: SampleSource,
    L: LedControl,
    T: DelayNs,
{
    let mut session = ScanSession::new(config.scan, mocked)?;
    let outcome = session
        .run_batch(&SCAN_LOCK, &mut rig, &EXITING, observer, scans)
        .await?;

    let stalls = session.monitor().stall_events();
    if stalls > 0 {
        warn!("Readings stalled {} time(s) during the batch", stalls);
    }
    Ok(outcome)
}

fn export(
    config: &AppConfig,
    archive: &ScanArchive,
    out: Option<&Path>,
    png: bool,
) -> Result<Vec<PathBuf>, AppError> {
    if archive.is_empty() {
        return Ok(Vec::new());
    }

    let dir = out.unwrap_or(&config.export.directory);
    let mut formats = vec![ExportFormat::Csv];
    if png || config.export.png {
        formats.push(ExportFormat::Png);
    }

    let written = archive.export_all(dir, &formats)?;
    info!("{} file(s) written to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    use beskar_core::config::{Settings, TimingConfig};
    use beskar_core::voltage::BiasError;

    fn temp_settings(name: &str) -> TomlSettings {
        let path = std::env::temp_dir().join(format!(
            "beskar-cmd-{}-{}.toml",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        TomlSettings::new(path)
    }

    fn channels() -> Channels {
        AppConfig::default().channels().unwrap()
    }

    #[test]
    fn test_seed_keeps_seconds_and_nanos() {
        assert_eq!(seed_from(Duration::new(u64::MAX, 5)), u64::MAX ^ 5);
        assert_eq!(seed_from(Duration::new(1_700_000_000, 0)), 1_700_000_000);
        assert_ne!(
            seed_from(Duration::new(10, 1)),
            seed_from(Duration::new(10, 2))
        );
    }

    #[test]
    fn test_parse_led_action() {
        assert_eq!("on".parse(), Ok(LedAction::On));
        assert_eq!("OFF".parse(), Ok(LedAction::Off));
        assert_eq!("flash".parse(), Ok(LedAction::Flash));
        assert!("blink".parse::<LedAction>().is_err());
    }

    #[test]
    fn test_mocked_dark_current() {
        let dark = dark_current(&AppConfig::default(), &Kit::Mocked).unwrap();
        assert_eq!(dark.samples().len(), 10);
        assert!(dark.baseline() >= 0.0 && dark.baseline() < 0.6);
        assert!(!dark.is_unusually_high());
    }

    #[test]
    fn test_apply_voltage_is_persisted() {
        let mut settings = temp_settings("apply");
        let applied = apply_voltage(&Kit::Mocked, &channels(), &mut settings, -1.5).unwrap();
        assert_eq!(applied, Millivolts(-1500));
        assert_eq!(settings.load().unwrap().applied_voltage, -1.5);
        std::fs::remove_file(settings.path()).unwrap();
    }

    #[test]
    fn test_apply_voltage_outside_window() {
        let mut settings = temp_settings("window");
        let err = apply_voltage(&Kit::Mocked, &channels(), &mut settings, 2.6).unwrap_err();
        assert!(matches!(err, AppError::Bias(BiasError::OutOfWindow { .. })));
        assert_eq!(settings.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_offset_widens_window() {
        let mut settings = temp_settings("offset");
        let window = calibrate_offset(&Kit::Mocked, &channels(), &mut settings, 0.5).unwrap();
        assert_eq!(window.max(), Millivolts(3000));
        assert_eq!(settings.load().unwrap().voltage_offset, 0.5);

        // 2.6 V is selectable once the offset is stored
        apply_voltage(&Kit::Mocked, &channels(), &mut settings, 2.6).unwrap();
        std::fs::remove_file(settings.path()).unwrap();
    }

    #[test]
    fn test_offset_out_of_range() {
        let mut settings = temp_settings("bad-offset");
        let err = calibrate_offset(&Kit::Mocked, &channels(), &mut settings, 1.2).unwrap_err();
        assert!(matches!(err, AppError::Bias(BiasError::OffsetOutOfRange(_))));
    }

    #[test]
    fn test_mocked_leds() {
        for action in [LedAction::On, LedAction::Off, LedAction::Flash] {
            leds(&Kit::Mocked, &channels(), action).unwrap();
        }
    }

    #[test]
    fn test_export_nothing_when_empty() {
        let archive = ScanArchive::new();
        let written = export(&AppConfig::default(), &archive, None, true).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_export_formats() {
        let mut archive = ScanArchive::new();
        archive.push(beskar_core::grid::ScanGrid::new());
        let dir = std::env::temp_dir().join(format!("beskar-cmd-export-{}", std::process::id()));

        let written = export(&AppConfig::default(), &archive, Some(&dir), true).unwrap();
        assert_eq!(written, vec![dir.join("scan-1.csv"), dir.join("scan-1.png")]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    /// Sleeps the calling thread
    struct SleepDelay;

    impl DelayNs for SleepDelay {
        async fn delay_ns(&mut self, ns: u32) {
            std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
        }
    }

    #[test]
    fn test_mocked_batch_is_exported() {
        let mut config = AppConfig::default();
        config.scan.timing = TimingConfig {
            settle_ms: 1,
            first_interval_ms: 1,
            second_interval_ms: 1,
            interval_ms: 1,
            inter_scan_ms: 1,
        };
        let mut settings = temp_settings("batch");
        let dir = std::env::temp_dir().join(format!("beskar-cmd-batch-{}", std::process::id()));

        let batch = embassy_futures::block_on(scan(
            &config,
            &Kit::Mocked,
            &mut settings,
            Some(2),
            SleepDelay,
        ))
        .unwrap();
        assert_eq!(batch.outcome.as_ref().ok(), Some(&ScanOutcome::Completed));
        assert_eq!(batch.archive.len(), 2);
        assert_eq!(settings.load().unwrap().scans, 2);

        // Readings are peak minus baseline of the mocked ranges
        for scan in batch.archive.iter() {
            assert!(scan
                .grid
                .rows()
                .iter()
                .flatten()
                .all(|&v| v > -0.6 && v < 1.0));
        }
        // The first scan never reaches the cell opening later traversals
        assert_eq!(batch.archive.get(1).unwrap().grid.get(6, 3), Some(0.0));

        let written = batch.export(&config, Some(&dir), false).unwrap();
        assert_eq!(written, vec![dir.join("scan-1.csv"), dir.join("scan-2.csv")]);

        let text = std::fs::read_to_string(&written[1]).unwrap();
        let lines: Vec<&str> = text.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("Column 1,Column 2"));

        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::remove_file(settings.path()).unwrap();
    }
}
