//! Beskar - SEAL kit scanner
//!
//! Command-line front end for the SEAL photovoltaic test kit: lists DAQ
//! devices, sets the bias supply, drives the LED array and runs batches of
//! 8×8 photocurrent scans that are exported as CSV (and optionally PNG).
//!
//! Runs on the Embassy std executor. The scan itself runs on the main task;
//! progress is logged by a separate task.

use std::path::PathBuf;

use anyhow::Context;
use embassy_executor::Spawner;
use embassy_time::Delay;
use log::*;
use structopt::StructOpt;

mod channels;
mod commands;
mod config;
mod daq;
mod error;
mod tasks;

use crate::commands::{Kit, LedAction};
use crate::config::TomlSettings;

#[derive(Debug, StructOpt)]
#[structopt(name = "beskar", about = "SEAL kit scanner")]
struct Opt {
    /// Configuration file
    #[structopt(short, long, default_value = "beskar.toml", parse(from_os_str))]
    config: PathBuf,
    /// Run without a kit, generating pseudo-random samples
    #[structopt(short, long)]
    mocked: bool,
    /// NI device name (overrides the configuration)
    #[structopt(short, long)]
    device: Option<String>,
    /// More output (-v debug, -vv trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// List attached DAQ devices
    Devices,
    /// Measure the dark current
    DarkCurrent,
    /// Apply a bias voltage to the kit
    ApplyVoltage {
        /// Requested bias in volts
        #[structopt(allow_hyphen_values = true)]
        volts: f64,
    },
    /// Apply and store the calibration offset
    CalibrateOffset {
        /// Offset in volts (0 to 1)
        volts: f64,
    },
    /// Switch the LED driver line (on, off, flash)
    Leds { action: LedAction },
    /// Run a batch of scans
    Scan {
        /// Scans in the batch (1 to 10); stored for later runs
        #[structopt(short, long)]
        scans: Option<u8>,
        /// Export directory
        #[structopt(short, long, parse(from_os_str))]
        out: Option<PathBuf>,
        /// Also export PNG heat maps
        #[structopt(long)]
        png: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn run(opt: Opt, spawner: Spawner) -> anyhow::Result<()> {
    let mut config = config::load(&opt.config)
        .with_context(|| format!("failed to load {}", opt.config.display()))?;
    if opt.device.is_some() {
        config.device = opt.device;
    }
    let mut settings = TomlSettings::new(&config.settings_file);

    if let Command::Devices = opt.command {
        commands::list_devices()?;
        return Ok(());
    }

    let kit = Kit::open(&config, opt.mocked)?;
    let channels = config.channels()?;

    match opt.command {
        Command::Devices => {}
        Command::DarkCurrent => {
            commands::dark_current(&config, &kit)?;
        }
        Command::ApplyVoltage { volts } => {
            commands::apply_voltage(&kit, &channels, &mut settings, volts)?;
        }
        Command::CalibrateOffset { volts } => {
            commands::calibrate_offset(&kit, &channels, &mut settings, volts)?;
        }
        Command::Leds { action } => {
            commands::leds(&kit, &channels, action)?;
        }
        Command::Scan { scans, out, png } => {
            spawner
                .spawn(tasks::progress_task())
                .map_err(|_| error::AppError::Spawn("progress"))?;
            tasks::watch_stdin();
            info!("Press Enter to stop the batch");

            let batch = commands::scan(&config, &kit, &mut settings, scans, Delay).await?;
            // Let the progress task catch up before the summary
            tasks::flush().await;
            batch.export(&config, out.as_deref(), png)?;
        }
    }
    Ok(())
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let opt = Opt::from_args();
    init_logging(opt.verbose);
    info!("Beskar {} starting...", env!("CARGO_PKG_VERSION"));

    let code = match run(opt, spawner).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    // The executor never returns on its own
    std::process::exit(code);
}
