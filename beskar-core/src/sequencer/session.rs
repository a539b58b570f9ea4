//! Scan session and batch execution

use beskar_hal::{Clock, DaqError};
use embedded_hal_async::delay::DelayNs;

use super::lock::ScanLock;
use super::timing::{wait_budget_us, StepPosition};
use crate::acquisition::{peak, DarkCurrent, MAX_SAMPLES};
use crate::config::{validate_scan_count, ConfigError, ScanConfig};
use crate::grid::{GridError, ScanGrid};
use crate::safety::ReadingMonitor;
use crate::state::{Event, ScanState};
use crate::traits::{ExitSignal, LedControl, SampleSource, ScanObserver};
use crate::traversal::LedCursor;

/// Scan errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError {
    /// Another scan holds the scan lock
    Busy,
    /// The session is faulted and must be acknowledged first
    Faulted,
    /// A device operation failed
    Daq(DaqError),
    /// A reading addressed a cell outside the grid
    Grid(GridError),
    /// Invalid configuration or request
    Config(ConfigError),
}

impl From<DaqError> for ScanError {
    fn from(e: DaqError) -> Self {
        ScanError::Daq(e)
    }
}

impl From<GridError> for ScanError {
    fn from(e: GridError) -> Self {
        ScanError::Grid(e)
    }
}

impl From<ConfigError> for ScanError {
    fn from(e: ConfigError) -> Self {
        ScanError::Config(e)
    }
}

impl core::fmt::Display for ScanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScanError::Busy => f.write_str("a scan is already running"),
            ScanError::Faulted => f.write_str("scan session is faulted"),
            ScanError::Daq(e) => write!(f, "{}", e),
            ScanError::Grid(e) => write!(f, "{}", e),
            ScanError::Config(e) => write!(f, "{}", e),
        }
    }
}

/// How a batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome {
    /// Every scan of the batch finished
    Completed,
    /// The exit signal was raised; the scan in progress was abandoned
    Cancelled,
}

/// Everything a scan drives
pub struct ScanRig<S, D, L, T, C> {
    /// Photodiode reads during the scan
    pub signal: S,
    /// Photodiode reads for the dark-current baseline
    pub dark: D,
    /// LED driver control line
    pub led: L,
    /// Suspension between readings
    pub delay: T,
    /// Time source for wait compensation
    pub clock: C,
}

/// Running state of one scan page
///
/// A session lives as long as its page. The LED cursor carries over from
/// one batch to the next, so only the first scan of a session starts on the
/// origin sentinel.
#[derive(Debug, Clone)]
pub struct ScanSession {
    config: ScanConfig,
    mocked: bool,
    cursor: LedCursor,
    state: ScanState,
    monitor: ReadingMonitor,
    baseline: Option<f64>,
    scans_completed: u32,
}

impl ScanSession {
    /// Create a session
    ///
    /// # Arguments
    /// * `config` - Acquisition settings, validated here
    /// * `mocked` - Skip LED pulses (samples come from a mocked source)
    pub fn new(config: ScanConfig, mocked: bool) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            config,
            mocked,
            cursor: LedCursor::new(),
            state: ScanState::Idle,
            monitor: ReadingMonitor::new(),
            baseline: None,
            scans_completed: 0,
        })
    }

    /// Replace the LED cursor
    pub fn with_cursor(mut self, cursor: LedCursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Current scan state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// LED cursor
    pub fn cursor(&self) -> &LedCursor {
        &self.cursor
    }

    /// Dark-current baseline of the latest scan
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Reading health monitor
    pub fn monitor(&self) -> &ReadingMonitor {
        &self.monitor
    }

    /// Check if the session skips LED pulses
    pub fn is_mocked(&self) -> bool {
        self.mocked
    }

    /// Scans finished since the session was created
    pub fn scans_completed(&self) -> u32 {
        self.scans_completed
    }

    /// Acquisition settings
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Clear a device fault so scans can start again
    pub fn acknowledge_fault(&mut self) {
        self.apply(Event::AcknowledgeFault);
    }

    /// Run `scans` scans back to back
    ///
    /// Each finished grid is handed to `observer`. The exit signal is polled
    /// before every reading; when raised, the scan in progress is dropped
    /// and [`ScanOutcome::Cancelled`] returned. A device error aborts the
    /// batch and leaves the session faulted.
    pub async fn run_batch<S, D, L, T, C, E, O>(
        &mut self,
        lock: &ScanLock,
        rig: &mut ScanRig<S, D, L, T, C>,
        exit: &E,
        observer: &mut O,
        scans: u8,
    ) -> Result<ScanOutcome, ScanError>
    where
        S: SampleSource,
        D: SampleSource,
        L: LedControl,
        T: DelayNs,
        C: Clock,
        E: ExitSignal + ?Sized,
        O: ScanObserver + ?Sized,
    {
        validate_scan_count(scans)?;
        let _guard = lock.try_acquire().ok_or(ScanError::Busy)?;
        if !self.state.can_start() {
            return Err(ScanError::Faulted);
        }

        for index in 0..scans {
            let last_scan = index + 1 == scans;
            let mut grid = ScanGrid::new();

            let result = self
                .run_scan(index, last_scan, &mut grid, rig, exit, observer)
                .await;
            match result {
                Ok(ScanOutcome::Completed) => observer.scan_finished(index, &grid),
                Ok(ScanOutcome::Cancelled) => return Ok(ScanOutcome::Cancelled),
                Err(e) => {
                    self.apply(Event::DeviceFault);
                    return Err(e);
                }
            }
        }

        Ok(ScanOutcome::Completed)
    }

    async fn run_scan<S, D, L, T, C, E, O>(
        &mut self,
        index: u8,
        last_scan: bool,
        grid: &mut ScanGrid,
        rig: &mut ScanRig<S, D, L, T, C>,
        exit: &E,
        observer: &mut O,
    ) -> Result<ScanOutcome, ScanError>
    where
        S: SampleSource,
        D: SampleSource,
        L: LedControl,
        T: DelayNs,
        C: Clock,
        E: ExitSignal + ?Sized,
        O: ScanObserver + ?Sized,
    {
        self.apply(Event::Start);
        self.monitor.reset_scan();

        let dark = DarkCurrent::measure(&mut rig.dark, usize::from(self.config.dark_current_samples))?;
        let baseline = dark.baseline();
        self.baseline = Some(baseline);
        self.monitor.update_dark_current(&dark);
        observer.dark_current(&dark);

        let length = self.cursor.scan_length();
        observer.scan_started(index, length);

        if !self.mocked {
            rig.led.flash()?;
        }
        rig.delay.delay_ms(self.config.timing.settle_ms).await;
        self.apply(Event::Primed);

        let mut buf = [0.0; MAX_SAMPLES];
        let raw = &mut buf[..usize::from(self.config.samples_per_reading)];

        for step in 0..length {
            if exit.exiting() {
                self.apply(Event::Exit);
                return Ok(ScanOutcome::Cancelled);
            }

            let started = rig.clock.now_micros();
            rig.signal.read(raw)?;
            grid.write_at(self.cursor.current(), peak(raw) - baseline)?;

            let next = self.cursor.advance();
            observer.progress(step + 1, next);
            self.monitor.update_grid(grid);
            observer.reading_notice(self.monitor.is_stalled());

            let position = StepPosition {
                step,
                length,
                last_scan,
            };
            let wait = wait_budget_us(
                &self.config.timing,
                position,
                rig.clock.elapsed_micros(started),
            );
            rig.delay
                .delay_us(u32::try_from(wait).unwrap_or(u32::MAX))
                .await;

            if step + 1 < length {
                self.apply(Event::StepComplete);
            }
        }

        self.apply(Event::ScanFinished {
            last_in_batch: last_scan,
        });
        self.scans_completed += 1;
        Ok(ScanOutcome::Completed)
    }

    fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embassy_futures::block_on;

    use crate::traits::NeverExit;
    use crate::traversal::LedPosition;

    /// Shared fake time, in microseconds
    struct FakeClock<'a>(&'a Cell<u64>);

    impl Clock for FakeClock<'_> {
        fn now_micros(&self) -> u64 {
            self.0.get()
        }
    }

    /// Records every wait and advances fake time by it
    struct FakeDelay<'a> {
        now: &'a Cell<u64>,
        waits_us: Vec<u64>,
    }

    impl FakeDelay<'_> {
        fn record(&mut self, us: u64) {
            self.waits_us.push(us);
            self.now.set(self.now.get() + us);
        }
    }

    impl DelayNs for FakeDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.record(u64::from(ns) / 1000);
        }

        async fn delay_us(&mut self, us: u32) {
            self.record(u64::from(us));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.record(u64::from(ms) * 1000);
        }
    }

    /// Returns a constant and spends `cost_us` of fake time per read
    struct Burst<'a> {
        value: f64,
        now: &'a Cell<u64>,
        cost_us: u64,
        reads: usize,
        fail_on: Option<usize>,
        /// Switch to another value once this many reads were served
        later: Option<(usize, f64)>,
    }

    impl<'a> Burst<'a> {
        fn new(value: f64, now: &'a Cell<u64>, cost_us: u64) -> Self {
            Self {
                value,
                now,
                cost_us,
                reads: 0,
                fail_on: None,
                later: None,
            }
        }
    }

    impl SampleSource for Burst<'_> {
        fn read(&mut self, samples: &mut [f64]) -> Result<(), DaqError> {
            self.reads += 1;
            if self.fail_on == Some(self.reads) {
                return Err(DaqError::Driver(-200279));
            }
            self.now.set(self.now.get() + self.cost_us);
            let value = match self.later {
                Some((after, value)) if self.reads > after => value,
                _ => self.value,
            };
            samples.fill(value);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingLed {
        ons: usize,
        offs: usize,
    }

    impl LedControl for CountingLed {
        fn on(&mut self) -> Result<(), DaqError> {
            self.ons += 1;
            Ok(())
        }

        fn off(&mut self) -> Result<(), DaqError> {
            self.offs += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<(u8, usize)>,
        progress: Vec<(usize, LedPosition)>,
        notices: Vec<bool>,
        baselines: Vec<f64>,
        grids: Vec<ScanGrid>,
    }

    impl ScanObserver for Recorder {
        fn scan_started(&mut self, index: u8, length: usize) {
            self.started.push((index, length));
        }

        fn dark_current(&mut self, dark: &DarkCurrent) {
            self.baselines.push(dark.baseline());
        }

        fn progress(&mut self, completed: usize, next: LedPosition) {
            self.progress.push((completed, next));
        }

        fn reading_notice(&mut self, stalled: bool) {
            self.notices.push(stalled);
        }

        fn scan_finished(&mut self, index: u8, grid: &ScanGrid) {
            assert_eq!(index as usize, self.grids.len());
            self.grids.push(grid.clone());
        }
    }

    /// Raised after `checks` polls
    struct ExitAfter(Cell<usize>);

    impl ExitSignal for ExitAfter {
        fn exiting(&self) -> bool {
            let left = self.0.get();
            if left == 0 {
                return true;
            }
            self.0.set(left - 1);
            false
        }
    }

    type TestRig<'a> = ScanRig<Burst<'a>, Burst<'a>, CountingLed, FakeDelay<'a>, FakeClock<'a>>;

    fn rig(now: &Cell<u64>, signal: f64, baseline: f64) -> TestRig<'_> {
        ScanRig {
            signal: Burst::new(signal, now, 10_000),
            dark: Burst::new(baseline, now, 0),
            led: CountingLed::default(),
            delay: FakeDelay {
                now,
                waits_us: Vec::new(),
            },
            clock: FakeClock(now),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_scan_of_session() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();

        let outcome = block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1));
        assert_eq!(outcome, Ok(ScanOutcome::Completed));
        assert_eq!(session.state(), ScanState::Complete);
        assert_eq!(session.scans_completed(), 1);
        assert!(!lock.is_held());

        assert_eq!(recorder.started, vec![(0, 64)]);
        assert_eq!(recorder.progress.len(), 64);
        assert_eq!(recorder.progress[63].0, 64);
        assert_eq!((rig.led.ons, rig.led.offs), (1, 1));

        let grid = &recorder.grids[0];
        assert_eq!(grid.writes(), 64);
        // The cycle-opening cell is never reached by the first traversal
        assert_eq!(grid.get(6, 3), Some(0.0));
        for (r, row) in grid.rows().iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if (r, c) != (6, 3) {
                    assert!(approx(v, 0.5), "cell ({}, {}) = {}", r, c, v);
                }
            }
        }
    }

    #[test]
    fn test_wait_schedule() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let lock = ScanLock::new();

        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut (), 2)).unwrap();

        let waits = &rig.delay.waits_us;
        // Settle + 64 readings, settle + 65 readings
        assert_eq!(waits.len(), 1 + 64 + 1 + 65);
        assert_eq!(waits[0], 412_000);
        assert_eq!(waits[1], 482_000);
        assert_eq!(waits[2], 809_000);
        assert_eq!(waits[3], 849_000);
        // Last reading of a scan followed by another scan
        assert_eq!(waits[64], 1_000_000);
        assert_eq!(waits[65], 412_000);
        // Last reading of the batch keeps the cadence
        assert_eq!(waits[130], 849_000);
    }

    #[test]
    fn test_second_scan_covers_every_cell() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();

        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 2)).unwrap();

        assert_eq!(recorder.started, vec![(0, 64), (1, 65)]);
        assert_eq!(recorder.baselines.len(), 2);
        assert_eq!((rig.led.ons, rig.led.offs), (2, 2));

        let grid = &recorder.grids[1];
        assert_eq!(grid.writes(), 65);
        assert!(grid.rows().iter().flatten().all(|&v| approx(v, 0.5)));
    }

    #[test]
    fn test_cursor_carries_over_batches() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();

        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1)).unwrap();
        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1)).unwrap();
        assert_eq!(recorder.started, vec![(0, 64), (0, 65)]);
    }

    #[test]
    fn test_mocked_skips_led_pulse() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), true).unwrap();
        let lock = ScanLock::new();

        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut (), 1)).unwrap();
        assert_eq!((rig.led.ons, rig.led.offs), (0, 0));
        assert!(session.is_mocked());
    }

    #[test]
    fn test_exit_cancels_at_iteration_boundary() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();
        let exit = ExitAfter(Cell::new(5));

        let outcome = block_on(session.run_batch(&lock, &mut rig, &exit, &mut recorder, 3));
        assert_eq!(outcome, Ok(ScanOutcome::Cancelled));
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(recorder.progress.len(), 5);
        assert!(recorder.grids.is_empty());
        assert_eq!(session.scans_completed(), 0);
        assert_eq!(rig.signal.reads, 5);
        assert!(!lock.is_held());
    }

    #[test]
    fn test_busy_when_lock_held() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let lock = ScanLock::new();
        let _other = lock.try_acquire();

        let outcome = block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut (), 1));
        assert_eq!(outcome, Err(ScanError::Busy));
        assert_eq!(rig.dark.reads, 0);
        assert_eq!(session.state(), ScanState::Idle);
    }

    #[test]
    fn test_device_error_faults_session() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        rig.signal.fail_on = Some(3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();

        let outcome = block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1));
        assert_eq!(outcome, Err(ScanError::Daq(DaqError::Driver(-200279))));
        assert_eq!(session.state(), ScanState::Faulted);
        assert_eq!(recorder.progress.len(), 2);
        assert!(!lock.is_held());

        let again = block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1));
        assert_eq!(again, Err(ScanError::Faulted));

        session.acknowledge_fault();
        assert_eq!(session.state(), ScanState::Idle);
    }

    #[test]
    fn test_stalled_reading_notice() {
        let now = Cell::new(0);
        // Signal equal to the baseline: every reading is exactly zero
        let mut rig = rig(&now, 0.25, 0.25);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();

        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1)).unwrap();
        assert_eq!(&recorder.notices[..5], &[false, false, false, true, true]);
        assert!(session.monitor().is_stalled());
    }

    #[test]
    fn test_zero_reading_on_written_cell_is_not_a_stall() {
        let now = Cell::new(0);
        // First reading 0.5 above the baseline, then nothing
        let mut rig = rig(&now, 0.8, 0.3);
        rig.signal.later = Some((1, 0.3));
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let mut recorder = Recorder::default();
        let lock = ScanLock::new();

        block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut recorder, 1)).unwrap();
        // The second reading lands on the origin again and only halves it
        let grid = &recorder.grids[0];
        assert!(approx(grid.get(1, 3).unwrap(), 0.25));
        assert_eq!(
            &recorder.notices[..6],
            &[false, false, false, false, false, true]
        );
        assert_eq!(session.monitor().stall_events(), 1);
    }

    #[test]
    fn test_rejects_bad_scan_count() {
        let now = Cell::new(0);
        let mut rig = rig(&now, 0.8, 0.3);
        let mut session = ScanSession::new(ScanConfig::default(), false).unwrap();
        let lock = ScanLock::new();

        for scans in [0, 11] {
            let outcome = block_on(session.run_batch(&lock, &mut rig, &NeverExit, &mut (), scans));
            assert_eq!(outcome, Err(ScanError::Config(ConfigError::InvalidScanCount)));
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ScanConfig::default();
        config.samples_per_reading = 0;
        assert_eq!(
            ScanSession::new(config, false).unwrap_err(),
            ScanError::Config(ConfigError::NoSamples)
        );
    }
}
