//! Events that trigger scan state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A scan was requested
    Start,
    /// Baseline taken, LED pulsed and settle delay elapsed
    Primed,
    /// One reading was written and its wait elapsed
    StepComplete,
    /// All readings of the scan were written
    ScanFinished {
        /// The scan was the last of its batch
        last_in_batch: bool,
    },
    /// The exit signal was observed at the top of an iteration
    Exit,
    /// A device operation failed
    DeviceFault,
    /// The front end acknowledged a device fault
    AcknowledgeFault,
}
