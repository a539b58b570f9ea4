//! Data-acquisition abstractions
//!
//! Provides traits for the three capabilities the SEAL kit exposes: finite
//! analog reads, static analog writes and digital line writes.
//!
//! Implementations open, use and close the underlying channel within a single
//! call. No channel is held open between calls.

use core::fmt;

use crate::channel::{AnalogInputChannel, AnalogOutputChannel, DigitalLine, VoltageRange};

/// Errors from DAQ operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaqError {
    /// The vendor driver library could not be loaded
    DriverMissing,
    /// No device with the requested name is attached
    DeviceNotFound,
    /// The driver reported an error status code
    Driver(i32),
    /// Fewer samples were returned than requested
    ShortRead,
    /// Channel name rejected by the driver
    InvalidChannel,
    /// Requested value lies outside the channel range
    OutOfRange,
}

impl fmt::Display for DaqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaqError::DriverMissing => f.write_str("DAQ driver library is not installed"),
            DaqError::DeviceNotFound => f.write_str("DAQ device not found"),
            DaqError::Driver(code) => write!(f, "DAQ driver error {}", code),
            DaqError::ShortRead => f.write_str("DAQ returned fewer samples than requested"),
            DaqError::InvalidChannel => f.write_str("invalid DAQ channel"),
            DaqError::OutOfRange => f.write_str("value outside channel range"),
        }
    }
}

/// Finite analog voltage acquisition
pub trait AnalogInput {
    /// Read `samples.len()` samples from `channel`
    ///
    /// # Arguments
    /// * `channel` - The analog input to read
    /// * `range` - Expected voltage range (sets the device gain)
    /// * `samples` - Buffer filled with one reading per slot
    fn read_samples(
        &mut self,
        channel: AnalogInputChannel,
        range: VoltageRange,
        samples: &mut [f64],
    ) -> Result<(), DaqError>;
}

/// Static analog voltage output
pub trait AnalogOutput {
    /// Drive `channel` to `volts`
    ///
    /// Implementations reject values outside `range` with
    /// [`DaqError::OutOfRange`].
    fn write_voltage(
        &mut self,
        channel: AnalogOutputChannel,
        range: VoltageRange,
        volts: f64,
    ) -> Result<(), DaqError>;
}

/// Digital line output
pub trait DigitalOutput {
    /// Write a single logic level to `line`
    fn write_line(&mut self, line: DigitalLine, high: bool) -> Result<(), DaqError>;

    /// Write a sequence of levels to `line` within one channel session
    ///
    /// The default issues one write per level.
    fn write_line_sequence(&mut self, line: DigitalLine, levels: &[bool]) -> Result<(), DaqError> {
        for &level in levels {
            self.write_line(line, level)?;
        }
        Ok(())
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    fn read_samples(
        &mut self,
        channel: AnalogInputChannel,
        range: VoltageRange,
        samples: &mut [f64],
    ) -> Result<(), DaqError> {
        (**self).read_samples(channel, range, samples)
    }
}

impl<T: AnalogOutput + ?Sized> AnalogOutput for &mut T {
    fn write_voltage(
        &mut self,
        channel: AnalogOutputChannel,
        range: VoltageRange,
        volts: f64,
    ) -> Result<(), DaqError> {
        (**self).write_voltage(channel, range, volts)
    }
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for &mut T {
    fn write_line(&mut self, line: DigitalLine, high: bool) -> Result<(), DaqError> {
        (**self).write_line(line, high)
    }

    fn write_line_sequence(&mut self, line: DigitalLine, levels: &[bool]) -> Result<(), DaqError> {
        (**self).write_line_sequence(line, levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every level written
    struct RecordingLine {
        levels: [bool; 4],
        count: usize,
    }

    impl DigitalOutput for RecordingLine {
        fn write_line(&mut self, _line: DigitalLine, high: bool) -> Result<(), DaqError> {
            if self.count == self.levels.len() {
                return Err(DaqError::Driver(-1));
            }
            self.levels[self.count] = high;
            self.count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_default_sequence_writes_in_order() {
        let mut out = RecordingLine {
            levels: [false; 4],
            count: 0,
        };
        out.write_line_sequence(DigitalLine::new(0, 0), &[false, true])
            .unwrap();
        assert_eq!(out.count, 2);
        assert_eq!(&out.levels[..2], &[false, true]);
    }

    #[test]
    fn test_sequence_stops_on_error() {
        let mut out = RecordingLine {
            levels: [false; 4],
            count: 3,
        };
        let result = out.write_line_sequence(DigitalLine::new(0, 0), &[true, true]);
        assert_eq!(result, Err(DaqError::Driver(-1)));
        assert_eq!(out.count, 4);
    }
}
