//! Bias supply output
//!
//! Drives the kit's bias stage from a unipolar analog output. Callers pass
//! the physical output level; [`beskar_core::voltage::BiasWindow`] converts
//! requested bias voltages to it.

use beskar_core::traits::BiasOutput;
use beskar_core::voltage::{BiasError, BiasWindow, Millivolts};
use beskar_hal::{AnalogOutput, AnalogOutputChannel, DaqError, VoltageRange};

/// Analog output wired to the bias stage
pub const BIAS_CHANNEL: AnalogOutputChannel = AnalogOutputChannel(0);

/// Bias supply errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BiasSupplyError {
    /// Requested value outside the selectable window
    Window(BiasError),
    /// Device write failed
    Daq(DaqError),
}

impl From<BiasError> for BiasSupplyError {
    fn from(e: BiasError) -> Self {
        BiasSupplyError::Window(e)
    }
}

impl From<DaqError> for BiasSupplyError {
    fn from(e: DaqError) -> Self {
        BiasSupplyError::Daq(e)
    }
}

/// Bias supply over a DAQ analog output
pub struct DaqBias<O> {
    output: O,
    channel: AnalogOutputChannel,
}

impl<O: AnalogOutput> DaqBias<O> {
    /// Create a bias supply on `channel`
    pub fn new(output: O, channel: AnalogOutputChannel) -> Self {
        Self { output, channel }
    }

    /// Bias supply on the kit's default channel
    pub fn kit(output: O) -> Self {
        Self::new(output, BIAS_CHANNEL)
    }
}

impl<O: AnalogOutput> BiasOutput for DaqBias<O> {
    fn set_output(&mut self, volts: f64) -> Result<(), DaqError> {
        self.output
            .write_voltage(self.channel, VoltageRange::UNIPOLAR_5V, volts)
    }
}

/// Apply a requested bias voltage through `output`
///
/// Returns the physical output level written.
pub fn apply_bias<B: BiasOutput + ?Sized>(
    output: &mut B,
    window: &BiasWindow,
    requested: Millivolts,
) -> Result<Millivolts, BiasSupplyError> {
    let level = window.output_for(requested)?;
    output.set_output(level.as_volts())?;
    Ok(level)
}

/// Apply the calibration offset alone through `output`
pub fn apply_offset<B: BiasOutput + ?Sized>(
    output: &mut B,
    window: &BiasWindow,
) -> Result<Millivolts, DaqError> {
    let level = window.calibration_output();
    output.set_output(level.as_volts())?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDac {
        last: Option<(AnalogOutputChannel, VoltageRange, f64)>,
    }

    impl AnalogOutput for MockDac {
        fn write_voltage(
            &mut self,
            channel: AnalogOutputChannel,
            range: VoltageRange,
            volts: f64,
        ) -> Result<(), DaqError> {
            if !range.contains(volts) {
                return Err(DaqError::OutOfRange);
            }
            self.last = Some((channel, range, volts));
            Ok(())
        }
    }

    #[test]
    fn test_apply_bias_inverts() {
        let mut dac = MockDac { last: None };
        let mut bias = DaqBias::kit(&mut dac);
        let window = BiasWindow::new(Millivolts(0)).unwrap();

        let level = apply_bias(&mut bias, &window, Millivolts(1000)).unwrap();
        assert_eq!(level, Millivolts(1500));
        assert_eq!(
            dac.last,
            Some((BIAS_CHANNEL, VoltageRange::UNIPOLAR_5V, 1.5))
        );
    }

    #[test]
    fn test_apply_bias_rejects_outside_window() {
        let mut dac = MockDac { last: None };
        let mut bias = DaqBias::kit(&mut dac);
        let window = BiasWindow::new(Millivolts(0)).unwrap();

        let result = apply_bias(&mut bias, &window, Millivolts(3000));
        assert!(matches!(result, Err(BiasSupplyError::Window(_))));
        assert_eq!(dac.last, None);
    }

    #[test]
    fn test_apply_offset() {
        let mut dac = MockDac { last: None };
        let mut bias = DaqBias::kit(&mut dac);
        let window = BiasWindow::new(Millivolts(400)).unwrap();

        assert_eq!(apply_offset(&mut bias, &window), Ok(Millivolts(2900)));
        assert_eq!(dac.last.map(|(_, _, v)| v), Some(2.9));
    }
}
