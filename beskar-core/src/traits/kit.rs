//! SEAL kit device traits

use beskar_hal::DaqError;

/// Source of raw photodiode samples
///
/// A scan uses two sources: one for dark-current reads and one for signal
/// reads. On real hardware both read the same analog input.
pub trait SampleSource {
    /// Fill `samples` with fresh readings (volts)
    fn read(&mut self, samples: &mut [f64]) -> Result<(), DaqError>;
}

/// LED driver board control line
pub trait LedControl {
    /// Switch the LED driver on
    fn on(&mut self) -> Result<(), DaqError>;

    /// Switch the LED driver off
    fn off(&mut self) -> Result<(), DaqError>;

    /// Pulse the driver (on then off), restarting its flash sequence
    fn flash(&mut self) -> Result<(), DaqError> {
        self.on()?;
        self.off()
    }
}

/// Bias supply of the kit
pub trait BiasOutput {
    /// Drive the raw output to `volts`
    ///
    /// The value is the physical output level, after any polarity inversion
    /// and offset have been applied.
    fn set_output(&mut self, volts: f64) -> Result<(), DaqError>;
}

impl<T: SampleSource + ?Sized> SampleSource for &mut T {
    fn read(&mut self, samples: &mut [f64]) -> Result<(), DaqError> {
        (**self).read(samples)
    }
}

impl<T: LedControl + ?Sized> LedControl for &mut T {
    fn on(&mut self) -> Result<(), DaqError> {
        (**self).on()
    }

    fn off(&mut self) -> Result<(), DaqError> {
        (**self).off()
    }

    fn flash(&mut self) -> Result<(), DaqError> {
        (**self).flash()
    }
}
