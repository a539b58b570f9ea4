//! Photodiode sampler
//!
//! Reads a burst of samples from one analog input per call.

use beskar_core::traits::SampleSource;
use beskar_hal::{AnalogInput, AnalogInputChannel, DaqError, VoltageRange};

/// Analog input the kit's photodiode amplifier is wired to
pub const PHOTODIODE_CHANNEL: AnalogInputChannel = AnalogInputChannel(1);

/// Sample source backed by a DAQ analog input
pub struct DaqSampler<A> {
    input: A,
    channel: AnalogInputChannel,
    range: VoltageRange,
}

impl<A: AnalogInput> DaqSampler<A> {
    /// Create a sampler
    ///
    /// # Arguments
    /// - `input`: The DAQ device
    /// - `channel`: Analog input to read
    /// - `range`: Expected voltage range
    pub fn new(input: A, channel: AnalogInputChannel, range: VoltageRange) -> Self {
        Self {
            input,
            channel,
            range,
        }
    }

    /// Sampler on the photodiode channel with the ±10 V range
    pub fn photodiode(input: A) -> Self {
        Self::new(input, PHOTODIODE_CHANNEL, VoltageRange::BIPOLAR_10V)
    }

    /// Channel read by this sampler
    pub fn channel(&self) -> AnalogInputChannel {
        self.channel
    }
}

impl<A: AnalogInput> SampleSource for DaqSampler<A> {
    fn read(&mut self, samples: &mut [f64]) -> Result<(), DaqError> {
        self.input.read_samples(self.channel, self.range, samples)
    }
}
