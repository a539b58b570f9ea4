//! Mocked collaborators
//!
//! Used when no SEAL kit is attached. Samples are uniform pseudo-random
//! values; writes are accepted and discarded.

use beskar_core::traits::{BiasOutput, LedControl, SampleSource};
use beskar_hal::DaqError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Upper bound of mocked dark-current samples (V)
pub const MOCK_DARK_CURRENT_MAX: f64 = 0.6;

/// Upper bound of mocked signal samples (V)
pub const MOCK_SIGNAL_MAX: f64 = 1.0;

/// Pseudo-random sample source, uniform in `[0, amplitude)`
pub struct MockSampler {
    rng: SmallRng,
    amplitude: f64,
}

impl MockSampler {
    /// Create a sampler with an explicit amplitude
    pub fn new(seed: u64, amplitude: f64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            amplitude,
        }
    }

    /// Mocked photodiode signal
    pub fn signal(seed: u64) -> Self {
        Self::new(seed, MOCK_SIGNAL_MAX)
    }

    /// Mocked dark current
    pub fn dark_current(seed: u64) -> Self {
        Self::new(seed, MOCK_DARK_CURRENT_MAX)
    }
}

impl SampleSource for MockSampler {
    fn read(&mut self, samples: &mut [f64]) -> Result<(), DaqError> {
        for s in samples.iter_mut() {
            *s = self.rng.random::<f64>() * self.amplitude;
        }
        Ok(())
    }
}

/// LED control that ignores every write
#[derive(Debug, Clone, Copy, Default)]
pub struct MockLed;

impl LedControl for MockLed {
    fn on(&mut self) -> Result<(), DaqError> {
        Ok(())
    }

    fn off(&mut self) -> Result<(), DaqError> {
        Ok(())
    }
}

/// Bias output that ignores every write
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBias;

impl BiasOutput for MockBias {
    fn set_output(&mut self, _volts: f64) -> Result<(), DaqError> {
        Ok(())
    }
}
