//! Dark-current baseline measurement

use beskar_hal::DaqError;
use heapless::Vec;

use super::{mean, peak, MAX_SAMPLES};
use crate::traits::SampleSource;

/// Any dark-current sample above this level (V) is unusually high
pub const HIGH_DARK_CURRENT_V: f64 = 1.0;

/// Samples read with the LEDs dark
#[derive(Debug, Clone, PartialEq)]
pub struct DarkCurrent {
    samples: Vec<f64, MAX_SAMPLES>,
}

impl DarkCurrent {
    /// Read `count` samples from `source`
    ///
    /// `count` is clamped to [`MAX_SAMPLES`].
    pub fn measure<S: SampleSource>(source: &mut S, count: usize) -> Result<Self, DaqError> {
        let mut buf = [0.0; MAX_SAMPLES];
        let buf = &mut buf[..count.min(MAX_SAMPLES)];
        source.read(buf)?;
        Ok(Self::from_samples(buf))
    }

    /// Wrap already-read samples, keeping at most [`MAX_SAMPLES`]
    pub fn from_samples(samples: &[f64]) -> Self {
        let kept = &samples[..samples.len().min(MAX_SAMPLES)];
        let mut stored = Vec::new();
        // Cannot fail: `kept` fits the capacity
        let _ = stored.extend_from_slice(kept);
        Self { samples: stored }
    }

    /// Mean of the samples, subtracted from every reading of the scan
    pub fn baseline(&self) -> f64 {
        mean(&self.samples)
    }

    /// Largest sample
    pub fn peak(&self) -> f64 {
        peak(&self.samples)
    }

    /// Check if any sample exceeds [`HIGH_DARK_CURRENT_V`]
    pub fn is_unusually_high(&self) -> bool {
        self.peak() > HIGH_DARK_CURRENT_V
    }

    /// Raw samples
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
