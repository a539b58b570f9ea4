//! Photodiode acquisition helpers
//!
//! A reading is the peak of a short burst of raw samples minus the
//! dark-current baseline measured at the start of the scan.

mod dark_current;

pub use dark_current::{DarkCurrent, HIGH_DARK_CURRENT_V};

/// Largest sample burst the sequencer will request
pub const MAX_SAMPLES: usize = 64;

/// Largest value of a burst, or negative infinity when empty
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Arithmetic mean of a burst, or 0.0 when empty
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[0.1, 0.9, 0.4]), 0.9);
        assert_eq!(peak(&[-2.0, -1.5]), -1.5);
        assert_eq!(peak(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[0.2, 0.4]), 0.30000000000000004);
        assert!((mean(&[0.3; 10]) - 0.3).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }
}
