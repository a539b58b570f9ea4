//! Monotonic time source
//!
//! The sequencer measures how long each acquisition step took so it can
//! shorten the following wait. Only differences between readings matter.

/// Monotonic microsecond clock
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_micros(&self) -> u64;

    /// Microseconds elapsed since `start` (saturating)
    fn elapsed_micros(&self, start: u64) -> u64 {
        self.now_micros().saturating_sub(start)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}
