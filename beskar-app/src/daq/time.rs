//! Monotonic clock backed by the Embassy time driver

use beskar_hal::Clock;
use embassy_time::Instant;

/// Microsecond clock over [`embassy_time::Instant`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}
