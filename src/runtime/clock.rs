//! Monotonic clock and blocking sleep.

use std::time::{Duration, Instant};

use super::RealRuntime;

impl RealRuntime {
    pub(crate) fn now_impl(&self) -> Instant {
        Instant::now()
    }

    pub(crate) fn sleep_impl(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}
