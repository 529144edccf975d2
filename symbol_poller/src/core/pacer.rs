// @file: symbol_poller/src/core/pacer.rs
// @description: Sleep computation that keeps cycles on a fixed nominal period.
// @author: LAS.

use std::time::Duration;
use crate::core::models::CycleTiming;

#[derive(Debug, Clone, Copy, Default)]
pub struct CyclePacer;

impl CyclePacer {
    /// Remaining part of the interval, or zero when collection overran it.
    /// Overruns never queue extra cycles.
    pub fn next_delay(&self, configured_interval: Duration, elapsed: Duration) -> Duration {
        configured_interval.saturating_sub(elapsed)
    }

    pub fn delay_for(&self, timing: CycleTiming) -> Duration {
        self.next_delay(timing.configured_interval, timing.elapsed)
    }
}
