//! Drives the video gate countdown from the tokio timer.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Source of one-second gate ticks.
///
/// The first tick fires one full period after [`GateTicker::ticks`] is
/// called, so entering the video step never consumes a second instantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateTicker {
    period: Duration,
}

impl GateTicker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            period: DEFAULT_PERIOD,
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts a fresh tick stream. Dropping it cancels the countdown driver.
    #[must_use]
    pub fn ticks(&self) -> Ticks {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        // A stalled UI thread must not replay a burst of seconds afterwards.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Ticks { interval }
    }
}

impl Default for GateTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Ticks {
    interval: Interval,
}

impl Ticks {
    /// Waits for the next tick.
    pub async fn next(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_a_full_period() {
        let start = Instant::now();
        let mut ticks = GateTicker::new().ticks();
        ticks.next().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        ticks.next().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
