//! Repeating timer with synchronous cancellation.
//!
//! Wraps a `tokio::time::Interval`. The first tick fires one full period
//! after arming; the click that starts a run happens outside the timer.
//! Cancelling is dropping: once a `RepeatingTimer` is gone no further tick
//! can be observed from it.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

#[derive(Debug)]
pub struct RepeatingTimer {
    interval: Interval,
    period: Duration,
}

impl RepeatingTimer {
    /// Arm a timer that fires every `period`, starting one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        // A late tick pushes the schedule back instead of bursting to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next firing.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}
