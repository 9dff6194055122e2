//! Frame timer
//!
//! A periodic timer that can be armed and cancelled, standing in for a
//! display's refresh callback. It knows nothing about what is drawn.

use std::future::pending;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// One refresh of a 60 Hz display, rounded down to whole milliseconds
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Cancellable periodic timer
///
/// While armed, [`FrameTimer::tick`] completes once per period. While
/// cancelled it never completes, which makes it safe to poll from a
/// `tokio::select!` loop in every state. Missed frames are skipped rather
/// than delivered in a burst.
#[derive(Debug)]
pub struct FrameTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl FrameTimer {
    /// Creates a cancelled timer
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "frame period must be non-zero");
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Schedules ticks every period, the first one immediately
    ///
    /// Re-arming an armed timer restarts its schedule.
    pub fn arm(&mut self) {
        let mut interval = interval_at(Instant::now(), self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    /// Drops any pending tick
    pub fn cancel(&mut self) {
        self.interval = None;
    }

    /// Waits for the next tick and returns the instant it fired at
    ///
    /// The returned instant is the wall-clock time of the wakeup, not the
    /// scheduled deadline, which lags behind after a skipped frame.
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                Instant::now()
            }
            None => pending().await,
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_PERIOD)
    }
}
