//! Quiescence clock state.
//!
//! The clock itself does not own a thread. It records the tick period and
//! whether ticks should currently be honored; whoever drives the scheduler
//! (a [`crate::ticker::Ticker`], a replay loop, a test) asks it for the
//! interval and delivers ticks. A stopped clock makes `on_tick` a no-op.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct QuiescenceClock {
    interval: Duration,
    running: bool,
}

impl QuiescenceClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}
