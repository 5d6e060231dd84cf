//! Core types for the polling scheduler
//!
//! [`TaskStats`] is updated by a task after each action and handed to
//! whoever waits on the task once it retires.

/// Runtime statistics for a single scheduled task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of times the action ran
    pub cycles: u64,

    /// Results handed to the callback
    pub delivered: u64,

    /// Results dropped because the task was cancelled while the action ran
    pub suppressed: u64,

    /// Last action duration in microseconds
    pub last_action_us: u32,

    /// Average action duration in microseconds (exponential moving average)
    ///
    /// Uses EMA with alpha = 0.1 so a single slow bus transaction does not
    /// dominate the figure.
    pub avg_action_us: u32,

    /// Longest action observed in microseconds
    pub max_action_us: u32,
}

impl TaskStats {
    /// Record one completed action
    pub fn record_action(&mut self, action_us: u32) {
        self.last_action_us = action_us;
        self.cycles = self.cycles.saturating_add(1);

        // avg_new = (value + 9 * avg_old) / 10
        if self.avg_action_us == 0 {
            self.avg_action_us = action_us;
        } else {
            let avg = (action_us as u64 + 9 * self.avg_action_us as u64) / 10;
            self.avg_action_us = avg as u32;
        }

        if action_us > self.max_action_us {
            self.max_action_us = action_us;
        }
    }

    /// Record a result handed to the callback
    pub fn record_delivery(&mut self) {
        self.delivered = self.delivered.saturating_add(1);
    }

    /// Record a result dropped because of cancellation
    pub fn record_suppressed(&mut self) {
        self.suppressed = self.suppressed.saturating_add(1);
    }
}
