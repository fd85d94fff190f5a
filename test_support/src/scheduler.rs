//! Reload scheduler that records requests instead of arming timers.

use paddock::sync::ReloadScheduler;
use std::time::Duration;

/// Records every reload the synchroniser schedules.
#[derive(Debug, Default, Clone)]
pub struct RecordingScheduler {
    delays: Vec<Duration>,
}

impl RecordingScheduler {
    /// Delays of every scheduled reload, in order.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Number of reloads scheduled so far.
    pub fn scheduled(&self) -> usize {
        self.delays.len()
    }
}

impl ReloadScheduler for RecordingScheduler {
    fn schedule_reload(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}
