//! Throughput counters, rolling wait-time window and the status snapshot.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Read-only snapshot of the queue, for dashboards and health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub queue_length: usize,
    pub active_requests: usize,
    pub max_concurrent: usize,
    pub is_accepting_requests: bool,
    pub paused: bool,
    pub average_wait_time_ms: u64,
    pub total_processed: u64,
    pub total_failed: u64,
}

impl QueueStatus {
    pub fn average_wait_time(&self) -> Duration {
        Duration::from_millis(self.average_wait_time_ms)
    }
}

#[derive(Debug)]
pub(crate) struct QueueStats {
    pub total_processed: u64,
    pub total_failed: u64,
    wait_times: VecDeque<Duration>,
    window: usize,
}

impl QueueStats {
    pub fn new(window: usize) -> Self {
        Self {
            total_processed: 0,
            total_failed: 0,
            wait_times: VecDeque::with_capacity(window),
            window: window.max(1),
        }
    }

    pub fn record_wait(&mut self, waited: Duration) {
        if self.wait_times.len() == self.window {
            self.wait_times.pop_front();
        }
        self.wait_times.push_back(waited);
    }

    pub fn average_wait(&self) -> Duration {
        if self.wait_times.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.wait_times.iter().sum();
        total / self.wait_times.len() as u32
    }
}
