//! Workout stopwatch.
//!
//! Tracks total session time. Same reference-timestamp approach as the
//! countdown, in elapsed mode: pausing freezes the value, resuming moves the
//! reference back by the frozen amount so counting continues without a jump.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::format_clock;
use crate::clock::{self, SharedTimeSource, TimerMode};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchStatus {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchSnapshot {
    pub status: StopwatchStatus,
    pub elapsed_secs: u64,
    pub display: String,
}

impl Default for StopwatchSnapshot {
    fn default() -> Self {
        Self {
            status: StopwatchStatus::Idle,
            elapsed_secs: 0,
            display: format_clock(0),
        }
    }
}

#[derive(Debug)]
pub struct WorkoutStopwatch {
    clock: SharedTimeSource,
    status: StopwatchStatus,
    reference_ms: Option<u64>,
    elapsed_secs: u64,
    torn_down: bool,
}

impl WorkoutStopwatch {
    pub fn new(clock: SharedTimeSource) -> Self {
        Self {
            clock,
            status: StopwatchStatus::Idle,
            reference_ms: None,
            elapsed_secs: 0,
            torn_down: false,
        }
    }

    pub fn status(&self) -> StopwatchStatus {
        self.status
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn reference_ms(&self) -> Option<u64> {
        self.reference_ms
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn display(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    pub fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            status: self.status,
            elapsed_secs: self.elapsed_secs,
            display: self.display(),
        }
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.torn_down || self.status != StopwatchStatus::Idle {
            return None;
        }
        self.reference_ms = Some(clock::start_elapsed(self.clock.now_ms()));
        self.elapsed_secs = 0;
        self.status = StopwatchStatus::Running;
        debug!("workout stopwatch started");
        Some(Event::StopwatchStarted { at: Utc::now() })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.torn_down || self.status != StopwatchStatus::Running {
            return None;
        }
        self.elapsed_secs = self.read_elapsed();
        self.status = StopwatchStatus::Paused;
        debug!(elapsed_secs = self.elapsed_secs, "workout stopwatch paused");
        Some(Event::StopwatchPaused {
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.torn_down || self.status != StopwatchStatus::Paused {
            return None;
        }
        let now = self.clock.now_ms();
        self.reference_ms = Some(now.saturating_sub(self.elapsed_secs.saturating_mul(1000)));
        self.status = StopwatchStatus::Running;
        debug!(elapsed_secs = self.elapsed_secs, "workout stopwatch resumed");
        Some(Event::StopwatchResumed {
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Recompute elapsed time. Never completes on its own.
    pub fn tick(&mut self) {
        if self.torn_down || self.status != StopwatchStatus::Running {
            return;
        }
        self.elapsed_secs = self.read_elapsed();
    }

    /// Stop for good and clear the reading.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.status = StopwatchStatus::Idle;
        self.reference_ms = None;
        self.elapsed_secs = 0;
    }

    fn read_elapsed(&self) -> u64 {
        self.reference_ms
            .map(|reference| clock::read(TimerMode::Elapsed, reference, self.clock.now_ms()))
            .unwrap_or(0)
    }
}
