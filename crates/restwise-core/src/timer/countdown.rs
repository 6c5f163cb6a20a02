//! Rest countdown timer.
//!
//! A reference-timestamp state machine. It does not own a thread or an
//! interval; whoever hosts it calls `tick()` periodically (every 100 ms by
//! default) and forwards the returned events.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Completed
//! ```
//!
//! `Completed` is reached by natural completion (zero crossing, or a
//! subtraction that crosses zero) or by `skip()`. The two are told apart by
//! the event, not the status. `start()` re-initializes from any state.
//!
//! ## Usage
//!
//! ```ignore
//! let mut rest = CountdownTimer::new(MonotonicClock::shared());
//! rest.start(90, Some("Bench press".into()))?;
//! // Every tick:
//! if let Some(event) = rest.tick() { /* warning or completion */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::format_clock;
use super::DEFAULT_WARNING_THRESHOLD_SECS;
use crate::clock::{self, SharedTimeSource, TimerMode};
use crate::error::TimingError;
use crate::events::{CompletionReason, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Read-only view for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub status: CountdownStatus,
    pub remaining_secs: u64,
    pub label: Option<String>,
    pub display: String,
}

impl Default for CountdownSnapshot {
    fn default() -> Self {
        Self {
            status: CountdownStatus::Idle,
            remaining_secs: 0,
            label: None,
            display: format_clock(0),
        }
    }
}

#[derive(Debug)]
pub struct CountdownTimer {
    clock: SharedTimeSource,
    warning_threshold_secs: u64,
    status: CountdownStatus,
    /// Instant the countdown reaches zero. Kept while paused so `resume()`
    /// can rebuild it symmetrically; cleared on completion.
    reference_ms: Option<u64>,
    remaining_secs: u64,
    label: Option<String>,
    /// Remaining-second value at which the last warning fired.
    last_warning_marker: Option<u64>,
    torn_down: bool,
}

impl CountdownTimer {
    pub fn new(clock: SharedTimeSource) -> Self {
        Self {
            clock,
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
            status: CountdownStatus::Idle,
            reference_ms: None,
            remaining_secs: 0,
            label: None,
            last_warning_marker: None,
            torn_down: false,
        }
    }

    /// Warning cues fire once per second while remaining time is at or
    /// below this value. Zero disables them.
    pub fn with_warning_threshold(mut self, secs: u64) -> Self {
        self.warning_threshold_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> CountdownStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn reference_ms(&self) -> Option<u64> {
        self.reference_ms
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            status: self.status,
            remaining_secs: self.remaining_secs,
            label: self.label.clone(),
            display: format_clock(self.remaining_secs),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a rest period of `duration_secs`.
    ///
    /// # Errors
    ///
    /// Returns `TimingError::InvalidDuration` for zero or negative
    /// durations. Nothing is modified in that case.
    pub fn start(
        &mut self,
        duration_secs: i64,
        label: Option<String>,
    ) -> Result<Option<Event>, TimingError> {
        if duration_secs <= 0 {
            return Err(TimingError::InvalidDuration {
                seconds: duration_secs,
            });
        }
        if self.torn_down {
            return Ok(None);
        }

        let duration = duration_secs as u64;
        let now = self.clock.now_ms();
        self.reference_ms = Some(clock::start_countdown(now, duration));
        self.remaining_secs = duration;
        self.label = label;
        self.last_warning_marker = None;
        self.status = CountdownStatus::Running;
        debug!(duration_secs = duration, label = ?self.label, "rest countdown started");

        Ok(Some(Event::CountdownStarted {
            duration_secs: duration,
            label: self.label.clone(),
            at: Utc::now(),
        }))
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.torn_down || self.status != CountdownStatus::Running {
            return None;
        }
        self.remaining_secs = self.read_remaining();
        if self.remaining_secs == 0 {
            // Zero was reached before the tick noticed.
            return Some(self.complete(CompletionReason::Elapsed));
        }
        self.status = CountdownStatus::Paused;
        debug!(remaining_secs = self.remaining_secs, "rest countdown paused");
        Some(Event::CountdownPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.torn_down || self.status != CountdownStatus::Paused {
            return None;
        }
        let now = self.clock.now_ms();
        self.reference_ms = Some(clock::start_countdown(now, self.remaining_secs));
        self.status = CountdownStatus::Running;
        debug!(remaining_secs = self.remaining_secs, "rest countdown resumed");
        Some(Event::CountdownResumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// End the rest period early. No completion cue is attached.
    pub fn skip(&mut self) -> Option<Event> {
        if self.torn_down
            || !matches!(
                self.status,
                CountdownStatus::Running | CountdownStatus::Paused
            )
        {
            return None;
        }
        let remaining = match self.status {
            CountdownStatus::Running => self.read_remaining(),
            _ => self.remaining_secs,
        };
        self.clear_to_completed();
        debug!(remaining_secs = remaining, "rest countdown skipped");
        Some(Event::CountdownSkipped {
            remaining_secs: remaining,
            label: self.label.clone(),
            at: Utc::now(),
        })
    }

    pub fn add_time(&mut self, secs: u64) -> Option<Event> {
        self.adjust(i64::try_from(secs).unwrap_or(i64::MAX))
    }

    /// Shorten the rest period. Crossing zero completes the countdown
    /// rather than going negative.
    pub fn subtract_time(&mut self, secs: u64) -> Option<Event> {
        self.adjust(i64::try_from(secs).map_or(i64::MIN, |s| -s))
    }

    /// Recompute from the clock. Returns a warning or completion event on
    /// the ticks where one occurs.
    pub fn tick(&mut self) -> Option<Event> {
        if self.torn_down || self.status != CountdownStatus::Running {
            return None;
        }
        self.remaining_secs = self.read_remaining();

        if self.remaining_secs == 0 {
            return Some(self.complete(CompletionReason::Elapsed));
        }

        if self.remaining_secs <= self.warning_threshold_secs
            && self.last_warning_marker != Some(self.remaining_secs)
        {
            self.last_warning_marker = Some(self.remaining_secs);
            return Some(Event::CountdownWarning {
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            });
        }
        None
    }

    /// Stop for good. Every later command or tick is a no-op.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.status = CountdownStatus::Idle;
        self.reference_ms = None;
        self.remaining_secs = 0;
        self.label = None;
        self.last_warning_marker = None;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read_remaining(&self) -> u64 {
        self.reference_ms
            .map(|reference| clock::read(TimerMode::Countdown, reference, self.clock.now_ms()))
            .unwrap_or(0)
    }

    fn adjust(&mut self, delta_secs: i64) -> Option<Event> {
        if self.torn_down {
            return None;
        }
        let delta = delta_secs.unsigned_abs();
        let delta_ms = delta.saturating_mul(1000);
        let shift = |value: u64, step: u64| {
            if delta_secs >= 0 {
                value.saturating_add(step)
            } else {
                value.saturating_sub(step)
            }
        };

        match self.status {
            CountdownStatus::Running => {
                let reference = self.reference_ms?;
                self.reference_ms = Some(shift(reference, delta_ms));
                self.remaining_secs = self.read_remaining();
            }
            CountdownStatus::Paused => {
                self.reference_ms = self.reference_ms.map(|r| shift(r, delta_ms));
                self.remaining_secs = shift(self.remaining_secs, delta);
            }
            _ => return None,
        }

        if self.remaining_secs == 0 {
            let reason = if delta_secs < 0 {
                CompletionReason::Subtracted
            } else {
                CompletionReason::Elapsed
            };
            return Some(self.complete(reason));
        }
        if self.remaining_secs > self.warning_threshold_secs {
            self.last_warning_marker = None;
        }

        debug!(delta_secs, remaining_secs = self.remaining_secs, "rest countdown adjusted");
        Some(Event::CountdownAdjusted {
            delta_secs,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    fn complete(&mut self, reason: CompletionReason) -> Event {
        self.clear_to_completed();
        debug!(?reason, label = ?self.label, "rest countdown completed");
        Event::CountdownCompleted {
            label: self.label.clone(),
            reason,
            at: Utc::now(),
        }
    }

    fn clear_to_completed(&mut self) {
        self.status = CountdownStatus::Completed;
        self.remaining_secs = 0;
        self.reference_ms = None;
        self.last_warning_marker = None;
    }
}
