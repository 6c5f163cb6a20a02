use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::haptics::Cue;
use crate::timer::{CountdownStatus, StopwatchStatus};

/// Why a countdown reached zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionReason {
    /// The reference instant passed.
    Elapsed,
    /// A subtraction pushed the remaining time to zero or below.
    Subtracted,
}

/// Every state change in the engine produces an Event.
/// The host screen subscribes to them; the session maps them to cues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        duration_secs: u64,
        label: Option<String>,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Remaining time crossed into the warning window.
    CountdownWarning {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownAdjusted {
        delta_secs: i64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownCompleted {
        label: Option<String>,
        reason: CompletionReason,
        at: DateTime<Utc>,
    },
    /// User bypassed the rest period. Not a natural completion.
    CountdownSkipped {
        remaining_secs: u64,
        label: Option<String>,
        at: DateTime<Utc>,
    },
    StopwatchStarted {
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StopwatchResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionTornDown {
        countdown: CountdownStatus,
        stopwatch: StopwatchStatus,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The haptic cue this transition should produce, if any.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            Event::CountdownStarted { .. } | Event::StopwatchStarted { .. } => Some(Cue::Start),
            Event::CountdownWarning { .. } => Some(Cue::Warning),
            Event::CountdownCompleted {
                reason: CompletionReason::Elapsed,
                ..
            } => Some(Cue::CompletionLong),
            Event::CountdownCompleted {
                reason: CompletionReason::Subtracted,
                ..
            } => Some(Cue::CompletionShort),
            _ => None,
        }
    }

    /// True for the transitions a host uses to advance to the next exercise.
    pub fn is_rest_finished(&self) -> bool {
        matches!(
            self,
            Event::CountdownCompleted { .. } | Event::CountdownSkipped { .. }
        )
    }
}
