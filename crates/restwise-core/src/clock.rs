//! Drift-corrected clock primitive.
//!
//! Timers never decrement a counter between ticks. They keep one absolute
//! reference timestamp and re-derive their value from "now" on every read,
//! so delayed, batched or skipped ticks cannot accumulate error.
//!
//! ```text
//! countdown: value = max(0, ceil((reference - now) / 1000))
//! elapsed:   value = max(0, floor((now - reference) / 1000))
//! ```
//!
//! "Now" comes from an injected [`TimeSource`], which lets tests move time
//! forward without waiting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Countdown,
    Elapsed,
}

/// A value read from the clock at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub mode: TimerMode,
    /// Countdown: the instant the timer reaches zero. Elapsed: the instant
    /// counting began.
    pub reference_ms: u64,
    pub value_secs: u64,
}

/// Reference timestamp for a countdown of `duration_secs` starting at `now_ms`.
pub fn start_countdown(now_ms: u64, duration_secs: u64) -> u64 {
    now_ms.saturating_add(duration_secs.saturating_mul(1000))
}

/// Reference timestamp for an elapsed-time count starting at `now_ms`.
pub fn start_elapsed(now_ms: u64) -> u64 {
    now_ms
}

/// Whole seconds remaining (countdown) or elapsed (elapsed) at `now_ms`.
pub fn read(mode: TimerMode, reference_ms: u64, now_ms: u64) -> u64 {
    match mode {
        TimerMode::Countdown => reference_ms.saturating_sub(now_ms).div_ceil(1000),
        TimerMode::Elapsed => now_ms.saturating_sub(reference_ms) / 1000,
    }
}

pub fn snapshot(mode: TimerMode, reference_ms: u64, now_ms: u64) -> ClockSnapshot {
    ClockSnapshot {
        mode,
        reference_ms,
        value_secs: read(mode, reference_ms, now_ms),
    }
}

/// Source of "now" in milliseconds.
///
/// Only differences between readings matter, so the epoch is up to the
/// implementation. Readings must never go backwards.
pub trait TimeSource: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> u64;
}

pub type SharedTimeSource = Arc<dyn TimeSource>;

/// Milliseconds since construction on the runtime's monotonic clock.
///
/// Uses tokio's `Instant`, so it follows paused/advanced time in tests
/// and falls back to the OS monotonic clock elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    pub fn shared() -> SharedTimeSource {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Wall-clock milliseconds since the Unix epoch.
///
/// Subject to NTP and manual clock changes; prefer [`MonotonicClock`]
/// unless readings must line up with wall time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can hand one clone to a timer
/// and advance the other.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(ms)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.advance_ms(by.as_millis() as u64);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute reading. Ignored if it would move time backwards.
    pub fn set_ms(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }

    pub fn shared(&self) -> SharedTimeSource {
        Arc::new(self.clone())
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
