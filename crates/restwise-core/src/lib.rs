//! # Restwise Core Library
//!
//! The timing engine behind an active workout: a rest countdown between
//! sets, a stopwatch for the whole session, and the vibration cues tied to
//! their transitions.
//!
//! ## Architecture
//!
//! - **Clock**: pure functions that derive seconds from one absolute
//!   reference timestamp and an injected "now", so throttled or batched
//!   ticks never drift
//! - **Timers**: reference-timestamp state machines that the caller ticks
//!   (every 100 ms by default)
//! - **Haptics**: a rate-limited dispatcher turning cue names into patterns
//! - **Session**: one owner per workout for both timers and the dispatcher,
//!   plus an async runner that drives the ticks on a single tokio task
//!
//! ## Key Components
//!
//! - [`CountdownTimer`]: rest countdown with pause, resume, add/subtract, skip
//! - [`WorkoutStopwatch`]: elapsed session time with pause/resume
//! - [`HapticDispatcher`]: cue sink with minimum pulse spacing
//! - [`WorkoutSession`] / [`SessionHandle`]: session ownership and runtime
//! - [`EngineConfig`]: TOML configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod haptics;
pub mod session;
pub mod timer;

pub use clock::{ManualClock, MonotonicClock, SharedTimeSource, SystemClock, TimeSource, TimerMode};
pub use config::{EngineConfig, HapticsConfig, TimingConfig};
pub use error::{ConfigError, HapticError, TimingError};
pub use events::{CompletionReason, Event};
pub use haptics::{Cue, HapticDispatcher, HapticDriver, NoopDriver, RecordingDriver, VibrationPattern};
pub use session::{spawn_session, SessionHandle, WorkoutSession};
pub use timer::{
    format_clock, CountdownSnapshot, CountdownStatus, CountdownTimer, StopwatchSnapshot,
    StopwatchStatus, WorkoutStopwatch,
};
