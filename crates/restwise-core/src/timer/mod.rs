mod countdown;
mod format;
mod stopwatch;

pub use countdown::{CountdownSnapshot, CountdownStatus, CountdownTimer};
pub use format::format_clock;
pub use stopwatch::{StopwatchSnapshot, StopwatchStatus, WorkoutStopwatch};

/// Default period between ticks while a timer is running.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 100;

/// Default size of the countdown's warning window.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u64 = 3;
