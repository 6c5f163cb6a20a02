//! One active workout session.
//!
//! A [`WorkoutSession`] owns the rest countdown, the workout stopwatch and
//! the haptic dispatcher they share. The two timers never see each other;
//! each returns events, and the session forwards each event's cue to the
//! dispatcher. Build one per workout and tear it down when the workout
//! screen goes away.

mod runner;

pub use runner::{spawn_session, Command, SessionHandle};

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::clock::SharedTimeSource;
use crate::config::EngineConfig;
use crate::error::TimingError;
use crate::events::Event;
use crate::haptics::{HapticDispatcher, HapticDriver};
use crate::timer::{CountdownStatus, CountdownTimer, StopwatchStatus, WorkoutStopwatch};

#[derive(Debug)]
pub struct WorkoutSession {
    countdown: CountdownTimer,
    stopwatch: WorkoutStopwatch,
    haptics: HapticDispatcher,
    tick_period: Duration,
    alive: bool,
}

impl WorkoutSession {
    pub fn new(
        config: &EngineConfig,
        clock: SharedTimeSource,
        driver: Box<dyn HapticDriver>,
    ) -> Self {
        Self {
            countdown: CountdownTimer::new(clock.clone())
                .with_warning_threshold(config.timing.warning_threshold_secs),
            stopwatch: WorkoutStopwatch::new(clock.clone()),
            haptics: HapticDispatcher::from_config(&config.haptics, driver, clock),
            tick_period: Duration::from_millis(config.timing.tick_period_ms.max(1)),
            alive: true,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    pub fn stopwatch(&self) -> &WorkoutStopwatch {
        &self.stopwatch
    }

    pub fn haptics(&self) -> &HapticDispatcher {
        &self.haptics
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // ── Rest countdown ───────────────────────────────────────────────

    /// # Errors
    ///
    /// `TimingError::InvalidDuration` for `duration_secs <= 0`.
    pub fn start_rest(
        &mut self,
        duration_secs: i64,
        label: Option<String>,
    ) -> Result<Option<Event>, TimingError> {
        if duration_secs <= 0 {
            return Err(TimingError::InvalidDuration {
                seconds: duration_secs,
            });
        }
        if !self.alive {
            return Ok(None);
        }
        let event = self.countdown.start(duration_secs, label)?;
        Ok(self.route(event))
    }

    pub fn pause_rest(&mut self) -> Option<Event> {
        self.with_countdown(CountdownTimer::pause)
    }

    pub fn resume_rest(&mut self) -> Option<Event> {
        self.with_countdown(CountdownTimer::resume)
    }

    pub fn skip_rest(&mut self) -> Option<Event> {
        self.with_countdown(CountdownTimer::skip)
    }

    pub fn add_rest_time(&mut self, secs: u64) -> Option<Event> {
        self.with_countdown(|c| c.add_time(secs))
    }

    pub fn subtract_rest_time(&mut self, secs: u64) -> Option<Event> {
        self.with_countdown(|c| c.subtract_time(secs))
    }

    pub fn tick_countdown(&mut self) -> Option<Event> {
        self.with_countdown(CountdownTimer::tick)
    }

    // ── Stopwatch ────────────────────────────────────────────────────

    pub fn start_stopwatch(&mut self) -> Option<Event> {
        self.with_stopwatch(WorkoutStopwatch::start)
    }

    pub fn pause_stopwatch(&mut self) -> Option<Event> {
        self.with_stopwatch(WorkoutStopwatch::pause)
    }

    pub fn resume_stopwatch(&mut self) -> Option<Event> {
        self.with_stopwatch(WorkoutStopwatch::resume)
    }

    pub fn tick_stopwatch(&mut self) {
        if self.alive {
            self.stopwatch.tick();
        }
    }

    /// Tick both timers once.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_stopwatch();
        self.tick_countdown()
    }

    /// End the session. Later commands and ticks do nothing and fire no cues.
    pub fn teardown(&mut self) -> Option<Event> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        let countdown = self.countdown.status();
        let stopwatch = self.stopwatch.status();
        let elapsed_secs = self.stopwatch.elapsed_secs();
        self.countdown.teardown();
        self.stopwatch.teardown();
        debug!(?countdown, ?stopwatch, elapsed_secs, "workout session torn down");
        Some(Event::SessionTornDown {
            countdown,
            stopwatch,
            elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn countdown_running(&self) -> bool {
        self.alive && self.countdown.status() == CountdownStatus::Running
    }

    pub fn stopwatch_running(&self) -> bool {
        self.alive && self.stopwatch.status() == StopwatchStatus::Running
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn with_countdown(&mut self, f: impl FnOnce(&mut CountdownTimer) -> Option<Event>) -> Option<Event> {
        if !self.alive {
            return None;
        }
        let event = f(&mut self.countdown);
        self.route(event)
    }

    fn with_stopwatch(&mut self, f: impl FnOnce(&mut WorkoutStopwatch) -> Option<Event>) -> Option<Event> {
        if !self.alive {
            return None;
        }
        let event = f(&mut self.stopwatch);
        self.route(event)
    }

    fn route(&mut self, event: Option<Event>) -> Option<Event> {
        if let Some(cue) = event.as_ref().and_then(Event::cue) {
            self.haptics.dispatch(cue);
        }
        event
    }
}
