//! Async tick loop for a [`WorkoutSession`].
//!
//! The session is moved into a single tokio task, which is its only
//! execution context. That task keeps one repeating interval per timer,
//! present only while the timer runs, and applies commands between ticks,
//! so a timer is never ticked re-entrantly and no lock guards the session.
//! Dropping an interval is the cancellation: once a timer stops or the
//! session is torn down, no further tick for it can be observed.

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use super::WorkoutSession;
use crate::error::TimingError;
use crate::events::Event;
use crate::timer::{CountdownSnapshot, StopwatchSnapshot};

const EVENT_CAPACITY: usize = 64;

/// Commands accepted by a running session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartRest { duration_secs: i64, label: Option<String> },
    PauseRest,
    ResumeRest,
    SkipRest,
    AddRestTime(u64),
    SubtractRestTime(u64),
    StartStopwatch,
    PauseStopwatch,
    ResumeStopwatch,
    Teardown,
}

/// Host-side handle to a session task.
///
/// Commands return as soon as they are queued; their effects are visible
/// through the snapshot channels and the event stream. Dropping the handle
/// tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    countdown: watch::Receiver<CountdownSnapshot>,
    stopwatch: watch::Receiver<StopwatchSnapshot>,
    events: broadcast::Sender<Event>,
    task: JoinHandle<()>,
}

/// Move `session` into its own task and return a handle to it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(session: WorkoutSession) -> SessionHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (countdown_tx, countdown_rx) = watch::channel(session.countdown().snapshot());
    let (stopwatch_tx, stopwatch_rx) = watch::channel(session.stopwatch().snapshot());
    let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

    let task = tokio::spawn(run(
        session,
        commands_rx,
        Outputs {
            countdown: countdown_tx,
            stopwatch: stopwatch_tx,
            events: events_tx.clone(),
        },
    ));

    SessionHandle {
        commands: commands_tx,
        countdown: countdown_rx,
        stopwatch: stopwatch_rx,
        events: events_tx,
        task,
    }
}

impl SessionHandle {
    /// # Errors
    ///
    /// `InvalidDuration` for `duration_secs <= 0` (nothing is sent), or
    /// `SessionClosed` if the task has ended.
    pub fn start_rest(&self, duration_secs: i64, label: Option<String>) -> Result<(), TimingError> {
        if duration_secs <= 0 {
            return Err(TimingError::InvalidDuration {
                seconds: duration_secs,
            });
        }
        self.send(Command::StartRest {
            duration_secs,
            label,
        })
    }

    pub fn pause_rest(&self) -> Result<(), TimingError> {
        self.send(Command::PauseRest)
    }

    pub fn resume_rest(&self) -> Result<(), TimingError> {
        self.send(Command::ResumeRest)
    }

    pub fn skip_rest(&self) -> Result<(), TimingError> {
        self.send(Command::SkipRest)
    }

    pub fn add_rest_time(&self, secs: u64) -> Result<(), TimingError> {
        self.send(Command::AddRestTime(secs))
    }

    pub fn subtract_rest_time(&self, secs: u64) -> Result<(), TimingError> {
        self.send(Command::SubtractRestTime(secs))
    }

    pub fn start_stopwatch(&self) -> Result<(), TimingError> {
        self.send(Command::StartStopwatch)
    }

    pub fn pause_stopwatch(&self) -> Result<(), TimingError> {
        self.send(Command::PauseStopwatch)
    }

    pub fn resume_stopwatch(&self) -> Result<(), TimingError> {
        self.send(Command::ResumeStopwatch)
    }

    /// Latest countdown snapshot.
    pub fn countdown(&self) -> CountdownSnapshot {
        self.countdown.borrow().clone()
    }

    /// Latest stopwatch snapshot.
    pub fn stopwatch(&self) -> StopwatchSnapshot {
        self.stopwatch.borrow().clone()
    }

    pub fn watch_countdown(&self) -> watch::Receiver<CountdownSnapshot> {
        self.countdown.clone()
    }

    pub fn watch_stopwatch(&self) -> watch::Receiver<StopwatchSnapshot> {
        self.stopwatch.clone()
    }

    /// Event stream, including completion notifications. Only events sent
    /// after subscribing are received.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Tear the session down and wait for its task to finish.
    pub async fn teardown(self) {
        let _ = self.commands.send(Command::Teardown);
        let _ = self.task.await;
    }

    fn send(&self, command: Command) -> Result<(), TimingError> {
        self.commands
            .send(command)
            .map_err(|_| TimingError::SessionClosed)
    }
}

struct Outputs {
    countdown: watch::Sender<CountdownSnapshot>,
    stopwatch: watch::Sender<StopwatchSnapshot>,
    events: broadcast::Sender<Event>,
}

impl Outputs {
    fn publish(&self, event: Option<Event>) {
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn refresh(&self, session: &WorkoutSession) {
        let countdown = session.countdown().snapshot();
        self.countdown.send_if_modified(|current| replace_if_changed(current, countdown));
        let stopwatch = session.stopwatch().snapshot();
        self.stopwatch.send_if_modified(|current| replace_if_changed(current, stopwatch));
    }
}

fn replace_if_changed<T: PartialEq>(current: &mut T, next: T) -> bool {
    if *current == next {
        false
    } else {
        *current = next;
        true
    }
}

async fn run(
    mut session: WorkoutSession,
    mut commands: mpsc::UnboundedReceiver<Command>,
    outputs: Outputs,
) {
    let period = session.tick_period();
    let mut countdown_ticks: Option<Interval> = None;
    let mut stopwatch_ticks: Option<Interval> = None;

    loop {
        sync_ticks(&mut countdown_ticks, session.countdown_running(), period);
        sync_ticks(&mut stopwatch_ticks, session.stopwatch_running(), period);

        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Teardown) | None => {
                    outputs.publish(session.teardown());
                    outputs.refresh(&session);
                    break;
                }
                Some(command) => outputs.publish(apply(&mut session, command)),
            },
            _ = next_tick(&mut countdown_ticks) => {
                outputs.publish(session.tick_countdown());
            }
            _ = next_tick(&mut stopwatch_ticks) => {
                session.tick_stopwatch();
            }
        }

        outputs.refresh(&session);
    }
    debug!("session task finished");
}

fn apply(session: &mut WorkoutSession, command: Command) -> Option<Event> {
    match command {
        Command::StartRest {
            duration_secs,
            label,
        } => session.start_rest(duration_secs, label).unwrap_or_else(|e| {
            debug!(error = %e, "rest start refused");
            None
        }),
        Command::PauseRest => session.pause_rest(),
        Command::ResumeRest => session.resume_rest(),
        Command::SkipRest => session.skip_rest(),
        Command::AddRestTime(secs) => session.add_rest_time(secs),
        Command::SubtractRestTime(secs) => session.subtract_rest_time(secs),
        Command::StartStopwatch => session.start_stopwatch(),
        Command::PauseStopwatch => session.pause_stopwatch(),
        Command::ResumeStopwatch => session.resume_stopwatch(),
        Command::Teardown => session.teardown(),
    }
}

/// Create or drop a timer's interval to match whether it is running.
fn sync_ticks(ticks: &mut Option<Interval>, running: bool, period: Duration) {
    match (running, ticks.is_some()) {
        (true, false) => {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *ticks = Some(interval);
        }
        (false, true) => *ticks = None,
        _ => {}
    }
}

async fn next_tick(ticks: &mut Option<Interval>) {
    match ticks {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
