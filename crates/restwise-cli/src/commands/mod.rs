pub mod config;
pub mod rest;
pub mod workout;

use restwise_core::{EngineConfig, Event, MonotonicClock, SessionHandle, WorkoutSession};

use crate::terminal::TerminalBell;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Single-threaded runtime: a session lives on one execution context.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

fn spawn(config: &EngineConfig) -> SessionHandle {
    let session = WorkoutSession::new(config, MonotonicClock::shared(), Box::new(TerminalBell));
    restwise_core::spawn_session(session)
}

/// One-line human description of an event, if it is worth printing.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::CountdownStarted {
            duration_secs,
            label,
            ..
        } => format!(
            "rest started: {}{}",
            restwise_core::format_clock(*duration_secs),
            label_suffix(label)
        ),
        Event::CountdownPaused { remaining_secs, .. } => {
            format!("rest paused at {}", restwise_core::format_clock(*remaining_secs))
        }
        Event::CountdownResumed { remaining_secs, .. } => {
            format!("rest resumed at {}", restwise_core::format_clock(*remaining_secs))
        }
        Event::CountdownAdjusted {
            delta_secs,
            remaining_secs,
            ..
        } => format!(
            "rest {delta_secs:+}s -> {}",
            restwise_core::format_clock(*remaining_secs)
        ),
        Event::CountdownCompleted { label, .. } => format!("rest complete{}", label_suffix(label)),
        Event::CountdownSkipped { label, .. } => format!("rest skipped{}", label_suffix(label)),
        Event::StopwatchStarted { .. } => "workout started".to_string(),
        Event::StopwatchPaused { elapsed_secs, .. } => {
            format!("workout paused at {}", restwise_core::format_clock(*elapsed_secs))
        }
        Event::StopwatchResumed { elapsed_secs, .. } => {
            format!("workout resumed at {}", restwise_core::format_clock(*elapsed_secs))
        }
        Event::SessionTornDown { elapsed_secs, .. } => {
            format!("session ended after {}", restwise_core::format_clock(*elapsed_secs))
        }
        Event::CountdownWarning { .. } => return None,
    };
    Some(line)
}

fn label_suffix(label: &Option<String>) -> String {
    label
        .as_deref()
        .map(|l| format!(" ({l})"))
        .unwrap_or_default()
}
