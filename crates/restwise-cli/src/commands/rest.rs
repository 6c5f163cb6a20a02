use std::io::Write;

use clap::Args;
use restwise_core::{CountdownSnapshot, EngineConfig, TimingError};
use tokio::sync::broadcast::error::RecvError;

use super::{describe, runtime, spawn, CliResult};

#[derive(Args)]
pub struct RestArgs {
    /// Rest length in seconds (defaults to timing.default_rest_secs)
    #[arg(allow_negative_numbers = true)]
    seconds: Option<i64>,
    /// Exercise name shown with the countdown
    #[arg(long)]
    label: Option<String>,
    /// Print snapshots and events as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: RestArgs) -> CliResult {
    if let Some(seconds) = args.seconds.filter(|s| *s <= 0) {
        return Err(TimingError::InvalidDuration { seconds }.into());
    }
    let config = EngineConfig::load()?;
    let seconds = args
        .seconds
        .unwrap_or_else(|| i64::try_from(config.timing.default_rest_secs).unwrap_or(i64::MAX));
    runtime()?.block_on(rest(seconds, args.label, args.json, config))
}

async fn rest(seconds: i64, label: Option<String>, json: bool, config: EngineConfig) -> CliResult {
    let handle = spawn(&config);
    let mut events = handle.subscribe();
    let mut countdown = handle.watch_countdown();
    handle.start_rest(seconds, label)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = countdown.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = countdown.borrow_and_update().clone();
                render(&snapshot, json)?;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if json {
                        println!("{}", serde_json::to_string(&event)?);
                    }
                    if event.is_rest_finished() {
                        if !json {
                            println!("\r{}", describe(&event).unwrap_or_default());
                        }
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                eprintln!();
                eprintln!("interrupted");
                break;
            }
        }
    }

    handle.teardown().await;
    Ok(())
}

fn render(snapshot: &CountdownSnapshot, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }
    let mut out = std::io::stdout();
    match &snapshot.label {
        Some(label) => write!(out, "\r{label} {}   ", snapshot.display)?,
        None => write!(out, "\rrest {}   ", snapshot.display)?,
    }
    out.flush()?;
    Ok(())
}
