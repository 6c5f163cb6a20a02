//! Interactive workout session driven by stdin lines.

use restwise_core::{EngineConfig, SessionHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::{describe, runtime, spawn, CliResult};

const HELP: &str = "commands: rest [SECS] [LABEL] | pause | resume | skip | +SECS | -SECS | stop | go | status | quit";

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Rest { seconds: Option<i64>, label: Option<String> },
    PauseRest,
    ResumeRest,
    SkipRest,
    Add(u64),
    Subtract(u64),
    PauseWorkout,
    ResumeWorkout,
    Status,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Input::Empty);
    };

    if let Some(amount) = head.strip_prefix('+') {
        return parse_secs(amount).map(Input::Add);
    }
    if let Some(amount) = head.strip_prefix('-') {
        return parse_secs(amount).map(Input::Subtract);
    }

    let input = match head {
        "rest" => {
            let mut rest_words = words.peekable();
            let seconds = match rest_words.peek().map(|w| w.parse::<i64>()) {
                Some(Ok(secs)) => {
                    rest_words.next();
                    Some(secs)
                }
                _ => None,
            };
            let label = rest_words.collect::<Vec<_>>().join(" ");
            Input::Rest {
                seconds,
                label: (!label.is_empty()).then_some(label),
            }
        }
        "pause" | "p" => Input::PauseRest,
        "resume" | "r" => Input::ResumeRest,
        "skip" | "s" => Input::SkipRest,
        "stop" => Input::PauseWorkout,
        "go" => Input::ResumeWorkout,
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(input)
}

fn parse_secs(text: &str) -> Result<u64, String> {
    text.parse::<u64>()
        .map_err(|_| format!("expected a number of seconds, got '{text}'"))
}

pub fn run() -> CliResult {
    let config = EngineConfig::load()?;
    runtime()?.block_on(workout(config))
}

async fn workout(config: EngineConfig) -> CliResult {
    let handle = spawn(&config);
    let mut events = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    handle.start_stopwatch()?;
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => apply(&handle, &config, input)?,
                    Err(message) => eprintln!("{message}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    let elapsed = handle.stopwatch().display;
    handle.teardown().await;
    println!("workout time {elapsed}");
    Ok(())
}

fn apply(handle: &SessionHandle, config: &EngineConfig, input: Input) -> CliResult {
    match input {
        Input::Rest { seconds, label } => {
            let seconds = seconds.unwrap_or_else(|| {
                i64::try_from(config.timing.default_rest_secs).unwrap_or(i64::MAX)
            });
            if let Err(e) = handle.start_rest(seconds, label) {
                eprintln!("{e}");
            }
        }
        Input::PauseRest => handle.pause_rest()?,
        Input::ResumeRest => handle.resume_rest()?,
        Input::SkipRest => handle.skip_rest()?,
        Input::Add(secs) => handle.add_rest_time(secs)?,
        Input::Subtract(secs) => handle.subtract_rest_time(secs)?,
        Input::PauseWorkout => handle.pause_stopwatch()?,
        Input::ResumeWorkout => handle.resume_stopwatch()?,
        Input::Status => {
            let rest = handle.countdown();
            let watch = handle.stopwatch();
            println!(
                "workout {} ({:?}) | rest {} ({:?})",
                watch.display, watch.status, rest.display, rest.status
            );
        }
        Input::Help => println!("{HELP}"),
        Input::Quit | Input::Empty => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rest_with_and_without_args() {
        assert_eq!(
            parse_line("rest 90 Bench press"),
            Ok(Input::Rest {
                seconds: Some(90),
                label: Some("Bench press".into())
            })
        );
        assert_eq!(
            parse_line("rest"),
            Ok(Input::Rest {
                seconds: None,
                label: None
            })
        );
        assert_eq!(
            parse_line("rest Plank"),
            Ok(Input::Rest {
                seconds: None,
                label: Some("Plank".into())
            })
        );
    }

    #[test]
    fn parses_adjustments() {
        assert_eq!(parse_line("+15"), Ok(Input::Add(15)));
        assert_eq!(parse_line("  -10 "), Ok(Input::Subtract(10)));
        assert!(parse_line("+abc").is_err());
        assert!(parse_line("--5").is_err());
    }

    #[test]
    fn parses_short_commands() {
        assert_eq!(parse_line("p"), Ok(Input::PauseRest));
        assert_eq!(parse_line("r"), Ok(Input::ResumeRest));
        assert_eq!(parse_line("s"), Ok(Input::SkipRest));
        assert_eq!(parse_line("stop"), Ok(Input::PauseWorkout));
        assert_eq!(parse_line("go"), Ok(Input::ResumeWorkout));
        assert_eq!(parse_line("q"), Ok(Input::Quit));
        assert_eq!(parse_line(""), Ok(Input::Empty));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(
            parse_line("dance"),
            Err("unknown command 'dance'".to_string())
        );
    }
}
