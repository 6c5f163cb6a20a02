//! End-to-end rest/stopwatch scenarios on a simulated clock.

use restwise_core::haptics::CuePatterns;
use restwise_core::{
    CompletionReason, CountdownStatus, Cue, EngineConfig, Event, ManualClock, RecordingDriver,
    StopwatchStatus, WorkoutSession,
};

struct Harness {
    clock: ManualClock,
    driver: RecordingDriver,
    session: WorkoutSession,
    events: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::starting_at(1_700_000_000_000);
        let driver = RecordingDriver::new();
        let session = WorkoutSession::new(
            &EngineConfig::default(),
            clock.shared(),
            Box::new(driver.clone()),
        );
        Self {
            clock,
            driver,
            session,
            events: Vec::new(),
        }
    }

    /// Simulate `ms` of real time with a tick every 100 ms.
    fn run(&mut self, ms: u64) {
        let mut left = ms;
        while left > 0 {
            let step = left.min(100);
            self.clock.advance_ms(step);
            left -= step;
            self.events.extend(self.session.tick());
        }
    }

    fn cues(&self) -> Vec<Cue> {
        let patterns = CuePatterns::default();
        self.driver
            .played()
            .iter()
            .filter_map(|p| patterns.cue_for(p))
            .collect()
    }
}

#[test]
fn start_and_natural_completion() {
    let mut h = Harness::new();
    h.session.start_rest(5, Some("Pull-ups".into())).unwrap();
    h.run(5_050);

    assert_eq!(h.session.countdown().status(), CountdownStatus::Completed);
    assert_eq!(h.session.countdown().remaining_secs(), 0);
    let long = h.cues().iter().filter(|c| **c == Cue::CompletionLong).count();
    assert_eq!(long, 1);

    let completed: Vec<_> = h
        .events
        .iter()
        .filter(|e| matches!(e, Event::CountdownCompleted { .. }))
        .collect();
    assert_eq!(completed.len(), 1);
}

#[test]
fn subtract_past_zero() {
    let mut h = Harness::new();
    h.session.start_rest(10, None).unwrap();
    let event = h.session.subtract_rest_time(15);

    assert!(matches!(
        event,
        Some(Event::CountdownCompleted {
            reason: CompletionReason::Subtracted,
            ..
        })
    ));
    assert_eq!(h.session.countdown().status(), CountdownStatus::Completed);
    assert_eq!(h.session.countdown().remaining_secs(), 0);
}

#[test]
fn pause_then_resume_mid_countdown() {
    let mut h = Harness::new();
    h.session.start_rest(20, None).unwrap();
    h.run(5_000);
    h.session.pause_rest();

    // App in the background: no ticks at all.
    h.clock.advance_ms(100_000);
    h.session.resume_rest();

    h.run(14_900);
    assert_eq!(h.session.countdown().status(), CountdownStatus::Running);
    assert_eq!(h.session.countdown().remaining_secs(), 1);

    h.run(200);
    assert_eq!(h.session.countdown().status(), CountdownStatus::Completed);
}

#[test]
fn teardown_during_active_tick() {
    let mut h = Harness::new();
    h.session.start_stopwatch();
    h.session.start_rest(10, None).unwrap();
    h.run(3_000);

    h.session.teardown();
    let countdown = h.session.countdown().snapshot();
    let stopwatch = h.session.stopwatch().snapshot();
    let cues = h.cues();
    let events = h.events.len();

    h.run(3_000);

    assert_eq!(h.session.countdown().snapshot(), countdown);
    assert_eq!(h.session.stopwatch().snapshot(), stopwatch);
    assert_eq!(h.cues(), cues);
    assert_eq!(h.events.len(), events);
}

#[test]
fn redundant_pause_is_idempotent() {
    let mut h = Harness::new();
    h.session.start_rest(30, None).unwrap();
    h.run(4_000);

    h.session.pause_rest();
    let once = h.session.countdown().snapshot();
    h.clock.advance_ms(2_500);
    assert!(h.session.pause_rest().is_none());
    assert_eq!(h.session.countdown().snapshot(), once);
}

#[test]
fn throttled_ticks_do_not_drift() {
    let mut h = Harness::new();
    h.session.start_stopwatch();
    h.session.start_rest(90, None).unwrap();

    // Background throttling: one tick every 7 seconds.
    for _ in 0..10 {
        h.clock.advance_ms(7_000);
        h.session.tick();
    }
    assert_eq!(h.session.countdown().remaining_secs(), 20);
    assert_eq!(h.session.stopwatch().elapsed_secs(), 70);
}

#[test]
fn full_workout_with_several_sets() {
    let mut h = Harness::new();
    h.session.start_stopwatch();

    for (set, label) in ["Squat", "Bench", "Row"].iter().enumerate() {
        h.run(40_000);
        h.session.start_rest(60, Some(label.to_string())).unwrap();
        if set == 1 {
            h.session.add_rest_time(30);
        }
        h.run(95_000);
    }

    let completions: Vec<_> = h
        .events
        .iter()
        .filter_map(|e| match e {
            Event::CountdownCompleted { label, .. } => label.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(completions, vec!["Squat", "Bench", "Row"]);

    h.session.pause_stopwatch();
    assert_eq!(h.session.stopwatch().status(), StopwatchStatus::Paused);
    assert_eq!(h.session.stopwatch().elapsed_secs(), 3 * 135);
    assert_eq!(h.session.stopwatch().display(), "06:45");
}
