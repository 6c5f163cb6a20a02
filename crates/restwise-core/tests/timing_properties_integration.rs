//! Property tests for drift-free timing.

use proptest::prelude::*;
use restwise_core::clock::{self, ManualClock, TimerMode};
use restwise_core::{CountdownStatus, CountdownTimer, TimeSource, WorkoutStopwatch};

proptest! {
    /// Skipping any number of ticks to reach a given "now" gives the same
    /// value as ticking all the way there.
    #[test]
    fn countdown_value_ignores_skipped_ticks(
        duration in 1u64..600,
        steps in prop::collection::vec(1u64..5_000, 1..40),
    ) {
        let smooth_clock = ManualClock::new();
        let jumpy_clock = ManualClock::new();
        let mut smooth = CountdownTimer::new(smooth_clock.shared());
        let mut jumpy = CountdownTimer::new(jumpy_clock.shared());
        smooth.start(duration as i64, None).unwrap();
        jumpy.start(duration as i64, None).unwrap();

        let total: u64 = steps.iter().sum();
        for step in &steps {
            smooth_clock.advance_ms(*step);
            smooth.tick();
        }
        jumpy_clock.advance_ms(total);
        jumpy.tick();

        prop_assert_eq!(smooth.remaining_secs(), jumpy.remaining_secs());
        prop_assert_eq!(smooth.status(), jumpy.status());
        prop_assert_eq!(
            jumpy.remaining_secs(),
            clock::read(TimerMode::Countdown, duration * 1000, total)
        );
    }

    #[test]
    fn stopwatch_value_ignores_skipped_ticks(
        steps in prop::collection::vec(1u64..20_000, 1..40),
    ) {
        let smooth_clock = ManualClock::new();
        let jumpy_clock = ManualClock::new();
        let mut smooth = WorkoutStopwatch::new(smooth_clock.shared());
        let mut jumpy = WorkoutStopwatch::new(jumpy_clock.shared());
        smooth.start();
        jumpy.start();

        for step in &steps {
            smooth_clock.advance_ms(*step);
            smooth.tick();
        }
        jumpy_clock.advance_ms(steps.iter().sum());
        jumpy.tick();

        prop_assert_eq!(smooth.elapsed_secs(), jumpy.elapsed_secs());
    }

    #[test]
    fn read_is_pure(reference in 0u64..10_000_000, now in 0u64..10_000_000) {
        for mode in [TimerMode::Countdown, TimerMode::Elapsed] {
            prop_assert_eq!(clock::read(mode, reference, now), clock::read(mode, reference, now));
        }
    }

    #[test]
    fn stopwatch_pause_resume_has_no_jump(
        run_ms in 0u64..3_600_000,
        pause_ms in 0u64..86_400_000,
    ) {
        let clock = ManualClock::new();
        let mut watch = WorkoutStopwatch::new(clock.shared());
        watch.start();
        clock.advance_ms(run_ms);
        watch.tick();
        let before = watch.elapsed_secs();

        watch.pause();
        clock.advance_ms(pause_ms);
        watch.resume();
        watch.tick();

        prop_assert_eq!(watch.elapsed_secs(), before);
    }

    #[test]
    fn countdown_never_increases_while_running(
        duration in 1u64..120,
        steps in prop::collection::vec(0u64..1_500, 1..200),
    ) {
        let clock = ManualClock::new();
        let mut timer = CountdownTimer::new(clock.shared());
        timer.start(duration as i64, None).unwrap();

        let mut last = timer.remaining_secs();
        for step in steps {
            clock.advance_ms(step);
            timer.tick();
            prop_assert!(timer.remaining_secs() <= last);
            last = timer.remaining_secs();
            if timer.status() == CountdownStatus::Completed {
                prop_assert_eq!(last, 0);
                break;
            }
        }
    }

    /// With 100 ms ticks, completion lands on the first tick at or after the
    /// deadline: never before it, never more than one period after.
    #[test]
    fn completion_lands_within_one_tick(duration in 1u64..120, offset_ms in 0u64..100) {
        let clock = ManualClock::starting_at(offset_ms);
        let mut timer = CountdownTimer::new(clock.shared());
        timer.start(duration as i64, None).unwrap();
        let deadline = offset_ms + duration * 1000;

        loop {
            clock.advance_ms(100);
            timer.tick();
            if timer.status() == CountdownStatus::Completed {
                break;
            }
        }
        let now = clock.now_ms();
        prop_assert!(now >= deadline);
        prop_assert!(now - deadline < 100);
        prop_assert_eq!(timer.remaining_secs(), 0);
    }
}
