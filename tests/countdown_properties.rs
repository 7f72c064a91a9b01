//! Property-based tests for the countdown machine.
//! Invariants hold for every duration and every point in a run.

use countdown_kiosk::state::{Countdown, Effect, Phase, Remaining};

fn advance(mut countdown: Countdown, ticks: u32) -> Countdown {
    for _ in 0..ticks {
        countdown = countdown.tick().0;
    }
    countdown
}

proptest::proptest! {
    /// Seconds stay within 0..=59 and each running tick removes exactly one second.
    #[test]
    fn tick_removes_one_second(minutes in 0u32..20, elapsed in 0u32..1200) {
        let before = advance(Countdown::new(minutes), elapsed);
        let (after, _) = before.tick();

        assert!(after.remaining().seconds <= 59);
        if before.phase() == Phase::Running && !before.remaining().is_zero() {
            assert_eq!(after.remaining().total_seconds() + 1, before.remaining().total_seconds());
        }
    }

    /// Reset always lands on the configured duration, running.
    #[test]
    fn reset_lands_on_configured_duration(minutes in 0u32..20, elapsed in 0u32..1500, next in 0u32..120) {
        let (reset, effects) = advance(Countdown::new(minutes), elapsed).reset(next);

        assert_eq!(reset.remaining(), Remaining::from_minutes(next));
        assert_eq!(reset.phase(), Phase::Running);
        assert!(!effects.is_empty());
    }

    /// A countdown of N minutes expires on exactly the N*60-th tick.
    #[test]
    fn expires_after_exact_duration(minutes in 1u32..15) {
        let almost = advance(Countdown::new(minutes), minutes * 60 - 1);
        assert_eq!(almost.phase(), Phase::Running);
        assert_eq!(almost.remaining(), Remaining { minutes: 0, seconds: 1 });

        let done = advance(almost, 1);
        assert_eq!(done.phase(), Phase::Expired);
        assert_eq!(done.remaining(), Remaining::ZERO);
    }

    /// Once expired, ticks change nothing and render nothing.
    #[test]
    fn expired_is_frozen(minutes in 0u32..5, extra in 1u32..100) {
        let expired = advance(Countdown::new(minutes), minutes * 60 + 1);
        assert_eq!(expired.phase(), Phase::Expired);

        let (after, effects) = expired.tick();
        assert_eq!(after, expired);
        assert!(effects.is_empty());
        assert_eq!(advance(expired, extra), expired);
    }

    /// Every running tick renders the value it lands on.
    #[test]
    fn running_tick_renders_new_value(minutes in 1u32..10, elapsed in 0u32..599) {
        let before = advance(Countdown::new(minutes), elapsed.min(minutes * 60 - 1));
        let (after, effects) = before.tick();
        assert!(effects.contains(&Effect::Labels(after.remaining())));
    }
}
