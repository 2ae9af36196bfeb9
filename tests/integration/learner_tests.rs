//! Integration tests for the usage learner's public API.
//!
//! Longer ingest sequences than the unit tests cover: habits forming,
//! dissolving as the window slides, and re-forming after eviction.

use smartsync::adaptive::{
    MinuteOfDay, Suggestion, ToggleLog, UsageLearner, APPLIANCE_SLOTS, SAMPLE_WINDOW,
};

fn m(minute: u16) -> MinuteOfDay {
    MinuteOfDay::new(minute).expect("test minute must be in 0..1440")
}

#[test]
fn fresh_learner_has_an_empty_window_per_slot() {
    let learner = UsageLearner::new();

    for slot in 0..APPLIANCE_SLOTS as u16 {
        assert!(learner.log(slot).is_some_and(ToggleLog::is_empty));
        assert_eq!(learner.evaluate(slot), None);
    }
    assert!(learner.log(APPLIANCE_SLOTS as u16).is_none());
}

#[test]
fn habit_dissolves_under_drift_and_reforms_after_eviction() {
    let mut learner = UsageLearner::new();

    // Four evenings at 10:00 form the habit.
    for _ in 0..4 {
        learner.ingest(0, m(600));
    }
    assert_eq!(
        learner.evaluate(0),
        Some(Suggestion { appliance: 0, minute: 600 })
    );

    // The routine moves to 11:40; the first drifted sample blows the
    // spread and the suggestion disappears.
    learner.ingest(0, m(700));
    assert_eq!(learner.evaluate(0), None);

    // Enough 11:40 toggles evict every 10:00 sample and the new habit
    // takes over.
    for _ in 0..SAMPLE_WINDOW {
        learner.ingest(0, m(700));
    }
    assert_eq!(
        learner.evaluate(0),
        Some(Suggestion { appliance: 0, minute: 700 })
    );
}

#[test]
fn suggested_minute_is_the_median_not_the_mean() {
    let mut learner = UsageLearner::new();

    // One early outlier inside the allowed spread must not drag the
    // proposed time down the way a mean would.
    for &v in &[580, 600, 601, 602] {
        learner.ingest(0, m(v));
    }
    assert_eq!(
        learner.evaluate(0),
        Some(Suggestion { appliance: 0, minute: 600 })
    );
}

#[test]
fn evaluate_never_mutates_the_window() {
    let mut learner = UsageLearner::new();
    for &v in &[480, 482, 478] {
        learner.ingest(0, m(v));
    }

    for _ in 0..10 {
        assert_eq!(learner.evaluate(0), None);
    }
    let log = learner.log(0).unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(log.iter_oldest_first().collect::<Vec<_>>(), vec![480, 482, 478]);
}

#[test]
fn window_evicts_strictly_oldest_first() {
    let mut learner = UsageLearner::new();

    for i in 0..SAMPLE_WINDOW as u16 + 2 {
        learner.ingest(0, m(10 + i));
    }

    let log = learner.log(0).unwrap();
    assert_eq!(log.len(), SAMPLE_WINDOW);
    let samples: Vec<u16> = log.iter_oldest_first().collect();
    assert_eq!(samples[0], 12, "two oldest samples evicted");
    assert_eq!(samples[SAMPLE_WINDOW - 1], 10 + SAMPLE_WINDOW as u16 + 1);
}

#[test]
fn midnight_habits_are_first_class() {
    let mut learner = UsageLearner::new();

    learner.ingest(0, MinuteOfDay::MIDNIGHT);
    learner.ingest(0, m(5));
    learner.ingest(0, m(3));
    let suggestion = learner.ingest(0, MinuteOfDay::MIDNIGHT);

    // Sorted 0 0 3 5 → median (0 + 3) / 2 = 1.
    assert_eq!(suggestion, Some(Suggestion { appliance: 0, minute: 1 }));
}

#[test]
fn slots_suggest_independently_with_their_own_medians() {
    let mut learner = UsageLearner::new();
    let last = APPLIANCE_SLOTS as u16 - 1;

    for _ in 0..4 {
        learner.ingest(0, m(1110));
        learner.ingest(last, m(420));
    }

    assert_eq!(
        learner.evaluate(0),
        Some(Suggestion { appliance: 0, minute: 1110 })
    );
    assert_eq!(
        learner.evaluate(last),
        Some(Suggestion { appliance: last, minute: 420 })
    );
}
