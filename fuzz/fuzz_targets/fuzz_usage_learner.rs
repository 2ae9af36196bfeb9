//! Fuzz target: usage learner windows
//!
//! Drives arbitrary (appliance, minute) ingest sequences and verifies:
//! - No panics under any id/minute mix, including out-of-range ids
//! - Windows never grow past `SAMPLE_WINDOW` samples
//! - A suggestion implies the window actually qualifies (enough samples,
//!   spread under the clustering limit, median inside the day)
//!
//! cargo fuzz run fuzz_usage_learner

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartsync::adaptive::{
    MinuteOfDay, UsageLearner, APPLIANCE_SLOTS, MAX_RANGE_MINUTES, MINUTES_PER_DAY, MIN_SAMPLES,
    SAMPLE_WINDOW,
};

fuzz_target!(|data: &[u8]| {
    let mut learner = UsageLearner::new();

    for step in data.chunks_exact(3) {
        let appliance = step[0] as u16;
        let raw_minute = u16::from_le_bytes([step[1], step[2]]) % MINUTES_PER_DAY;
        let Some(minute) = MinuteOfDay::new(raw_minute) else {
            unreachable!("modulo keeps the minute in-day");
        };

        if let Some(suggestion) = learner.ingest(appliance, minute) {
            assert_eq!(suggestion.appliance, appliance);
            assert!(suggestion.minute < MINUTES_PER_DAY);
        }
    }

    for slot in 0..APPLIANCE_SLOTS as u16 {
        let log = learner.log(slot).expect("slot in range");
        assert!(log.len() <= SAMPLE_WINDOW);
        if let Some(suggestion) = learner.evaluate(slot) {
            assert!(log.len() >= MIN_SAMPLES);
            assert!(log.range().expect("non-empty window") < MAX_RANGE_MINUTES);
            assert!(suggestion.minute < MINUTES_PER_DAY);
        }
    }
});
