//! Integration tests for the channel-line → Controller → actuator pipeline.
//!
//! These run on the host (x86_64) and verify the full dispatch chain from
//! an incoming command line down to actuator calls and outbound notices,
//! without any real hardware.

use crate::mock_hw::{ActuatorCall, MockClock, MockHardware, RecordingSink};

use smartsync::adaptive::UsageLearner;
use smartsync::app::events::AppEvent;
use smartsync::app::service::Controller;
use smartsync::pins;

fn make_controller() -> (Controller, MockHardware, MockClock, RecordingSink) {
    (
        Controller::new(UsageLearner::new()),
        MockHardware::new(),
        MockClock::new(600),
        RecordingSink::new(),
    )
}

// ── Habit detection end to end ────────────────────────────────

#[test]
fn four_evening_fan_toggles_produce_one_suggestion() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    // Fan switched on by hand four evenings running, around 18:30.
    for &minute in &[1110, 1112, 1108] {
        clock.set(minute);
        ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);
        assert!(sink.events.is_empty(), "no suggestion before four samples");
    }

    clock.set(1111);
    ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);

    assert_eq!(
        sink.events,
        vec![AppEvent::SuggestionReady {
            appliance: 0,
            minute: 1110,
        }]
    );
    assert_eq!(sink.lines(), vec!["SUGGEST:0:1110"]);

    // Every toggle actually drove the relay, suggestion or not.
    let relay_calls = hw
        .calls
        .iter()
        .filter(|c| matches!(c, ActuatorCall::SetDigital { gpio, .. } if *gpio == pins::RELAY_FAN_GPIO))
        .count();
    assert_eq!(relay_calls, 4);
}

#[test]
fn fan_off_also_counts_as_a_manual_toggle() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    clock.set(1110);
    for line in ["FAN:ON", "FAN:OFF", "FAN:ON", "FAN:OFF"] {
        ctl.handle_line(line, &mut hw, &clock, &mut sink);
    }

    assert_eq!(sink.lines(), vec!["SUGGEST:0:1110"]);
    assert_eq!(hw.digital_state(pins::RELAY_FAN_GPIO), Some(false));
}

#[test]
fn scattered_toggles_stay_quiet() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    for &minute in &[300, 600, 900, 1200, 60] {
        clock.set(minute);
        ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);
    }

    assert!(sink.events.is_empty());
}

#[test]
fn qualifying_window_keeps_suggesting_on_later_toggles() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    clock.set(480);
    for _ in 0..4 {
        ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);
    }
    assert_eq!(sink.events.len(), 1);

    // A fifth tight toggle re-evaluates and re-suggests; dedup is the
    // companion app's job.
    clock.set(482);
    ctl.handle_line("FAN:OFF", &mut hw, &clock, &mut sink);
    assert_eq!(sink.events.len(), 2);
}

// ── Relay / PWM actuation ─────────────────────────────────────

#[test]
fn bulb_commands_drive_their_relays() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line("B1:ON", &mut hw, &clock, &mut sink);
    ctl.handle_line("B2:ON", &mut hw, &clock, &mut sink);
    ctl.handle_line("B2:OFF", &mut hw, &clock, &mut sink);

    assert_eq!(hw.digital_state(pins::RELAY_BULB1_GPIO), Some(true));
    assert_eq!(hw.digital_state(pins::RELAY_BULB2_GPIO), Some(false));
    assert_eq!(hw.calls.len(), 3);
}

#[test]
fn bulb_toggles_never_feed_the_learner() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    clock.set(700);
    for _ in 0..6 {
        ctl.handle_line("B1:ON", &mut hw, &clock, &mut sink);
    }

    assert!(sink.events.is_empty());
    assert!(ctl.learner().log(0).unwrap().is_empty());
}

#[test]
fn unknown_bulb_index_is_a_silent_no_op() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line("B7:ON", &mut hw, &clock, &mut sink);
    ctl.handle_line("B0:OFF", &mut hw, &clock, &mut sink);

    assert!(hw.calls.is_empty(), "no relay mapped, nothing driven");
    assert!(sink.events.is_empty());

    // The channel keeps working afterwards.
    ctl.handle_line("B1:ON", &mut hw, &clock, &mut sink);
    assert_eq!(hw.digital_state(pins::RELAY_BULB1_GPIO), Some(true));
}

#[test]
fn fan_speed_is_clamped_onto_the_pwm_channel() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line("FAN:PWM:128", &mut hw, &clock, &mut sink);
    assert_eq!(hw.pwm_duty(pins::FAN_PWM_CHANNEL), Some(128));

    ctl.handle_line("FAN:PWM:300", &mut hw, &clock, &mut sink);
    assert_eq!(hw.pwm_duty(pins::FAN_PWM_CHANNEL), Some(255));

    ctl.handle_line("FAN:PWM:-5", &mut hw, &clock, &mut sink);
    assert_eq!(hw.pwm_duty(pins::FAN_PWM_CHANNEL), Some(0));
}

#[test]
fn pwm_commands_never_feed_the_learner() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    clock.set(1110);
    for _ in 0..5 {
        ctl.handle_line("FAN:PWM:200", &mut hw, &clock, &mut sink);
    }

    assert!(sink.events.is_empty());
    assert!(ctl.learner().log(0).unwrap().is_empty());
}

// ── Seeding via SIMLOG ────────────────────────────────────────

#[test]
fn simlog_batch_seeds_and_suggests_in_one_line() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line(
        "SIMLOG:0:18:30,18:32,18:28,18:31",
        &mut hw,
        &clock,
        &mut sink,
    );

    // Fourth seeded sample qualifies the window mid-line; dispatch runs
    // to completion before the caller sees anything.
    assert_eq!(sink.lines(), vec!["SUGGEST:0:1110"]);
    assert!(hw.calls.is_empty(), "seeding never actuates");
}

#[test]
fn simlog_skips_malformed_tokens_individually() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line(
        "SIMLOG:0:bad,19:05,25:00,19:06,19:04,19:05",
        &mut hw,
        &clock,
        &mut sink,
    );

    // `bad` and `25:00` are dropped; the four valid times qualify.
    assert_eq!(sink.lines(), vec!["SUGGEST:0:1145"]);
    let log = ctl.learner().log(0).unwrap();
    assert_eq!(log.len(), 4);
}

#[test]
fn simlog_for_unknown_appliance_changes_nothing() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line("SIMLOG:9:10:00,10:01,10:02,10:03", &mut hw, &clock, &mut sink);

    assert!(sink.events.is_empty());
    assert!(hw.calls.is_empty());
}

#[test]
fn seeded_history_completes_with_live_toggles() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    // Three seeded evenings, then the user flips the switch for real.
    ctl.handle_line("SIMLOG:0:18:30,18:32,18:28", &mut hw, &clock, &mut sink);
    assert!(sink.events.is_empty());

    clock.set(1111);
    ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);

    assert_eq!(sink.lines(), vec!["SUGGEST:0:1110"]);
    assert_eq!(hw.digital_state(pins::RELAY_FAN_GPIO), Some(true));
}

// ── Suggestion acceptance ─────────────────────────────────────

#[test]
fn accepting_a_suggestion_echoes_back() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line("SUGGEST:ACCEPT:2", &mut hw, &clock, &mut sink);

    assert_eq!(sink.events, vec![AppEvent::SuggestionAccepted { appliance: 2 }]);
    assert_eq!(sink.lines(), vec!["SUGGEST_ACCEPTED:2"]);
    assert!(hw.calls.is_empty());
}

#[test]
fn acceptance_leaves_the_learner_window_alone() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    clock.set(1110);
    for _ in 0..4 {
        ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);
    }
    let before = ctl.learner().log(0).unwrap().len();

    ctl.handle_line("SUGGEST:ACCEPT:0", &mut hw, &clock, &mut sink);
    assert_eq!(ctl.learner().log(0).unwrap().len(), before);
}

// ── Hostile / malformed traffic ───────────────────────────────

#[test]
fn garbage_lines_leave_no_trace() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    for line in [
        "",
        "   ",
        "HELLO",
        "FAN:",
        "FAN:PWM",
        "fan:on",
        "B1:on",
        "SIMLOG:0",
        "SUGGEST:ACCEPT",
        "FAN:ON:EXTRA",
        "::::",
    ] {
        ctl.handle_line(line, &mut hw, &clock, &mut sink);
    }

    assert!(hw.calls.is_empty());
    assert!(sink.events.is_empty());
    assert_eq!(ctl.commands_handled(), 0);

    // Still fully operational afterwards.
    ctl.handle_line("FAN:ON", &mut hw, &clock, &mut sink);
    assert_eq!(ctl.commands_handled(), 1);
    assert_eq!(hw.digital_state(pins::RELAY_FAN_GPIO), Some(true));
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let (mut ctl, mut hw, clock, mut sink) = make_controller();

    ctl.handle_line("  FAN:PWM:90 \r\n", &mut hw, &clock, &mut sink);
    assert_eq!(hw.pwm_duty(pins::FAN_PWM_CHANNEL), Some(90));
}
