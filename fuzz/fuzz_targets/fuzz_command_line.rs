//! Fuzz target: command line parse + dispatch
//!
//! Drives arbitrary byte sequences through `parse_line` and the full
//! controller dispatch path and asserts the channel contract:
//! - Garbage never panics (unrecognised input is a silent no-op)
//! - The controller only ever drives mapped GPIOs / the fan LEDC channel
//! - Every emitted event encodes into the fixed notice buffer
//!
//! cargo fuzz run fuzz_command_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartsync::adaptive::{MinuteOfDay, UsageLearner};
use smartsync::app::events::AppEvent;
use smartsync::app::ports::{ActuatorPort, ClockPort, EventSink};
use smartsync::app::service::Controller;
use smartsync::{pins, proto};

struct MappedOutputsOnly;

impl ActuatorPort for MappedOutputsOnly {
    fn set_digital(&mut self, gpio: i32, _on: bool) {
        assert!(
            gpio == pins::RELAY_BULB1_GPIO
                || gpio == pins::RELAY_BULB2_GPIO
                || gpio == pins::RELAY_FAN_GPIO,
            "dispatch drove unmapped GPIO{gpio}"
        );
    }

    fn set_pwm(&mut self, channel: u32, _duty: u8) {
        assert_eq!(channel, pins::FAN_PWM_CHANNEL, "dispatch drove unmapped LEDC channel");
    }
}

struct FixedClock(MinuteOfDay);

impl ClockPort for FixedClock {
    fn minute_of_day(&self) -> MinuteOfDay {
        self.0
    }
}

struct EncodeCheck;

impl EventSink for EncodeCheck {
    fn emit(&mut self, event: &AppEvent) {
        let notice = proto::encode(event);
        assert!(!notice.is_empty(), "event encoded to an empty notice");
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    // Parsing alone must be total.
    let _ = proto::parse_line(line);

    // Full dispatch must be panic-free and respect the port contracts.
    let minute = MinuteOfDay::new((data.len() % 1440) as u16)
        .unwrap_or(MinuteOfDay::MIDNIGHT);
    let mut controller = Controller::new(UsageLearner::new());
    let mut hw = MappedOutputsOnly;
    let clock = FixedClock(minute);
    let mut sink = EncodeCheck;

    controller.handle_line(line, &mut hw, &clock, &mut sink);
});
