//! Mock adapters for integration tests.
//!
//! Record every actuator call and emitted event so tests can assert on
//! the full dispatch history without touching real GPIO/PWM registers.

use std::cell::Cell;

use smartsync::adaptive::MinuteOfDay;
use smartsync::app::events::AppEvent;
use smartsync::app::ports::{ActuatorPort, ClockPort, EventSink};
use smartsync::proto;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetDigital { gpio: i32, on: bool },
    SetPwm { channel: u32, duty: u8 },
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    /// Latest commanded level of a digital output, if it was ever driven.
    pub fn digital_state(&self, gpio: i32) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::SetDigital { gpio: g, on } if *g == gpio => Some(*on),
            _ => None,
        })
    }

    /// Latest commanded duty of a PWM channel, if it was ever driven.
    pub fn pwm_duty(&self, channel: u32) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::SetPwm { channel: ch, duty } if *ch == channel => Some(*duty),
            _ => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn set_digital(&mut self, gpio: i32, on: bool) {
        self.calls.push(ActuatorCall::SetDigital { gpio, on });
    }

    fn set_pwm(&mut self, channel: u32, duty: u8) {
        self.calls.push(ActuatorCall::SetPwm { channel, duty });
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Settable wall clock; tests move time between commands.
pub struct MockClock {
    minute: Cell<u16>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(minute: u16) -> Self {
        Self {
            minute: Cell::new(minute),
        }
    }

    pub fn set(&self, minute: u16) {
        self.minute.set(minute);
    }
}

impl ClockPort for MockClock {
    fn minute_of_day(&self) -> MinuteOfDay {
        MinuteOfDay::new(self.minute.get()).expect("test minute must be in 0..1440")
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Captures emitted events both as typed values and as wire notices.
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events rendered exactly as the channel would notify them.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| proto::encode(e).as_str().to_owned())
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
