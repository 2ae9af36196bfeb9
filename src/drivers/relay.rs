//! Appliance relay driver (opto-isolated relay board, active HIGH).
//!
//! One instance per mains channel (bulbs, fan switch).  The relay is a
//! dumb latch: it mirrors the last commanded state and nothing else.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct Relay {
    gpio: i32,
    on: bool,
}

impl Relay {
    /// Relays boot de-energized; `hw_init` drives every output LOW
    /// before the command loop starts, so the latch starts at `false`.
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
