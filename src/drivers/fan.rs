//! Fan speed driver (LEDC PWM).
//!
//! Drives the fan speed controller with an 8-bit duty cycle on a
//! dedicated LEDC channel.  Duty 0 parks the fan controller; the mains
//! relay is a separate channel handled by [`crate::drivers::relay`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the real LEDC duty via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct FanPwm {
    channel: u32,
    duty: u8,
}

impl FanPwm {
    /// The LEDC channel comes up at duty 0 from `hw_init`, so the
    /// latch starts at 0.
    pub fn new(channel: u32) -> Self {
        Self { channel, duty: 0 }
    }

    pub fn set_duty(&mut self, duty: u8) {
        hw_init::ledc_set(self.channel, duty);
        self.duty = duty;
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }
}
