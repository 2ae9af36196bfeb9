//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the relay bank and the fan PWM driver, exposing them through
//! [`ActuatorPort`].  This is the only module in the system that drives
//! actual outputs.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use log::debug;

use crate::app::ports::ActuatorPort;
use crate::drivers::fan::FanPwm;
use crate::drivers::relay::Relay;
use crate::pins;

/// Concrete adapter that combines all actuators behind port traits.
pub struct HardwareAdapter {
    relays: [Relay; 3],
    fan: FanPwm,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            relays: [
                Relay::new(pins::RELAY_BULB1_GPIO),
                Relay::new(pins::RELAY_BULB2_GPIO),
                Relay::new(pins::RELAY_FAN_GPIO),
            ],
            fan: FanPwm::new(pins::FAN_PWM_CHANNEL),
        }
    }

    /// Latched state of the relay on `gpio`, if one is mapped there.
    pub fn relay_state(&self, gpio: i32) -> Option<bool> {
        self.relays
            .iter()
            .find(|relay| relay.gpio() == gpio)
            .map(Relay::is_on)
    }

    /// Latched fan PWM duty.
    pub fn fan_duty(&self) -> u8 {
        self.fan.duty()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_digital(&mut self, gpio: i32, on: bool) {
        match self.relays.iter_mut().find(|relay| relay.gpio() == gpio) {
            Some(relay) => relay.set(on),
            None => debug!("hardware: no relay mapped to GPIO{}", gpio),
        }
    }

    fn set_pwm(&mut self, channel: u32, duty: u8) {
        if channel == self.fan.channel() {
            self.fan.set_duty(duty);
        } else {
            debug!("hardware: no PWM driver on LEDC CH{}", channel);
        }
    }
}
