//! System configuration parameters
//!
//! Tunable parameters for the SmartSync control unit.  Values can be
//! overridden via NVS (non-volatile storage); everything else about the
//! board lives in [`pins`](crate::pins) as compile-time constants.

use serde::{Deserialize, Serialize};

/// Factory-default BLE advertising name.
pub const DEFAULT_DEVICE_NAME: &str = "SmartSync";

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// BLE advertising / GAP device name (1–24 printable ASCII bytes).
    pub device_name: heapless::String<24>,
    /// LEDC base frequency for the fan PWM output (Hz).
    pub fan_pwm_freq_hz: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        let _ = device_name.push_str(DEFAULT_DEVICE_NAME);
        Self {
            device_name,
            fan_pwm_freq_hz: crate::pins::FAN_PWM_FREQ_HZ,
        }
    }
}
