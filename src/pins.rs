//! GPIO / peripheral pin assignments for the SmartSync control board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Appliance relays (active HIGH, opto-isolated relay board)
// ---------------------------------------------------------------------------

/// Relay output: bulb 1 (command `B1:ON` / `B1:OFF`).
pub const RELAY_BULB1_GPIO: i32 = 16;
/// Relay output: bulb 2 (command `B2:ON` / `B2:OFF`).
pub const RELAY_BULB2_GPIO: i32 = 17;
/// Relay output: fan mains switch (command `FAN:ON` / `FAN:OFF`).
pub const RELAY_FAN_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Fan speed (LEDC PWM)
// ---------------------------------------------------------------------------

/// PWM output driving the fan speed controller.
pub const FAN_PWM_GPIO: i32 = 19;
/// LEDC channel assigned to the fan PWM output.
pub const FAN_PWM_CHANNEL: u32 = 0;
/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// Default LEDC base frequency for the fan (config can override).
pub const FAN_PWM_FREQ_HZ: u32 = 5_000;

// ---------------------------------------------------------------------------
// Sensors / indicators
// ---------------------------------------------------------------------------

/// PIR motion sensor — digital input, HIGH on motion.
pub const PIR_GPIO: i32 = 4;
/// Piezo buzzer — digital output, active HIGH.
pub const BUZZER_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Bulb index → relay mapping
// ---------------------------------------------------------------------------

/// Relay GPIO for bulb `index` (1-based, matching the `B<k>` command
/// family).  `None` for indices with no relay on this board.
pub const fn bulb_gpio(index: u16) -> Option<i32> {
    match index {
        1 => Some(RELAY_BULB1_GPIO),
        2 => Some(RELAY_BULB2_GPIO),
        _ => None,
    }
}
