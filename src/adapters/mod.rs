//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to              |
//! |------------|--------------|--------------------------|
//! | `ble`      | EventSink    | Bluedroid GATT server    |
//! | `hardware` | ActuatorPort | ESP32 GPIO, LEDC PWM     |
//! | `nvs`      | ConfigPort   | NVS / in-memory store    |
//! | `time`     | ClockPort    | ESP32 system clock       |

pub mod ble;
pub mod hardware;
pub mod nvs;
pub mod time;
