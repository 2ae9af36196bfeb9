//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (relays, PWM, wall clock, BLE notify, NVS) implement
//! these traits.  The [`Controller`](super::service::Controller) consumes
//! them via generics at the call sites, so the domain core never touches
//! hardware directly and the whole command path runs on the host under
//! mock adapters.

use crate::adaptive::MinuteOfDay;
use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command outputs.
///
/// Calls are fire-and-forget — register writes on this board cannot fail,
/// and host implementations latch the requested state instead.
pub trait ActuatorPort {
    /// Drive one digital output pin.
    fn set_digital(&mut self, gpio: i32, on: bool);

    /// Drive one LEDC channel with an 8-bit duty.
    fn set_pwm(&mut self, channel: u32, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time for stamping manual toggles.
pub trait ClockPort {
    fn minute_of_day(&self) -> MinuteOfDay;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → channel / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (BLE notify
/// characteristic, serial log, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting and
/// reject invalid ranges with [`ConfigError::ValidationFailed`] rather
/// than silently clamping — a misbehaving channel peer must not be able
/// to store an unusable advertising name or PWM frequency.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
