//! Controller — the hexagonal core.
//!
//! Owns the [`UsageLearner`] and turns one inbound channel line into
//! relay/PWM actuation, learner ingestion, and outbound events.
//!
//! ```text
//!   ClockPort ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                 │      Controller       │
//! ActuatorPort ◀──│  parse · dispatch ·   │
//!                 │  learn · suggest      │
//!                 └──────────────────────┘
//! ```
//!
//! Dispatch is strictly run-to-completion: a line is fully processed —
//! including every nested `SIMLOG` ingest/evaluate/notify cycle — before
//! [`handle_line`](Controller::handle_line) returns, and the caller hands
//! over lines one at a time.  Nothing here blocks or yields.

use log::{debug, info};

use crate::adaptive::{MinuteOfDay, UsageLearner};
use crate::pins;
use crate::proto;

use super::commands::Command;
use super::events::AppEvent;
use super::ports::{ActuatorPort, ClockPort, EventSink};

/// Learner slot wired to the fan relay.  Bulbs do not feed the learner;
/// further slots are reserved for future relay channels.
pub const FAN_APPLIANCE: u16 = 0;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// The application controller orchestrates all domain logic.
pub struct Controller {
    learner: UsageLearner,
    commands_handled: u64,
}

impl Controller {
    /// Construct the controller around an injected learner table.
    pub fn new(learner: UsageLearner) -> Self {
        Self {
            learner,
            commands_handled: 0,
        }
    }

    /// Decode and dispatch one inbound line.
    ///
    /// Unrecognised or empty input is a no-op, never an error — this
    /// channel faces hand-typed and third-party traffic.
    pub fn handle_line(
        &mut self,
        line: &str,
        hw: &mut impl ActuatorPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let Some(command) = proto::parse_line(line) else {
            if !line.trim().is_empty() {
                debug!("channel: ignoring unrecognised line {:?}", line.trim());
            }
            return;
        };
        self.handle_command(command, hw, clock, sink);
    }

    /// Dispatch one already-decoded command.
    pub fn handle_command(
        &mut self,
        command: Command<'_>,
        hw: &mut impl ActuatorPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        self.commands_handled += 1;

        match command {
            Command::SetBulb { index, on } => match pins::bulb_gpio(index) {
                Some(gpio) => {
                    hw.set_digital(gpio, on);
                    info!("bulb {}: {}", index, if on { "on" } else { "off" });
                }
                None => debug!("no relay for bulb {}", index),
            },

            Command::SetFan { on } => {
                // Actuate first, then learn; the toggle must take effect
                // even if the sample lands on a full window.
                hw.set_digital(pins::RELAY_FAN_GPIO, on);
                info!("fan relay: {}", if on { "on" } else { "off" });
                let minute = clock.minute_of_day();
                self.ingest_and_notify(FAN_APPLIANCE, minute, sink);
            }

            Command::SetFanSpeed { level } => {
                hw.set_pwm(pins::FAN_PWM_CHANNEL, level);
                info!("fan pwm: duty {}", level);
            }

            Command::SeedLog { appliance, times } => {
                for minute in times.minutes() {
                    self.ingest_and_notify(appliance, minute, sink);
                }
            }

            Command::AcceptSuggestion { appliance } => {
                // Acknowledge only — the companion app owns rule storage,
                // so acceptance changes no learner or schedule state here.
                info!("suggestion accepted for appliance {}", appliance);
                sink.emit(&AppEvent::SuggestionAccepted { appliance });
            }
        }
    }

    /// One full learner cycle for a manual-toggle sample: ingest,
    /// re-evaluate, and notify if the window now qualifies.
    fn ingest_and_notify(
        &mut self,
        appliance: u16,
        minute: MinuteOfDay,
        sink: &mut impl EventSink,
    ) {
        if let Some(suggestion) = self.learner.ingest(appliance, minute) {
            info!(
                "suggestion: appliance {} habitually toggled around minute {}",
                suggestion.appliance, suggestion.minute
            );
            sink.emit(&AppEvent::SuggestionReady {
                appliance: suggestion.appliance,
                minute: suggestion.minute,
            });
        }
    }

    /// Read-only view of the learner (diagnostics, tests).
    pub fn learner(&self) -> &UsageLearner {
        &self.learner
    }

    /// Commands dispatched since boot (decoded lines only).
    pub fn commands_handled(&self) -> u64 {
        self.commands_handled
    }
}
