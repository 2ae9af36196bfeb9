//! Inbound commands to the controller.
//!
//! Typed decodings of one channel line, produced by
//! [`proto::parse_line`](crate::proto::parse_line) and dispatched by the
//! [`Controller`](super::service::Controller).  Borrowing the `SIMLOG`
//! time list from the input keeps seed batches allocation-free however
//! long they are.

use crate::proto::TimeList;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Switch a numbered bulb relay (1-based index from `B<k>`).
    SetBulb { index: u16, on: bool },

    /// Switch the fan relay.  Manual fan toggles feed the usage learner.
    SetFan { on: bool },

    /// Drive the fan PWM output (duty already clamped to 0–255).
    SetFanSpeed { level: u8 },

    /// Seed an appliance's usage window with historical toggle times.
    SeedLog { appliance: u16, times: TimeList<'a> },

    /// Acknowledge a previously proposed automation rule.
    AcceptSuggestion { appliance: u16 },
}
