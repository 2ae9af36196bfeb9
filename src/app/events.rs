//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — today that is the BLE notify
//! characteristic, rendered via [`proto::encode`](crate::proto::encode).

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The learner found a tight daily habit; propose automating the
    /// appliance at the clustered median minute.
    SuggestionReady { appliance: u16, minute: u16 },

    /// Echo for an accepted suggestion.  No schedule is written yet; the
    /// companion app owns rule storage for now.
    SuggestionAccepted { appliance: u16 },
}
