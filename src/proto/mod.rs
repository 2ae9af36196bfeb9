//! SmartSync line protocol.
//!
//! One inbound line is one command; outbound notices are single
//! colon-separated ASCII lines.  Lines are matched case-sensitively after
//! trimming surrounding whitespace.
//!
//! ## Inbound
//!
//! | Line                    | Decodes to                                  |
//! |-------------------------|---------------------------------------------|
//! | `B<k>:ON` / `B<k>:OFF`  | [`Command::SetBulb`]                        |
//! | `FAN:ON` / `FAN:OFF`    | [`Command::SetFan`]                         |
//! | `FAN:PWM:<int>`         | [`Command::SetFanSpeed`] (clamped 0–255)    |
//! | `SIMLOG:<id>:<list>`    | [`Command::SeedLog`] (`list = HH:MM[,…]`)   |
//! | `SUGGEST:ACCEPT:<id>`   | [`Command::AcceptSuggestion`]               |
//!
//! Anything else decodes to `None` and is dropped by the controller —
//! malformed input is never an error on this channel.
//!
//! ## Outbound
//!
//! | Line                    | Meaning                                     |
//! |-------------------------|---------------------------------------------|
//! | `SUGGEST:<id>:<minute>` | habit detected; propose automating          |
//! | `SUGGEST_ACCEPTED:<id>` | acknowledgement echo for an accepted rule   |
//!
//! Integer fields parse permissively in the embedded tradition: leading
//! whitespace and sign accepted, digits consumed up to the first
//! non-digit, no digits at all reads as zero.

use core::fmt::Write;

use log::debug;

use crate::adaptive::MinuteOfDay;
use crate::app::commands::Command;
use crate::app::events::AppEvent;

/// Longest outbound notice (`SUGGEST_ACCEPTED:65535` is 22 bytes).
pub const MAX_NOTICE_BYTES: usize = 24;

/// One rendered outbound notice line.
pub type Notice = heapless::String<MAX_NOTICE_BYTES>;

// ───────────────────────────────────────────────────────────────
// Decoding
// ───────────────────────────────────────────────────────────────

/// Decode one inbound line.  Total over arbitrary input; `None` means the
/// line carries no recognised command.
pub fn parse_line(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('B') {
        if let Some(index) = rest.strip_suffix(":ON") {
            return Some(Command::SetBulb { index: lenient_id(index), on: true });
        }
        if let Some(index) = rest.strip_suffix(":OFF") {
            return Some(Command::SetBulb { index: lenient_id(index), on: false });
        }
    }

    match line {
        "FAN:ON" => return Some(Command::SetFan { on: true }),
        "FAN:OFF" => return Some(Command::SetFan { on: false }),
        _ => {}
    }

    if let Some(rest) = line.strip_prefix("FAN:PWM:") {
        let level = leading_i32(rest).unwrap_or(0).clamp(0, 255) as u8;
        return Some(Command::SetFanSpeed { level });
    }

    if let Some(rest) = line.strip_prefix("SIMLOG:") {
        // Needs both the id section and the (possibly empty) time list.
        let (id, times) = rest.split_once(':')?;
        return Some(Command::SeedLog {
            appliance: lenient_id(id),
            times: TimeList::new(times),
        });
    }

    if let Some(id) = line.strip_prefix("SUGGEST:ACCEPT:") {
        return Some(Command::AcceptSuggestion { appliance: lenient_id(id) });
    }

    None
}

// ───────────────────────────────────────────────────────────────
// Time lists
// ───────────────────────────────────────────────────────────────

/// Lazily parsed `HH:MM[,HH:MM…]` list carried by [`Command::SeedLog`].
///
/// Tokens are yielded in list order.  A token without a colon past its
/// first character, or whose computed minute falls outside the day, is
/// skipped — one bad entry never poisons the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeList<'a>(&'a str);

impl<'a> TimeList<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    /// Minute-of-day for every well-formed token, in list order.
    pub fn minutes(&self) -> impl Iterator<Item = MinuteOfDay> + 'a {
        self.0.split(',').filter_map(|token| {
            let minute = token_minute(token);
            if minute.is_none() && !token.trim().is_empty() {
                debug!("simlog: skipping malformed time token {:?}", token);
            }
            minute
        })
    }
}

/// Parse one `HH:MM` token.  The hour part runs up to the first colon;
/// both parts parse permissively, so `19:05:30` reads as 19:05.
fn token_minute(token: &str) -> Option<MinuteOfDay> {
    let token = token.trim();
    let colon = token.find(':')?;
    if colon == 0 {
        return None;
    }
    let (hh, mm) = token.split_at(colon);
    let hour = leading_i32(hh).unwrap_or(0);
    let minute = leading_i32(&mm[1..]).unwrap_or(0);
    if hour < 0 || minute < 0 {
        return None;
    }
    MinuteOfDay::from_hm(hour as u32, minute as u32)
}

// ───────────────────────────────────────────────────────────────
// Lenient integers
// ───────────────────────────────────────────────────────────────

/// Leading-integer parse: optional whitespace, optional sign, then digits
/// up to the first non-digit.  `None` when no digits are present, which
/// command fields read as zero.  Saturates instead of overflowing.
fn leading_i32(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let mut value: i32 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value.saturating_mul(10).saturating_add(i32::from(b - b'0'));
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Permissive appliance-id parse.  Unparseable fragments read as id 0;
/// values outside `u16` (negatives included) saturate to `u16::MAX`,
/// which no appliance table contains.
fn lenient_id(s: &str) -> u16 {
    match leading_i32(s) {
        None => 0,
        Some(v) if v < 0 => u16::MAX,
        Some(v) => v.min(i32::from(u16::MAX)) as u16,
    }
}

// ───────────────────────────────────────────────────────────────
// Encoding
// ───────────────────────────────────────────────────────────────

/// Render one outbound event as its wire line.
pub fn encode(event: &AppEvent) -> Notice {
    let mut line = Notice::new();
    let _ = match event {
        AppEvent::SuggestionReady { appliance, minute } => {
            write!(line, "SUGGEST:{}:{}", appliance, minute)
        }
        AppEvent::SuggestionAccepted { appliance } => {
            write!(line, "SUGGEST_ACCEPTED:{}", appliance)
        }
    };
    line
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
