//! Adaptive usage learner.
//!
//! Watches when each appliance is toggled by hand and, once the recent
//! toggle times form a tight daily cluster, proposes automating that
//! appliance at the habitual time.
//!
//! ```text
//!   ingest(appliance, minute)
//!        │ record into per-appliance window (oldest overwritten)
//!        ▼
//!   evaluate(appliance)           count ≥ 4  AND  max−min < 60 min
//!        │                                        │
//!        ▼                                        ▼
//!      None                          Suggestion { appliance, median }
//! ```
//!
//! Every sample is a minute-of-day (`0..1440`), enforced by construction
//! through [`MinuteOfDay`] — the window can never hold an out-of-day
//! value.  The learner owns the whole table and is injected into the
//! controller; there is no global state.

use log::debug;

/// Appliance slots tracked by the learner.  Slot 0 is the fan; the rest
/// are reserved for future relay channels.
pub const APPLIANCE_SLOTS: usize = 4;
/// Toggle samples retained per appliance before the oldest is dropped.
pub const SAMPLE_WINDOW: usize = 14;
/// Minimum samples before an evaluation can produce a suggestion.
pub const MIN_SAMPLES: usize = 4;
/// Samples must all fall within this spread (minutes) to count as one
/// daily habit.
pub const MAX_RANGE_MINUTES: u16 = 60;
/// Minutes in a day; every sample is strictly below this.
pub const MINUTES_PER_DAY: u16 = 1440;

// ───────────────────────────────────────────────────────────────
// MinuteOfDay
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time as `hour * 60 + minute`, guaranteed `0..1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    /// 00:00 — also the fallback when the wall clock is unavailable.
    pub const MIDNIGHT: Self = Self(0);

    /// `None` when `minute` is past 23:59.
    pub const fn new(minute: u16) -> Option<Self> {
        if minute < MINUTES_PER_DAY {
            Some(Self(minute))
        } else {
            None
        }
    }

    /// Build from an hour/minute pair.  Wide arguments so permissively
    /// parsed values can be range-checked here instead of at every caller.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        let total = hour.checked_mul(60)?.checked_add(minute)?;
        if total < u32::from(MINUTES_PER_DAY) {
            Some(Self(total as u16))
        } else {
            None
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

// ───────────────────────────────────────────────────────────────
// ToggleLog — one appliance's sample window
// ───────────────────────────────────────────────────────────────

/// Fixed circular window of recent manual-toggle times for one appliance.
///
/// `head` is the next write position; until the window fills, the valid
/// samples are exactly `times[..count]` (head and count advance together),
/// so statistics never read stale slots.
#[derive(Debug, Clone, Copy)]
pub struct ToggleLog {
    times: [u16; SAMPLE_WINDOW],
    head: u8,
    count: u8,
}

impl ToggleLog {
    pub const fn new() -> Self {
        Self {
            times: [0; SAMPLE_WINDOW],
            head: 0,
            count: 0,
        }
    }

    /// Record one sample, overwriting the oldest once the window is full.
    fn record(&mut self, minute: MinuteOfDay) {
        self.times[self.head as usize] = minute.get();
        self.head = (self.head + 1) % SAMPLE_WINDOW as u8;
        if (self.count as usize) < SAMPLE_WINDOW {
            self.count += 1;
        }
    }

    /// Number of valid samples (saturates at [`SAMPLE_WINDOW`]).
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count as usize == SAMPLE_WINDOW
    }

    /// Valid samples in insertion order, oldest first.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = u16> + '_ {
        let start = if self.is_full() { self.head as usize } else { 0 };
        (0..self.len()).map(move |i| self.times[(start + i) % SAMPLE_WINDOW])
    }

    /// Median of the valid samples; the even case takes the truncating
    /// mean of the middle pair.  `None` on an empty window.
    pub fn median(&self) -> Option<u16> {
        if self.is_empty() {
            return None;
        }
        let mut scratch = self.times;
        let used = &mut scratch[..self.len()];
        used.sort_unstable();
        let n = used.len();
        Some(if n % 2 == 1 {
            used[n / 2]
        } else {
            (used[n / 2 - 1] + used[n / 2]) / 2
        })
    }

    /// Spread between the latest and earliest minutes in the window.
    pub fn range(&self) -> Option<u16> {
        if self.is_empty() {
            return None;
        }
        let used = &self.times[..self.len()];
        let mut min = used[0];
        let mut max = used[0];
        for &t in used {
            min = min.min(t);
            max = max.max(t);
        }
        Some(max - min)
    }
}

impl Default for ToggleLog {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// UsageLearner
// ───────────────────────────────────────────────────────────────

/// A proposed automation rule: the appliance is habitually toggled around
/// `minute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub appliance: u16,
    /// Median of the clustered toggle times (minute-of-day).
    pub minute: u16,
}

/// Per-appliance toggle history plus the suggestion policy.
pub struct UsageLearner {
    logs: [ToggleLog; APPLIANCE_SLOTS],
}

impl UsageLearner {
    pub const fn new() -> Self {
        Self {
            logs: [ToggleLog::new(); APPLIANCE_SLOTS],
        }
    }

    /// Record a manual toggle and re-evaluate that appliance, synchronously.
    ///
    /// Unknown appliance ids are a silent no-op — the window stays
    /// untouched and no suggestion is produced.
    pub fn ingest(&mut self, appliance: u16, minute: MinuteOfDay) -> Option<Suggestion> {
        let Some(log) = self.logs.get_mut(appliance as usize) else {
            debug!("learner: dropping sample for unknown appliance {}", appliance);
            return None;
        };
        log.record(minute);
        self.persist(appliance);
        self.evaluate(appliance)
    }

    /// Run the suggestion policy over one appliance's window: at least
    /// [`MIN_SAMPLES`] samples, all within [`MAX_RANGE_MINUTES`] of each
    /// other.  Read-only; never mutates the window.
    pub fn evaluate(&self, appliance: u16) -> Option<Suggestion> {
        let log = self.logs.get(appliance as usize)?;
        if log.len() < MIN_SAMPLES {
            return None;
        }
        let median = log.median()?;
        let range = log.range()?;
        if range < MAX_RANGE_MINUTES {
            Some(Suggestion { appliance, minute: median })
        } else {
            None
        }
    }

    /// Read-only view of one appliance's window.
    pub fn log(&self, appliance: u16) -> Option<&ToggleLog> {
        self.logs.get(appliance as usize)
    }

    /// Flush one appliance's window to persistent storage.
    ///
    /// Currently a no-op: windows are rebuilt from live toggles after a
    /// power cycle, and the `SIMLOG` command exists to reseed them.
    /// TODO: persist each window as a per-appliance NVS blob so learned
    /// habits survive reboots.
    fn persist(&self, _appliance: u16) {}
}

impl Default for UsageLearner {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
