//! ESP32 clock adapter.
//!
//! Supplies local wall-clock minutes for stamping manual appliance
//! toggles.
//!
//! - **`target_os = "espidf"`** — reads `gettimeofday()` and converts
//!   through `localtime_r()`, so the minute respects the device timezone.
//! - **`not(target_os = "espidf")`** — derives the minute from the host
//!   UNIX epoch for simulation runs (tests inject their own clock).
//!
//! Before SNTP or the companion app has set the RTC the wall clock is
//! meaningless; queries then fall back to midnight rather than feeding
//! boot-relative garbage into the usage learner.

use log::debug;

use crate::adaptive::MinuteOfDay;
use crate::app::ports::ClockPort;

/// Clock adapter for the ESP32 platform.
pub struct Esp32ClockAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::SystemTime,
}

impl Default for Esp32ClockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32ClockAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::SystemTime::now(),
        }
    }

    /// Seconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_secs(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000
    }

    /// Seconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_secs(&self) -> u64 {
        self.start
            .elapsed()
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }

    /// Local minute-of-day from the system clock. `None` if the wall
    /// clock is not synced yet (e.g. pre-NTP).
    #[cfg(target_os = "espidf")]
    fn wall_clock_minute(&self) -> Option<MinuteOfDay> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        // Reject obviously unsynced time (e.g. before 2020-01-01)
        const EPOCH_2020: i64 = 1_577_836_800;
        if tv.tv_sec < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        MinuteOfDay::from_hm(tm.tm_hour.max(0) as u32, tm.tm_min.max(0) as u32)
    }

    /// Minute-of-day derived from the host UNIX epoch (UTC).
    #[cfg(not(target_os = "espidf"))]
    fn wall_clock_minute(&self) -> Option<MinuteOfDay> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs();
        MinuteOfDay::new(((secs / 60) % 1440) as u16)
    }
}

impl ClockPort for Esp32ClockAdapter {
    fn minute_of_day(&self) -> MinuteOfDay {
        match self.wall_clock_minute() {
            Some(minute) => minute,
            None => {
                debug!("clock: wall clock unsynced, reporting midnight");
                MinuteOfDay::MIDNIGHT
            }
        }
    }
}
