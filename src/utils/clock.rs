// src/utils/clock.rs
use chrono::{DateTime, Duration, Timelike, Utc};
use std::sync::Arc;

/// Deployment timezone offset from UTC, in minutes. IST (+05:30).
pub const IST_OFFSET_MINUTES: i32 = 330;

/// Wall-clock hour at the given UTC instant for a fixed-offset timezone.
pub fn hour_at_offset(instant: DateTime<Utc>, offset_minutes: i32) -> u32 {
    (instant + Duration::minutes(offset_minutes as i64)).hour()
}

/// Single source of "current instant" for the whole crate.
///
/// Fare night-surcharge and shift duration both depend on wall-clock time,
/// so services take a clock instead of calling `Utc::now()` inline. Tests
/// swap in a `FixedClock`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local wall-clock hour used for the night-surcharge window. Instants
    /// are stored in UTC; only this presentation of them is local.
    fn local_hour(&self) -> u32;
}

pub type SharedClock = Arc<dyn Clock>;

/// Production clock backed by the system time, localized by a fixed
/// offset from UTC.
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset_minutes: i32,
}

impl SystemClock {
    pub fn new(offset_minutes: i32) -> Self {
        Self { offset_minutes }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(IST_OFFSET_MINUTES)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        hour_at_offset(self.now(), self.offset_minutes)
    }
}

/// Test clock pinned to a controllable instant. The instant is taken as
/// local wall time, so `at_hour(23)` is inside the night window.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<std::sync::Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(std::sync::Mutex::new(instant)),
        }
    }

    /// Convenience: a fixed clock at the given hour on an arbitrary day.
    pub fn at_hour(hour: u32) -> Self {
        use chrono::TimeZone;
        Self::new(Utc.with_ymd_and_hms(2025, 6, 15, hour, 0, 0).unwrap())
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut instant = self.instant.lock().unwrap();
        *instant = *instant + duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap()
    }

    fn local_hour(&self) -> u32 {
        self.now().hour()
    }
}
