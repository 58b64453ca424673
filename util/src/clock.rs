//! Civil-time provider.
//!
//! Every "now" and "today" used by the attendance engines comes from a [`Clock`].
//! Instants are UTC; calendar days are evaluated in [`CIVIL_TZ`] so that a
//! submission at 06:30 Bangkok time never lands on the previous UTC day.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::RwLock;

/// The fixed civil timezone all date comparisons are made in.
pub const CIVIL_TZ: Tz = chrono_tz::Asia::Bangkok;

pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current instant expressed in the civil timezone.
    fn local_now(&self) -> DateTime<Tz> {
        self.now().with_timezone(&CIVIL_TZ)
    }

    /// Current calendar day in the civil timezone.
    fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }
}

/// Wall-clock implementation used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    at: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at: RwLock::new(at) }
    }

    /// Pins the clock to a civil-time wall reading, e.g. `(2025-03-10, 09:12)`.
    pub fn at_local(date: NaiveDate, time: NaiveTime) -> Self {
        Self::new(local_instant(date, time).unwrap_or_else(Utc::now))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut guard) = self.at.write() {
            *guard = at;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.at.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.at.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Converts a civil date and wall time into a UTC instant.
///
/// Returns `None` only for wall times that do not exist in [`CIVIL_TZ`].
pub fn local_instant(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    CIVIL_TZ
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// RFC 3339 rendering of an instant in [`CIVIL_TZ`], to the second.
pub fn civil_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&CIVIL_TZ)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parses a `YYYY-MM-DD` calendar day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
