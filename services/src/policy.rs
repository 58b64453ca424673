use chrono::{DateTime, Duration, Utc};
use db::models::{Session, attendance_record::AttendanceStatus};
use util::clock::{CIVIL_TZ, local_instant};
use util::config::AppConfig;

/// Tunable windows used by the engines.
#[derive(Debug, Clone)]
pub struct AttendancePolicy {
    /// How long a freshly generated code stays redeemable.
    pub code_validity: Duration,
    /// Submissions up to this long after session start count as present.
    pub present_grace: Duration,
    /// Submissions up to this long after session start count as late.
    pub late_cutoff: Duration,
    pub store_timeout: std::time::Duration,
    pub bulk_timeout: std::time::Duration,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            code_validity: Duration::minutes(120),
            present_grace: Duration::minutes(15),
            late_cutoff: Duration::minutes(90),
            store_timeout: std::time::Duration::from_secs(10),
            bulk_timeout: std::time::Duration::from_secs(30),
        }
    }
}

impl AttendancePolicy {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            code_validity: Duration::minutes(cfg.code_validity_minutes),
            present_grace: Duration::minutes(cfg.present_grace_minutes),
            late_cutoff: Duration::minutes(cfg.late_cutoff_minutes),
            store_timeout: std::time::Duration::from_secs(cfg.store_timeout_secs),
            bulk_timeout: std::time::Duration::from_secs(cfg.bulk_timeout_secs),
        }
    }

    /// Start of `session` on the civil day containing `now`.
    pub fn session_start(&self, session: Session, now: DateTime<Utc>) -> DateTime<Utc> {
        let day = now.with_timezone(&CIVIL_TZ).date_naive();
        let midnight = local_instant(day, chrono::NaiveTime::MIN).unwrap_or(now);
        midnight + Duration::minutes(session.starts_at_minute())
    }

    /// Status of a self-submission made at `now`.
    ///
    /// Both window edges are inclusive: exactly `present_grace` after the
    /// start is still present, exactly `late_cutoff` after is still late.
    pub fn classify(&self, session: Session, now: DateTime<Utc>) -> AttendanceStatus {
        let elapsed = now - self.session_start(session, now);
        if elapsed <= self.present_grace {
            AttendanceStatus::Present
        } else if elapsed <= self.late_cutoff {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Absent
        }
    }
}
