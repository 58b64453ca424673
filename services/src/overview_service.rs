use crate::context::ServiceContext;
use crate::error::{AttendanceError, AttendanceResult};
use crate::marking_service::window_start;
use chrono::NaiveDate;
use db::models::{
    Session,
    attendance_code,
    attendance_record::{self, AttendanceStatus, RecordFilter},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use util::clock::{Clock, civil_timestamp};

/// Shown in the roster for a session with no record.
pub const NOT_SUBMITTED: &str = "-";

pub const RED_ABSENT_DAYS: u32 = 7;
pub const YELLOW_ABSENT_DAYS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Normal,
    Yellow,
    Red,
}

impl WarningLevel {
    pub fn from_absent_days(days: u32) -> Self {
        if days >= RED_ABSENT_DAYS {
            WarningLevel::Red
        } else if days >= YELLOW_ABSENT_DAYS {
            WarningLevel::Yellow
        } else {
            WarningLevel::Normal
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub late_excused: u32,
    pub absent_excused: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::LateExcused => self.late_excused += 1,
            AttendanceStatus::AbsentExcused => self.absent_excused += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.late + self.absent + self.late_excused + self.absent_excused
    }
}

/// Collapsed per-day outcome tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayTally {
    pub present_days: u32,
    pub absent_days: u32,
}

impl DayTally {
    /// A day is absent if any session was absent, otherwise present if any
    /// session was attended. Days with only excused absences count for neither.
    fn add_day(&mut self, statuses: &[AttendanceStatus]) {
        if statuses.contains(&AttendanceStatus::Absent) {
            self.absent_days += 1;
        } else if statuses.iter().any(|s| s.attended()) {
            self.present_days += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionCell {
    pub status: String,
    pub record_id: Option<i64>,
}

impl SessionCell {
    fn empty() -> Self {
        Self { status: NOT_SUBMITTED.to_owned(), record_id: None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendanceRow {
    pub user_id: i64,
    pub jsd_number: String,
    pub first_name: String,
    pub last_name: String,
    pub morning: SessionCell,
    pub afternoon: SessionCell,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceOverview {
    pub cohort_number: i32,
    pub date: NaiveDate,
    pub session: Option<Session>,
    pub code: Option<String>,
    /// Civil-time RFC 3339, like every other user-facing timestamp.
    pub expires_at: Option<String>,
    pub submitted_count: usize,
    pub students: Vec<StudentAttendanceRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentStats {
    pub user_id: i64,
    pub jsd_number: String,
    pub first_name: String,
    pub last_name: String,
    pub cohort_number: i32,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total_sessions: u32,
    #[serde(flatten)]
    pub days: DayTally,
    pub warning_level: WarningLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total: u32,
}

/// A student's own summary.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSummary {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total_sessions: u32,
    #[serde(flatten)]
    pub days: DayTally,
    pub warning_level: WarningLevel,
}

/// Read-only rosters and statistics over attendance records.
#[derive(Clone)]
pub struct OverviewService {
    ctx: ServiceContext,
}

impl OverviewService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cohort roster for one day with each student's morning and afternoon
    /// outcome. `date` defaults to today.
    pub async fn get_attendance_overview(
        &self,
        cohort_number: i32,
        session: Option<Session>,
        date: Option<NaiveDate>,
    ) -> AttendanceResult<AttendanceOverview> {
        if cohort_number <= 0 {
            return Err(AttendanceError::validation("cohort is required"));
        }
        let today = self.ctx.clock.today();
        let date = date.unwrap_or(today);

        self.ctx
            .bounded("attendance_overview", async {
                let db = &self.ctx.db;

                let active = match session {
                    Some(s) if date == today => {
                        let now = self.ctx.clock.now();
                        attendance_code::Model::find_active(db, cohort_number, s, now).await?
                    }
                    _ => None,
                };

                let filter = RecordFilter::default()
                    .cohort(cohort_number)
                    .on(date)
                    .session(session);
                let records = attendance_record::Model::find_all(db, &filter).await?;

                let mut submitted: HashMap<i64, (SessionCell, SessionCell)> = HashMap::new();
                for r in &records {
                    let cells = submitted
                        .entry(r.user_id)
                        .or_insert_with(|| (SessionCell::empty(), SessionCell::empty()));
                    let cell = SessionCell { status: r.status.to_string(), record_id: Some(r.id) };
                    match r.session {
                        Session::Morning => cells.0 = cell,
                        Session::Afternoon => cells.1 = cell,
                    }
                }

                let roster = self.ctx.users.list_cohort(cohort_number).await?;
                let students = roster
                    .into_iter()
                    .map(|u| {
                        let (morning, afternoon) = submitted
                            .remove(&u.id)
                            .unwrap_or_else(|| (SessionCell::empty(), SessionCell::empty()));
                        StudentAttendanceRow {
                            user_id: u.id,
                            jsd_number: u.jsd_number,
                            first_name: u.first_name,
                            last_name: u.last_name,
                            morning,
                            afternoon,
                        }
                    })
                    .collect();

                Ok::<_, AttendanceError>(AttendanceOverview {
                    cohort_number,
                    date,
                    session,
                    code: active.as_ref().map(|c| c.code.clone()),
                    expires_at: active.map(|c| civil_timestamp(c.expires_at)),
                    submitted_count: records.len(),
                    students,
                })
            })
            .await
    }

    /// Per-student aggregates over live records in `[start, end]`.
    ///
    /// Sorted by absent days, most first, then by user id.
    pub async fn get_attendance_stats(
        &self,
        cohort_number: Option<i32>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AttendanceResult<Vec<StudentStats>> {
        let mut filter = RecordFilter {
            date_from: start,
            date_to: end,
            ..Default::default()
        };
        if let Some(c) = cohort_number.filter(|c| *c > 0) {
            filter = filter.cohort(c);
        }

        self.ctx
            .bounded("attendance_stats", async {
                let records = attendance_record::Model::find_all(&self.ctx.db, &filter).await?;
                Ok::<_, AttendanceError>(aggregate_students(&records))
            })
            .await
    }

    /// [`OverviewService::get_attendance_stats`] over the trailing `days`.
    /// `days <= 0` means all time.
    pub async fn get_attendance_stats_by_days(
        &self,
        cohort_number: Option<i32>,
        days: i64,
    ) -> AttendanceResult<Vec<StudentStats>> {
        let start = window_start(self.ctx.clock.today(), days)?;
        self.get_attendance_stats(cohort_number, start, None).await
    }

    /// Status totals per day over the trailing `days`, oldest day first.
    pub async fn get_daily_attendance_stats(
        &self,
        cohort_number: Option<i32>,
        days: i64,
    ) -> AttendanceResult<Vec<DailyStats>> {
        let mut filter = RecordFilter::default();
        if let Some(c) = cohort_number.filter(|c| *c > 0) {
            filter = filter.cohort(c);
        }
        filter.date_from = window_start(self.ctx.clock.today(), days)?;

        self.ctx
            .bounded("daily_attendance_stats", async {
                let records = attendance_record::Model::find_all(&self.ctx.db, &filter).await?;

                let mut per_day: BTreeMap<NaiveDate, StatusCounts> = BTreeMap::new();
                for r in &records {
                    per_day.entry(r.date).or_default().add(r.status);
                }

                Ok::<_, AttendanceError>(
                    per_day
                        .into_iter()
                        .map(|(date, counts)| DailyStats { date, total: counts.total(), counts })
                        .collect(),
                )
            })
            .await
    }

    /// All-time summary for one student.
    pub async fn get_my_attendance_status(
        &self,
        user_id: i64,
    ) -> AttendanceResult<AttendanceSummary> {
        let filter = RecordFilter::default().user(user_id);

        self.ctx
            .bounded("my_attendance_status", async {
                let records = attendance_record::Model::find_all(&self.ctx.db, &filter).await?;
                let summary = match aggregate_students(&records).into_iter().next() {
                    Some(s) => AttendanceSummary {
                        counts: s.counts,
                        total_sessions: s.total_sessions,
                        days: s.days,
                        warning_level: s.warning_level,
                    },
                    None => AttendanceSummary {
                        counts: StatusCounts::default(),
                        total_sessions: 0,
                        days: DayTally::default(),
                        warning_level: WarningLevel::Normal,
                    },
                };
                Ok::<_, AttendanceError>(summary)
            })
            .await
    }
}

/// Groups records by student. The name/cohort snapshot comes from each
/// student's most recent record.
fn aggregate_students(records: &[attendance_record::Model]) -> Vec<StudentStats> {
    let mut latest: HashMap<i64, &attendance_record::Model> = HashMap::new();
    let mut counts: HashMap<i64, StatusCounts> = HashMap::new();
    let mut days: HashMap<(i64, NaiveDate), Vec<AttendanceStatus>> = HashMap::new();

    for r in records {
        latest
            .entry(r.user_id)
            .and_modify(|cur| {
                if (r.date, r.id) > (cur.date, cur.id) {
                    *cur = r;
                }
            })
            .or_insert(r);
        counts.entry(r.user_id).or_default().add(r.status);
        days.entry((r.user_id, r.date)).or_default().push(r.status);
    }

    let mut tallies: HashMap<i64, DayTally> = HashMap::new();
    for ((user_id, _), statuses) in &days {
        tallies.entry(*user_id).or_default().add_day(statuses);
    }

    let mut stats: Vec<StudentStats> = latest
        .into_iter()
        .map(|(user_id, snap)| {
            let counts = counts.remove(&user_id).unwrap_or_default();
            let days = tallies.remove(&user_id).unwrap_or_default();
            StudentStats {
                user_id,
                jsd_number: snap.jsd_number.clone(),
                first_name: snap.first_name.clone(),
                last_name: snap.last_name.clone(),
                cohort_number: snap.cohort_number,
                total_sessions: counts.total(),
                counts,
                warning_level: WarningLevel::from_absent_days(days.absent_days),
                days,
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.days
            .absent_days
            .cmp(&a.days.absent_days)
            .then(a.user_id.cmp(&b.user_id))
    });
    stats
}
