use crate::context::ServiceContext;
use crate::error::{AttendanceError, AttendanceResult};
use chrono::NaiveDate;
use db::models::{
    Session,
    attendance_record,
    attendance_session_lock::{self, ALL_COHORTS},
};
use tracing::info;
use util::clock::Clock;

/// Opens and closes self-submission for a date and session.
#[derive(Clone)]
pub struct LockService {
    ctx: ServiceContext,
}

impl LockService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sets the lock for one cohort, or for every cohort when `cohort_number`
    /// is `None` or `0`. Matching records get the flag stamped as well.
    pub async fn lock_session(
        &self,
        date: NaiveDate,
        session: Session,
        cohort_number: Option<i32>,
        locked: bool,
        updated_by: i64,
    ) -> AttendanceResult<attendance_session_lock::Model> {
        let cohort = cohort_number.filter(|c| *c > 0);

        self.ctx
            .bounded("lock_session", async {
                let db = &self.ctx.db;
                let now = self.ctx.clock.now();
                let row = attendance_session_lock::Model::upsert(
                    db,
                    date,
                    session,
                    cohort.unwrap_or(ALL_COHORTS),
                    locked,
                    updated_by,
                    now,
                )
                .await?;
                let stamped =
                    attendance_record::Model::stamp_locked(db, date, session, cohort, locked)
                        .await?;

                info!(
                    date = %date,
                    session = %session,
                    cohort = cohort.unwrap_or(ALL_COHORTS),
                    locked,
                    stamped,
                    updated_by,
                    "attendance session lock changed"
                );
                Ok::<_, AttendanceError>(row)
            })
            .await
    }

    pub async fn is_session_locked(
        &self,
        date: NaiveDate,
        session: Session,
        cohort_number: i32,
    ) -> AttendanceResult<bool> {
        self.ctx
            .bounded("is_session_locked", async {
                let locked = attendance_session_lock::Model::is_locked(
                    &self.ctx.db,
                    date,
                    session,
                    cohort_number,
                )
                .await?;
                Ok::<_, AttendanceError>(locked)
            })
            .await
    }
}
