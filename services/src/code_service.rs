use crate::context::ServiceContext;
use crate::error::{AttendanceError, AttendanceResult};
use db::models::{
    Session,
    attendance_code,
    attendance_record::{self, MarkedBy, NewAttendanceRecord},
    attendance_session_lock,
};
use rand::Rng;
use sea_orm::{DbErr, SqlErr};
use tracing::{debug, info};
use util::clock::{CIVIL_TZ, Clock};

/// Characters a code suffix is drawn from. No `I`, `O`, `0` or `1`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_SUFFIX_LEN: usize = 4;

/// A student's redemption attempt.
#[derive(Debug, Clone)]
pub struct SubmitAttendance {
    pub user_id: i64,
    pub code: String,
    pub cohort_number: i32,
    pub source_ip: Option<String>,
}

/// Issues attendance codes and redeems them into records.
#[derive(Clone)]
pub struct CodeService {
    ctx: ServiceContext,
}

impl CodeService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Replaces whatever code is active for `(cohort, session)` with a new one.
    pub async fn generate_code(
        &self,
        cohort_number: i32,
        session: Session,
        generated_by: i64,
    ) -> AttendanceResult<attendance_code::Model> {
        if cohort_number <= 0 {
            return Err(AttendanceError::validation("cohort must be a positive number"));
        }

        self.ctx
            .bounded("generate_code", async {
                let db = &self.ctx.db;
                let now = self.ctx.clock.now();

                let retired =
                    attendance_code::Model::deactivate_scope(db, cohort_number, session).await?;
                let code = format!("{}-{}", session.code_prefix(), random_suffix());
                let created = attendance_code::Model::create(
                    db,
                    &code,
                    cohort_number,
                    session,
                    now,
                    now + self.ctx.policy.code_validity,
                    generated_by,
                )
                .await?;

                info!(
                    cohort = cohort_number,
                    session = %session,
                    code = %created.code,
                    retired,
                    generated_by,
                    "attendance code generated"
                );
                Ok::<_, AttendanceError>(created)
            })
            .await
    }

    /// The currently redeemable code, if any.
    pub async fn get_active_code(
        &self,
        cohort_number: i32,
        session: Session,
    ) -> AttendanceResult<Option<attendance_code::Model>> {
        self.ctx
            .bounded("get_active_code", async {
                let now = self.ctx.clock.now();
                let code =
                    attendance_code::Model::find_active(&self.ctx.db, cohort_number, session, now)
                        .await?;
                Ok::<_, AttendanceError>(code)
            })
            .await
    }

    /// Redeems a code into a self-marked record.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// code shape, active code, code match, student, cohort, duplicate, lock.
    pub async fn submit_attendance(
        &self,
        req: SubmitAttendance,
    ) -> AttendanceResult<attendance_record::Model> {
        let submitted = req.code.trim().to_uppercase();
        if submitted.is_empty() {
            return Err(AttendanceError::validation("code is required"));
        }
        if req.cohort_number <= 0 {
            return Err(AttendanceError::validation("cohort must be a positive number"));
        }

        self.ctx
            .bounded("submit_attendance", self.redeem(req, submitted))
            .await
    }

    async fn redeem(
        &self,
        req: SubmitAttendance,
        submitted: String,
    ) -> AttendanceResult<attendance_record::Model> {
        let db = &self.ctx.db;
        let now = self.ctx.clock.now();
        let today = now.with_timezone(&CIVIL_TZ).date_naive();
        let cohort = req.cohort_number;

        let session = parse_code_session(&submitted).ok_or_else(|| {
            debug!(user_id = req.user_id, "unparseable attendance code");
            AttendanceError::InvalidCode
        })?;

        let active = attendance_code::Model::find_active(db, cohort, session, now).await?;
        if active.as_ref().is_none_or(|c| c.code != submitted) {
            // A code that is live for another cohort is a cohort mistake, not a typo.
            if let Some(other) =
                attendance_code::Model::find_live_by_code(db, &submitted, now).await?
            {
                debug!(
                    user_id = req.user_id,
                    cohort,
                    code_cohort = other.cohort_number,
                    "code submitted under the wrong cohort"
                );
                return Err(AttendanceError::CodeForWrongCohort);
            }
        }

        let Some(active) = active else {
            let latest = attendance_code::Model::find_latest_flagged(db, cohort, session).await?;
            return Err(match latest {
                Some(c) if c.code == submitted && !c.is_live(now) => AttendanceError::CodeExpired,
                _ => AttendanceError::NoActiveCode,
            });
        };

        if active.code != submitted {
            debug!(user_id = req.user_id, cohort, session = %session, "attendance code mismatch");
            return Err(AttendanceError::InvalidCode);
        }

        let student = self
            .ctx
            .users
            .find_user(req.user_id)
            .await?
            .ok_or(AttendanceError::StudentNotFound)?;

        if student.cohort_number != cohort {
            debug!(
                user_id = req.user_id,
                user_cohort = student.cohort_number,
                cohort,
                "code used outside the student's cohort"
            );
            return Err(AttendanceError::CodeForWrongCohort);
        }

        if attendance_record::Model::find_live(db, req.user_id, today, session)
            .await?
            .is_some()
        {
            return Err(AttendanceError::AlreadySubmitted);
        }

        if attendance_session_lock::Model::is_locked(db, today, session, cohort).await? {
            return Err(AttendanceError::SessionLocked);
        }

        let status = self.ctx.policy.classify(session, now);
        let record = attendance_record::Model::create(
            db,
            NewAttendanceRecord {
                user_id: student.id,
                jsd_number: student.jsd_number,
                first_name: student.first_name,
                last_name: student.last_name,
                cohort_number: student.cohort_number,
                date: today,
                session,
                status,
                marked_by: MarkedBy::SelfSubmitted,
                marked_by_user: None,
                submitted_at: now,
                ip_address: req.source_ip,
            },
        )
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AttendanceError::AlreadySubmitted
            } else {
                AttendanceError::Database(err)
            }
        })?;

        info!(
            user_id = record.user_id,
            cohort,
            session = %session,
            date = %today,
            status = %record.status,
            "attendance submitted"
        );
        Ok(record)
    }

    /// Deletes every code past its expiry. Returns how many went.
    pub async fn purge_expired_codes(&self) -> AttendanceResult<u64> {
        self.ctx
            .bounded("purge_expired_codes", async {
                let now = self.ctx.clock.now();
                let purged = attendance_code::Model::delete_expired(&self.ctx.db, now).await?;
                info!(purged, "expired attendance codes purged");
                Ok::<_, AttendanceError>(purged)
            })
            .await
    }
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Session named by a `SESSION-SUFFIX` code, or `None` if the shape is wrong.
pub fn parse_code_session(code: &str) -> Option<Session> {
    let (prefix, suffix) = code.split_once('-')?;
    if suffix.is_empty() {
        return None;
    }
    Session::from_code_prefix(prefix)
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, hm, setup};
    use db::models::attendance_record::AttendanceStatus;

    fn submit(user_id: i64, code: &str, cohort: i32) -> SubmitAttendance {
        SubmitAttendance {
            user_id,
            code: code.to_owned(),
            cohort_number: cohort,
            source_ip: Some("203.0.113.7".into()),
        }
    }

    #[test]
    fn parse_code_session_accepts_known_prefixes() {
        assert_eq!(parse_code_session("MORNING-7K2Q"), Some(Session::Morning));
        assert_eq!(parse_code_session("AFTERNOON-AB23"), Some(Session::Afternoon));
        assert_eq!(parse_code_session("EVENING-AB23"), None);
        assert_eq!(parse_code_session("MORNING-"), None);
        assert_eq!(parse_code_session("MORNING7K2Q"), None);
    }

    #[tokio::test]
    async fn generated_code_has_expected_shape() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        let (prefix, suffix) = code.code.split_once('-').unwrap();
        assert_eq!(prefix, "MORNING");
        assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert_eq!(code.expires_at - code.generated_at, chrono::Duration::minutes(120));
        assert!(code.active);
    }

    #[tokio::test]
    async fn generate_rejects_non_positive_cohort() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let err = svc.generate_code(0, Session::Morning, 1).await.unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));
    }

    #[tokio::test]
    async fn regeneration_is_scoped_to_cohort_and_session() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());

        let afternoon = svc.generate_code(9, Session::Afternoon, 1).await.unwrap();
        let other_cohort = svc.generate_code(10, Session::Morning, 1).await.unwrap();
        let first = svc.generate_code(9, Session::Morning, 1).await.unwrap();
        let second = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        let active = svc.get_active_code(9, Session::Morning).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert_ne!(active.id, first.id);

        let a = svc.get_active_code(9, Session::Afternoon).await.unwrap().unwrap();
        assert_eq!(a.id, afternoon.id);
        let o = svc.get_active_code(10, Session::Morning).await.unwrap().unwrap();
        assert_eq!(o.id, other_cohort.id);
    }

    #[tokio::test]
    async fn expired_code_is_not_returned() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        svc.generate_code(9, Session::Morning, 1).await.unwrap();

        env.clock.advance(chrono::Duration::minutes(121));
        assert!(svc.get_active_code(9, Session::Morning).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn end_to_end_submission_then_duplicate() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let student = env.student("Ann", 9).await;

        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();
        env.set_local(day(), hm(9, 12));

        let record = svc
            .submit_attendance(submit(student.id, &code.code.to_lowercase(), 9))
            .await
            .unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.marked_by, MarkedBy::SelfSubmitted);
        assert_eq!(record.date, day());
        assert_eq!(record.first_name, "Ann");
        assert_eq!(record.ip_address.as_deref(), Some("203.0.113.7"));

        let again = svc
            .submit_attendance(submit(student.id, &code.code, 9))
            .await
            .unwrap_err();
        assert!(matches!(again, AttendanceError::AlreadySubmitted));
    }

    #[tokio::test]
    async fn concurrent_insert_on_the_same_key_reports_duplicate() {
        use sea_orm::ConnectionTrait;

        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let student = env.student("Ray", 9).await;
        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        // Another writer lands the same key after the duplicate check has
        // already passed, so only the partial unique index can catch it.
        env.ctx
            .db
            .execute_unprepared(
                "CREATE TRIGGER racing_writer BEFORE INSERT ON attendance_records \
                 WHEN NEW.marked_by = 'self' \
                 BEGIN \
                   INSERT INTO attendance_records (user_id, jsd_number, first_name, last_name, \
                     cohort_number, date, session, status, marked_by, marked_by_user, \
                     submitted_at, locked, ip_address, deleted, deleted_at, deleted_by) \
                   VALUES (NEW.user_id, NEW.jsd_number, NEW.first_name, NEW.last_name, \
                     NEW.cohort_number, NEW.date, NEW.session, 'late', 'admin', 1, \
                     NEW.submitted_at, 0, NULL, 0, NULL, NULL); \
                 END;",
            )
            .await
            .unwrap();

        let err = svc
            .submit_attendance(submit(student.id, &code.code, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::AlreadySubmitted), "{err:?}");
    }

    #[tokio::test]
    async fn late_submission_is_classified_late() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let student = env.student("Ben", 9).await;
        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        env.set_local(day(), hm(9, 40));
        let record = svc
            .submit_attendance(submit(student.id, &code.code, 9))
            .await
            .unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);
    }

    #[tokio::test]
    async fn pipeline_rejections() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let student = env.student("Cat", 9).await;

        let err = svc.submit_attendance(submit(student.id, "  ", 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));

        let err = svc.submit_attendance(submit(student.id, "NOON-ABCD", 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidCode));

        let err = svc.submit_attendance(submit(student.id, "MORNING-ABCD", 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NoActiveCode));

        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();
        let wrong = if code.code.ends_with('A') { "MORNING-BBBB" } else { "MORNING-AAAA" };
        let err = svc.submit_attendance(submit(student.id, wrong, 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidCode));

        let err = svc.submit_attendance(submit(4242, &code.code, 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::StudentNotFound));
    }

    #[tokio::test]
    async fn cohort_mismatch_in_both_directions() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let nine = env.student("Dan", 9).await;
        let ten = env.student("Eve", 10).await;
        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        // Cohort-10 student submitting cohort 9's code under cohort 9.
        let err = svc.submit_attendance(submit(ten.id, &code.code, 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::CodeForWrongCohort));

        // Cohort 9's live code claimed under cohort 10, by a cohort-10 student.
        let err = svc.submit_attendance(submit(ten.id, &code.code, 10)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::CodeForWrongCohort));

        // Same, once cohort 10 has a live code of its own.
        svc.generate_code(10, Session::Morning, 1).await.unwrap();
        let err = svc.submit_attendance(submit(ten.id, &code.code, 10)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::CodeForWrongCohort));

        // Cohort-9 student claiming cohort 10 with cohort 10's live code.
        let ten_code = svc.get_active_code(10, Session::Morning).await.unwrap().unwrap();
        let err = svc.submit_attendance(submit(nine.id, &ten_code.code, 10)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::CodeForWrongCohort));
    }

    #[tokio::test]
    async fn expired_matching_code_reports_expiry() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let student = env.student("Fay", 9).await;
        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        env.clock.advance(chrono::Duration::minutes(125));
        let err = svc.submit_attendance(submit(student.id, &code.code, 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::CodeExpired));

        let err = svc.submit_attendance(submit(student.id, "MORNING-ZZZZ", 9)).await;
        assert!(matches!(err, Err(AttendanceError::NoActiveCode) | Err(AttendanceError::CodeExpired)));
    }

    #[tokio::test]
    async fn locked_session_blocks_submission() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        let student = env.student("Gus", 9).await;
        let code = svc.generate_code(9, Session::Morning, 1).await.unwrap();

        attendance_session_lock::Model::upsert(
            &env.ctx.db,
            day(),
            Session::Morning,
            attendance_session_lock::ALL_COHORTS,
            true,
            1,
            env.ctx.clock.now(),
        )
        .await
        .unwrap();

        let err = svc.submit_attendance(submit(student.id, &code.code, 9)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::SessionLocked));
    }

    #[tokio::test]
    async fn purge_removes_only_expired_codes() {
        let env = setup().await;
        let svc = CodeService::new(env.ctx.clone());
        svc.generate_code(9, Session::Morning, 1).await.unwrap();
        env.clock.advance(chrono::Duration::minutes(180));
        svc.generate_code(9, Session::Afternoon, 1).await.unwrap();

        assert_eq!(svc.purge_expired_codes().await.unwrap(), 1);
        assert!(svc.get_active_code(9, Session::Afternoon).await.unwrap().is_some());
    }
}
