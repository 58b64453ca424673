use crate::context::ServiceContext;
use crate::directory::{DbUserDirectory, DirectoryUser, UserDirectory};
use crate::policy::AttendancePolicy;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use db::models::user;
use db::test_utils::setup_test_db;
use sea_orm::DbErr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use util::clock::FixedClock;

/// Store timeout used with [`StallingDirectory`].
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(50);

pub struct TestEnv {
    pub ctx: ServiceContext,
    pub clock: Arc<FixedClock>,
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Migrated in-memory database with the clock pinned to `day()` at 09:05.
pub async fn setup() -> TestEnv {
    let db = setup_test_db().await;
    let users = Arc::new(DbUserDirectory::new(db.clone()));
    with_directory(db, users, AttendancePolicy::default())
}

/// Like [`setup`], but user lookups go through a [`StallingDirectory`] and
/// the store timeout is [`SHORT_TIMEOUT`].
pub async fn setup_stalling(stall_user: Option<i64>, stall_call: Option<usize>) -> TestEnv {
    let db = setup_test_db().await;
    let users = Arc::new(StallingDirectory {
        inner: DbUserDirectory::new(db.clone()),
        stall_user,
        stall_call,
        calls: AtomicUsize::new(0),
    });
    let policy = AttendancePolicy { store_timeout: SHORT_TIMEOUT, ..Default::default() };
    with_directory(db, users, policy)
}

fn with_directory(
    db: sea_orm::DatabaseConnection,
    users: Arc<dyn UserDirectory>,
    policy: AttendancePolicy,
) -> TestEnv {
    let clock = Arc::new(FixedClock::at_local(day(), hm(9, 5)));
    let ctx = ServiceContext::new(db, users, clock.clone(), policy);
    TestEnv { ctx, clock }
}

/// Directory whose `find_user` hangs well past [`SHORT_TIMEOUT`] for one
/// user id, or on one call (0-based), and answers normally otherwise.
pub struct StallingDirectory {
    inner: DbUserDirectory,
    stall_user: Option<i64>,
    stall_call: Option<usize>,
    calls: AtomicUsize,
}

#[async_trait]
impl UserDirectory for StallingDirectory {
    async fn find_user(&self, user_id: i64) -> Result<Option<DirectoryUser>, DbErr> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_user == Some(user_id) || self.stall_call == Some(call) {
            tokio::time::sleep(SHORT_TIMEOUT * 20).await;
        }
        self.inner.find_user(user_id).await
    }

    async fn list_cohort(&self, cohort_number: i32) -> Result<Vec<DirectoryUser>, DbErr> {
        self.inner.list_cohort(cohort_number).await
    }
}

impl TestEnv {
    pub fn set_local(&self, date: NaiveDate, time: NaiveTime) {
        self.clock
            .set(util::clock::local_instant(date, time).unwrap());
    }

    pub async fn student(&self, first_name: &str, cohort: i32) -> user::Model {
        let email = format!("{}.{}@school.test", first_name.to_lowercase(), cohort);
        user::Model::create(
            &self.ctx.db,
            &email,
            first_name,
            "Tester",
            &format!("JSD-{first_name}"),
            cohort,
            false,
        )
        .await
        .unwrap()
    }
}
