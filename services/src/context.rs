use crate::directory::{DbUserDirectory, UserDirectory};
use crate::error::{AttendanceError, AttendanceResult};
use crate::policy::AttendancePolicy;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use util::clock::{Clock, SystemClock};

/// Dependencies shared by every attendance engine.
#[derive(Clone)]
pub struct ServiceContext {
    pub db: DatabaseConnection,
    pub users: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
    pub policy: AttendancePolicy,
}

impl ServiceContext {
    pub fn new(
        db: DatabaseConnection,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        policy: AttendancePolicy,
    ) -> Self {
        Self { db, users, clock, policy }
    }

    /// Production wiring: users from the same database, wall clock.
    pub fn from_db(db: DatabaseConnection, policy: AttendancePolicy) -> Self {
        let users = Arc::new(DbUserDirectory::new(db.clone()));
        Self::new(db, users, Arc::new(SystemClock), policy)
    }

    /// Runs `fut` under the per-operation store timeout.
    pub(crate) async fn bounded<T, F>(&self, op: &'static str, fut: F) -> AttendanceResult<T>
    where
        F: Future<Output = AttendanceResult<T>>,
    {
        with_timeout(self.policy.store_timeout, op, fut).await
    }
}

async fn with_timeout<T, F>(limit: Duration, op: &'static str, fut: F) -> AttendanceResult<T>
where
    F: Future<Output = AttendanceResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => {
            warn!(op, timeout_ms = limit.as_millis() as u64, "store operation timed out");
            Err(AttendanceError::Timeout(op))
        }
    }
}
