use async_trait::async_trait;
use db::models::user;
use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;

/// What the attendance core needs to know about a person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub jsd_number: String,
    pub cohort_number: i32,
}

impl From<user::Model> for DirectoryUser {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            jsd_number: u.jsd_number,
            cohort_number: u.cohort_number,
        }
    }
}

/// Read-only view of the account service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: i64) -> Result<Option<DirectoryUser>, DbErr>;

    /// Students of `cohort_number`, ordered by first name.
    async fn list_cohort(&self, cohort_number: i32) -> Result<Vec<DirectoryUser>, DbErr>;
}

/// [`UserDirectory`] backed by the `users` table.
#[derive(Clone)]
pub struct DbUserDirectory {
    db: DatabaseConnection,
}

impl DbUserDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for DbUserDirectory {
    async fn find_user(&self, user_id: i64) -> Result<Option<DirectoryUser>, DbErr> {
        Ok(user::Model::find_by_id(&self.db, user_id)
            .await?
            .map(DirectoryUser::from))
    }

    async fn list_cohort(&self, cohort_number: i32) -> Result<Vec<DirectoryUser>, DbErr> {
        Ok(user::Model::list_cohort(&self.db, cohort_number)
            .await?
            .into_iter()
            .map(DirectoryUser::from)
            .collect())
    }
}
