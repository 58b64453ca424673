use super::session::Session;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::Set;
use serde::Serialize;

/// Cohort value meaning "every cohort".
pub const ALL_COHORTS: i32 = 0;

/// Self-submission gate for one `(date, session, cohort)` slot.
///
/// Exists independently of any attendance record, so locking a slot nobody
/// has submitted to yet still blocks later submissions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_session_locks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: NaiveDate,
    #[sea_orm(primary_key, auto_increment = false)]
    pub session: Session,
    #[sea_orm(primary_key, auto_increment = false)]
    pub cohort_number: i32,

    pub locked: bool,
    pub updated_by: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts or replaces the lock state for the slot.
    pub async fn upsert(
        db: &DatabaseConnection,
        date: NaiveDate,
        session: Session,
        cohort_number: i32,
        locked: bool,
        updated_by: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let row = ActiveModel {
            date: Set(date),
            session: Set(session),
            cohort_number: Set(cohort_number),
            locked: Set(locked),
            updated_by: Set(updated_by),
            updated_at: Set(now),
        };

        Entity::insert(row)
            .on_conflict(
                OnConflict::columns([Column::Date, Column::Session, Column::CohortNumber])
                    .update_columns([Column::Locked, Column::UpdatedBy, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Entity::find_by_id((date, session, cohort_number))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("attendance_session_locks".into()))
    }

    /// True when the slot is locked for `cohort_number` specifically or for
    /// every cohort.
    pub async fn is_locked(
        db: &DatabaseConnection,
        date: NaiveDate,
        session: Session,
        cohort_number: i32,
    ) -> Result<bool, DbErr> {
        let hit = Entity::find()
            .filter(Column::Date.eq(date))
            .filter(Column::Session.eq(session))
            .filter(Column::CohortNumber.is_in([cohort_number, ALL_COHORTS]))
            .filter(Column::Locked.eq(true))
            .one(db)
            .await?;
        Ok(hit.is_some())
    }
}
