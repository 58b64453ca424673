use super::session::Session;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set, sea_query::Expr};
use serde::Serialize;

/// A short-lived code students redeem to mark themselves present.
///
/// At most one row per `(cohort_number, session)` is meant to carry
/// `active = true`; superseded codes are deactivated, never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full code string, e.g. `MORNING-7K2Q`.
    pub code: String,
    pub cohort_number: i32,
    pub session: Session,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
    pub generated_by: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Redeemable right now: still flagged active and not yet past expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at > now
    }

    /// Flips every active code for `(cohort_number, session)` to inactive.
    pub async fn deactivate_scope(
        db: &DatabaseConnection,
        cohort_number: i32,
        session: Session,
    ) -> Result<u64, DbErr> {
        let res = Entity::update_many()
            .col_expr(Column::Active, Expr::value(false))
            .filter(Column::CohortNumber.eq(cohort_number))
            .filter(Column::Session.eq(session))
            .filter(Column::Active.eq(true))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn create(
        db: &DatabaseConnection,
        code: &str,
        cohort_number: i32,
        session: Session,
        generated_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        generated_by: i64,
    ) -> Result<Self, DbErr> {
        ActiveModel {
            code: Set(code.to_owned()),
            cohort_number: Set(cohort_number),
            session: Set(session),
            generated_at: Set(generated_at),
            expires_at: Set(expires_at),
            active: Set(true),
            generated_by: Set(generated_by),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// The newest code that is active and unexpired at `now`.
    pub async fn find_active(
        db: &DatabaseConnection,
        cohort_number: i32,
        session: Session,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::CohortNumber.eq(cohort_number))
            .filter(Column::Session.eq(session))
            .filter(Column::Active.eq(true))
            .filter(Column::ExpiresAt.gt(now))
            .order_by_desc(Column::GeneratedAt)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    /// The newest code still flagged active, whether or not it has expired.
    pub async fn find_latest_flagged(
        db: &DatabaseConnection,
        cohort_number: i32,
        session: Session,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::CohortNumber.eq(cohort_number))
            .filter(Column::Session.eq(session))
            .filter(Column::Active.eq(true))
            .order_by_desc(Column::GeneratedAt)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    /// A live code with exactly this string, in any cohort.
    pub async fn find_live_by_code(
        db: &DatabaseConnection,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Code.eq(code))
            .filter(Column::Active.eq(true))
            .filter(Column::ExpiresAt.gt(now))
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    /// Hard-deletes codes whose expiry passed before `now`.
    pub async fn delete_expired(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let res = Entity::delete_many()
            .filter(Column::ExpiresAt.lte(now))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
