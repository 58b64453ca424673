use super::session::Session;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "leave_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub leave_type: LeaveType,
    /// Required for `half_day`, optional for `late`, ignored for `full_day`.
    pub session: Option<Session>,
    pub date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    /// Entered by an admin on the student's behalf; approved on creation.
    pub is_manual_entry: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LeaveType {
    #[sea_orm(string_value = "late")]
    Late,

    #[sea_orm(string_value = "half_day")]
    HalfDay,

    #[sea_orm(string_value = "full_day")]
    FullDay,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LeaveStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub user_id: i64,
    pub leave_type: LeaveType,
    pub session: Option<Session>,
    pub date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub is_manual_entry: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub async fn create(db: &DatabaseConnection, new: NewLeaveRequest) -> Result<Self, DbErr> {
        ActiveModel {
            user_id: Set(new.user_id),
            leave_type: Set(new.leave_type),
            session: Set(new.session),
            date: Set(new.date),
            reason: Set(new.reason),
            status: Set(new.status),
            reviewed_by: Set(new.reviewed_by),
            reviewed_at: Set(new.reviewed_at),
            review_notes: Set(None),
            is_manual_entry: Set(new.is_manual_entry),
            created_by: Set(new.created_by),
            created_at: Set(new.created_at),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Moves request `id` out of `pending` in one conditional write. `None`
    /// when no pending row matched, either because `id` is unknown or
    /// because another review got there first.
    pub async fn review_pending(
        db: &DatabaseConnection,
        id: i64,
        status: LeaveStatus,
        reviewed_by: i64,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbErr> {
        let res = Entity::update_many()
            .col_expr(Column::Status, Expr::value(status))
            .col_expr(Column::ReviewedBy, Expr::value(Some(reviewed_by)))
            .col_expr(Column::ReviewedAt, Expr::value(Some(now)))
            .col_expr(Column::ReviewNotes, Expr::value(notes))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(LeaveStatus::Pending))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        Self::find_by_id(db, id).await
    }

    /// Newest first.
    pub async fn list(db: &DatabaseConnection, filter: &LeaveFilter) -> Result<Vec<Self>, DbErr> {
        let mut cond = Condition::all();
        if let Some(u) = filter.user_id {
            cond = cond.add(Column::UserId.eq(u));
        }
        if let Some(s) = filter.status {
            cond = cond.add(Column::Status.eq(s));
        }
        if let Some(d) = filter.date_from {
            cond = cond.add(Column::Date.gte(d));
        }
        if let Some(d) = filter.date_to {
            cond = cond.add(Column::Date.lte(d));
        }

        let mut query = Entity::find().filter(cond);
        if let Some(c) = filter.cohort_number {
            query = query
                .inner_join(super::user::Entity)
                .filter(super::user::Column::CohortNumber.eq(c));
        }

        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }
}

/// Listing filter. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub user_id: Option<i64>,
    pub cohort_number: Option<i32>,
    pub status: Option<LeaveStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
