use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use serde::Serialize;

/// A student or admin account as seen by the attendance subsystem.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Programme registration number.
    pub jsd_number: String,
    /// Cohort the student belongs to; `0` for staff.
    pub cohort_number: i32,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::leave_request::Entity")]
    LeaveRequests,
}

impl Related<super::leave_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        email: &str,
        first_name: &str,
        last_name: &str,
        jsd_number: &str,
        cohort_number: i32,
        admin: bool,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            email: Set(email.to_owned()),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            jsd_number: Set(jsd_number.to_owned()),
            cohort_number: Set(cohort_number),
            admin: Set(admin),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Every non-admin member of `cohort_number`, ordered by first name.
    pub async fn list_cohort(
        db: &DatabaseConnection,
        cohort_number: i32,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::CohortNumber.eq(cohort_number))
            .filter(Column::Admin.eq(false))
            .order_by_asc(Column::FirstName)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
