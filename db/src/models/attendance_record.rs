use super::session::Session;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, sea_query::Expr};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Outcome of one student in one session on one civil day.
///
/// `(user_id, date, session)` is the logical key. Several physical rows may
/// share it only while all but one are soft-deleted; the live-row uniqueness
/// is enforced by a partial unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,

    // Snapshot of the student at write time.
    pub jsd_number: String,
    pub first_name: String,
    pub last_name: String,
    pub cohort_number: i32,

    pub date: NaiveDate,
    pub session: Session,
    pub status: AttendanceStatus,
    pub marked_by: MarkedBy,
    pub marked_by_user: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub locked: bool,
    pub ip_address: Option<String>,

    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Display, EnumString,
    Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,

    #[sea_orm(string_value = "late")]
    Late,

    #[sea_orm(string_value = "absent")]
    Absent,

    #[sea_orm(string_value = "late_excused")]
    LateExcused,

    #[sea_orm(string_value = "absent_excused")]
    AbsentExcused,
}

impl AttendanceStatus {
    /// Counts towards a "present" day when the other session is not absent.
    pub fn attended(self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::LateExcused
        )
    }
}

/// Who wrote a record. Stored as `self` / `admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarkedBy {
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    SelfSubmitted,

    Admin,
}

// `DeriveActiveEnum` turns each string value into an identifier, and `self`
// is a keyword, so the column mapping is written out by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedByEnum;

impl sea_orm::sea_query::Iden for MarkedByEnum {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = write!(s, "marked_by");
    }
}

impl ActiveEnum for MarkedBy {
    type Value = String;
    type ValueVec = Vec<String>;

    fn name() -> DynIden {
        sea_orm::sea_query::SeaRc::new(MarkedByEnum) as DynIden
    }

    fn to_value(&self) -> String {
        match self {
            MarkedBy::SelfSubmitted => "self",
            MarkedBy::Admin => "admin",
        }
        .to_owned()
    }

    fn try_from_value(v: &String) -> Result<Self, DbErr> {
        match v.as_str() {
            "self" => Ok(MarkedBy::SelfSubmitted),
            "admin" => Ok(MarkedBy::Admin),
            other => Err(DbErr::Type(format!("unexpected value for MarkedBy enum: {other}"))),
        }
    }

    fn db_type() -> ColumnDef {
        ColumnTypeTrait::def(ColumnType::Text)
    }
}

impl From<MarkedBy> for Value {
    fn from(v: MarkedBy) -> Self {
        v.to_value().into()
    }
}

impl sea_orm::TryGetable for MarkedBy {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &QueryResult,
        idx: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let value = <String as sea_orm::TryGetable>::try_get_by(res, idx)?;
        MarkedBy::try_from_value(&value).map_err(sea_orm::TryGetError::DbErr)
    }
}

impl sea_orm::sea_query::ValueType for MarkedBy {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        let value = <String as sea_orm::sea_query::ValueType>::try_from(v)?;
        MarkedBy::try_from_value(&value).map_err(|_| sea_orm::sea_query::ValueTypeErr)
    }

    fn type_name() -> String {
        <String as sea_orm::sea_query::ValueType>::type_name()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        <String as sea_orm::sea_query::ValueType>::array_type()
    }

    fn column_type() -> ColumnType {
        MarkedBy::db_type().get_column_type().to_owned()
    }

    fn enum_type_name() -> Option<&'static str> {
        Some("MarkedBy")
    }
}

impl sea_orm::sea_query::Nullable for MarkedBy {
    fn null() -> Value {
        <String as sea_orm::sea_query::Nullable>::null()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Everything needed to insert a fresh record.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub user_id: i64,
    pub jsd_number: String,
    pub first_name: String,
    pub last_name: String,
    pub cohort_number: i32,
    pub date: NaiveDate,
    pub session: Session,
    pub status: AttendanceStatus,
    pub marked_by: MarkedBy,
    pub marked_by_user: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: Option<String>,
}

/// Query filter for record listings. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub cohort_number: Option<i32>,
    pub user_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub session: Option<Session>,
    pub include_deleted: bool,
}

impl RecordFilter {
    pub fn cohort(mut self, cohort_number: i32) -> Self {
        self.cohort_number = Some(cohort_number);
        self
    }

    pub fn user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Inclusive on both ends.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(c) = self.cohort_number {
            cond = cond.add(Column::CohortNumber.eq(c));
        }
        if let Some(u) = self.user_id {
            cond = cond.add(Column::UserId.eq(u));
        }
        if let Some(d) = self.date {
            cond = cond.add(Column::Date.eq(d));
        }
        if let Some(d) = self.date_from {
            cond = cond.add(Column::Date.gte(d));
        }
        if let Some(d) = self.date_to {
            cond = cond.add(Column::Date.lte(d));
        }
        if let Some(s) = self.session {
            cond = cond.add(Column::Session.eq(s));
        }
        if !self.include_deleted {
            cond = cond.add(Column::Deleted.eq(false));
        }
        cond
    }
}

impl Model {
    /// The live (non-deleted) record for the key, if any.
    pub async fn find_live(
        db: &DatabaseConnection,
        user_id: i64,
        date: NaiveDate,
        session: Session,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Date.eq(date))
            .filter(Column::Session.eq(session))
            .filter(Column::Deleted.eq(false))
            .one(db)
            .await
    }

    /// Any record for the key, preferring the live one, then the newest
    /// soft-deleted one.
    pub async fn find_by_key(
        db: &DatabaseConnection,
        user_id: i64,
        date: NaiveDate,
        session: Session,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Date.eq(date))
            .filter(Column::Session.eq(session))
            .order_by_asc(Column::Deleted)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn create(db: &DatabaseConnection, new: NewAttendanceRecord) -> Result<Self, DbErr> {
        ActiveModel {
            user_id: Set(new.user_id),
            jsd_number: Set(new.jsd_number),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            cohort_number: Set(new.cohort_number),
            date: Set(new.date),
            session: Set(new.session),
            status: Set(new.status),
            marked_by: Set(new.marked_by),
            marked_by_user: Set(new.marked_by_user),
            submitted_at: Set(new.submitted_at),
            locked: Set(false),
            ip_address: Set(new.ip_address),
            deleted: Set(false),
            deleted_at: Set(None),
            deleted_by: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Admin overwrite of an existing row. Also undeletes it.
    pub async fn overwrite(
        self,
        db: &DatabaseConnection,
        status: AttendanceStatus,
        marked_by_user: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.into();
        active.status = Set(status);
        active.marked_by = Set(MarkedBy::Admin);
        active.marked_by_user = Set(Some(marked_by_user));
        active.submitted_at = Set(now);
        active.deleted = Set(false);
        active.deleted_at = Set(None);
        active.deleted_by = Set(None);
        active.update(db).await
    }

    /// Soft-deletes a live record and returns it as it was before the delete.
    /// `None` when the id is unknown or already deleted.
    pub async fn soft_delete(
        db: &DatabaseConnection,
        id: i64,
        deleted_by: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbErr> {
        let Some(existing) = Entity::find_by_id(id)
            .filter(Column::Deleted.eq(false))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.clone().into();
        active.deleted = Set(true);
        active.deleted_at = Set(Some(now));
        active.deleted_by = Set(Some(deleted_by));
        active.update(db).await?;

        Ok(Some(existing))
    }

    /// All matching records ordered by date, then session, then id.
    pub async fn find_all(db: &DatabaseConnection, filter: &RecordFilter) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(filter.condition())
            .order_by_asc(Column::Date)
            .order_by_asc(Column::Session)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// One page of matching records, newest submission first, plus the total.
    pub async fn paginate(
        db: &DatabaseConnection,
        filter: &RecordFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Self>, u64), DbErr> {
        let paginator = Entity::find()
            .filter(filter.condition())
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .paginate(db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Stamps `locked` onto every live record for the date/session.
    /// `cohort_number = None` covers all cohorts.
    pub async fn stamp_locked(
        db: &DatabaseConnection,
        date: NaiveDate,
        session: Session,
        cohort_number: Option<i32>,
        locked: bool,
    ) -> Result<u64, DbErr> {
        let mut query = Entity::update_many()
            .col_expr(Column::Locked, Expr::value(locked))
            .filter(Column::Date.eq(date))
            .filter(Column::Session.eq(session))
            .filter(Column::Deleted.eq(false));
        if let Some(c) = cohort_number {
            query = query.filter(Column::CohortNumber.eq(c));
        }
        Ok(query.exec(db).await?.rows_affected)
    }
}
