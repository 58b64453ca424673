use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AttendanceRecords {
    Table,
    Id,
    UserId,
    JsdNumber,
    FirstName,
    LastName,
    CohortNumber,
    Date,
    Session,
    Status,
    MarkedBy,
    MarkedByUser,
    SubmittedAt,
    Locked,
    IpAddress,
    Deleted,
    DeletedAt,
    DeletedBy,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601050003_create_attendance_records"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to `users`: name/JSD/cohort are a snapshot taken at write
        // time and the history must survive account changes.
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::UserId).big_integer().not_null())
                    .col(ColumnDef::new(AttendanceRecords::JsdNumber).string().not_null())
                    .col(ColumnDef::new(AttendanceRecords::FirstName).string().not_null())
                    .col(ColumnDef::new(AttendanceRecords::LastName).string().not_null())
                    .col(ColumnDef::new(AttendanceRecords::CohortNumber).integer().not_null())
                    .col(ColumnDef::new(AttendanceRecords::Date).date().not_null())
                    .col(ColumnDef::new(AttendanceRecords::Session).string_len(16).not_null())
                    .col(ColumnDef::new(AttendanceRecords::Status).string_len(24).not_null())
                    .col(ColumnDef::new(AttendanceRecords::MarkedBy).string_len(16).not_null())
                    .col(ColumnDef::new(AttendanceRecords::MarkedByUser).big_integer().null())
                    .col(
                        ColumnDef::new(AttendanceRecords::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::Locked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AttendanceRecords::IpAddress).string().null())
                    .col(
                        ColumnDef::new(AttendanceRecords::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::DeletedBy).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_records_cohort_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::CohortNumber)
                    .col(AttendanceRecords::Date)
                    .to_owned(),
            )
            .await?;

        // At most one live row per (user, date, session). Soft-deleted rows are
        // exempt so a deleted submission can be redone.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_attendance_records_live_key \
                 ON attendance_records (user_id, date, session) WHERE deleted = 0",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await
    }
}
