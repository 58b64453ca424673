use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AttendanceSessionLocks {
    Table,
    Date,
    Session,
    CohortNumber,
    Locked,
    UpdatedBy,
    UpdatedAt,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601050004_create_attendance_session_locks"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceSessionLocks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AttendanceSessionLocks::Date).date().not_null())
                    .col(
                        ColumnDef::new(AttendanceSessionLocks::Session)
                            .string_len(16)
                            .not_null(),
                    )
                    // 0 = every cohort
                    .col(
                        ColumnDef::new(AttendanceSessionLocks::CohortNumber)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessionLocks::Locked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessionLocks::UpdatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessionLocks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AttendanceSessionLocks::Date)
                            .col(AttendanceSessionLocks::Session)
                            .col(AttendanceSessionLocks::CohortNumber),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceSessionLocks::Table).to_owned())
            .await
    }
}
