use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AttendanceCodes {
    Table,
    Id,
    Code,
    CohortNumber,
    Session,
    GeneratedAt,
    ExpiresAt,
    Active,
    GeneratedBy,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601050002_create_attendance_codes"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceCodes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceCodes::Code).string_len(32).not_null())
                    .col(ColumnDef::new(AttendanceCodes::CohortNumber).integer().not_null())
                    .col(ColumnDef::new(AttendanceCodes::Session).string_len(16).not_null())
                    .col(
                        ColumnDef::new(AttendanceCodes::GeneratedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceCodes::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(AttendanceCodes::GeneratedBy).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_codes_scope")
                    .table(AttendanceCodes::Table)
                    .col(AttendanceCodes::CohortNumber)
                    .col(AttendanceCodes::Session)
                    .col(AttendanceCodes::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceCodes::Table).to_owned())
            .await
    }
}
