use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum LeaveRequests {
    Table,
    Id,
    UserId,
    LeaveType,
    Session,
    Date,
    Reason,
    Status,
    ReviewedBy,
    ReviewedAt,
    ReviewNotes,
    IsManualEntry,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601050005_create_leave_requests"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaveRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaveRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeaveRequests::UserId).big_integer().not_null())
                    .col(ColumnDef::new(LeaveRequests::LeaveType).string_len(16).not_null())
                    .col(ColumnDef::new(LeaveRequests::Session).string_len(16).null())
                    .col(ColumnDef::new(LeaveRequests::Date).date().not_null())
                    .col(ColumnDef::new(LeaveRequests::Reason).text().not_null())
                    .col(
                        ColumnDef::new(LeaveRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(LeaveRequests::ReviewedBy).big_integer().null())
                    .col(
                        ColumnDef::new(LeaveRequests::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(LeaveRequests::ReviewNotes).text().null())
                    .col(
                        ColumnDef::new(LeaveRequests::IsManualEntry)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LeaveRequests::CreatedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(LeaveRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_requests_user")
                            .from(LeaveRequests::Table, LeaveRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeaveRequests::Table).to_owned())
            .await
    }
}
