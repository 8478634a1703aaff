use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::Role, 20))
                    .col(boolean(Users::Active).default(true))
                    .to_owned(),
            )
            .await?;

        // Create attendance_records table. The unique index on
        // matric_no is the correctness backstop for concurrent
        // duplicate submissions; the application-level existence
        // check is best effort only.
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(pk_auto(AttendanceRecords::Id))
                    .col(string(AttendanceRecords::Name))
                    .col(string(AttendanceRecords::MatricNo).unique_key())
                    .col(string(AttendanceRecords::Course))
                    .col(timestamp_with_time_zone(AttendanceRecords::Timestamp))
                    .col(boolean(AttendanceRecords::Active).default(true))
                    .col(double_null(AttendanceRecords::Latitude))
                    .col(double_null(AttendanceRecords::Longitude))
                    .col(double_null(AttendanceRecords::Accuracy))
                    .col(string_null(AttendanceRecords::LocationName))
                    .to_owned(),
            )
            .await?;

        // Index used by the newest-first record listing
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_records_timestamp")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::Timestamp)
                    .to_owned(),
            )
            .await?;

        // Create auth_sessions table
        manager
            .create_table(
                Table::create()
                    .table(AuthSessions::Table)
                    .if_not_exists()
                    .col(text(AuthSessions::Token).primary_key())
                    .col(integer(AuthSessions::UserId))
                    .col(timestamp_with_time_zone(AuthSessions::ExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auth_session_user")
                            .from(AuthSessions::Table, AuthSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    Active,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    Table,
    Id,
    Name,
    MatricNo,
    Course,
    Timestamp,
    Active,
    Latitude,
    Longitude,
    Accuracy,
    LocationName,
}

#[derive(DeriveIden)]
enum AuthSessions {
    Table,
    Token,
    UserId,
    ExpiresAt,
}
