//! Create `login_history` table: one row per login attempt on a known account.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginHistory::Table)
                    .if_not_exists()
                    .col(uuid(LoginHistory::Id).primary_key())
                    .col(uuid(LoginHistory::UserId).not_null())
                    .col(string_len(LoginHistory::Email, 255).not_null())
                    .col(string_len(LoginHistory::Role, 16).not_null())
                    .col(timestamp_with_time_zone(LoginHistory::LoginTime).not_null())
                    .col(string_len(LoginHistory::Status, 16).not_null())
                    .col(string_len_null(LoginHistory::Reason, 255))
                    .col(string_len_null(LoginHistory::IpAddress, 64))
                    .col(text_null(LoginHistory::UserAgent))
                    .col(json_binary_null(LoginHistory::DeviceInfo))
                    .col(boolean(LoginHistory::IsAdmin).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_history_user")
                            .from(LoginHistory::Table, LoginHistory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LoginHistory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LoginHistory {
    Table,
    Id,
    UserId,
    Email,
    Role,
    LoginTime,
    Status,
    Reason,
    IpAddress,
    UserAgent,
    DeviceInfo,
    IsAdmin,
}

#[derive(DeriveIden)]
enum User { Table, Id }
