//! Create `contact` table for messages sent from the public contact form.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(uuid(Contact::Id).primary_key())
                    .col(string_len(Contact::FirstName, 128).not_null())
                    .col(string_len(Contact::LastName, 128).not_null())
                    .col(string_len(Contact::Email, 255).not_null())
                    .col(text(Contact::Message).not_null())
                    .col(string_len(Contact::Status, 16).not_null())
                    .col(boolean(Contact::IsRead).not_null())
                    .col(timestamp_with_time_zone_null(Contact::ReadAt))
                    .col(timestamp_with_time_zone_null(Contact::RepliedAt))
                    .col(timestamp_with_time_zone(Contact::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Contact::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contact::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Contact {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Message,
    Status,
    IsRead,
    ReadAt,
    RepliedAt,
    CreatedAt,
    UpdatedAt,
}
