//! Create `service` table: listings offered by business users.
//!
//! `rating` and `review_count` are denormalized from `review`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::ProviderId).not_null())
                    .col(string_len(Service::Name, 255).not_null())
                    .col(string_len(Service::Category, 128).not_null())
                    .col(text(Service::Description).not_null())
                    .col(
                        big_integer(Service::PriceCents)
                            .not_null()
                            .check(Expr::col(Service::PriceCents).gte(0)),
                    )
                    .col(string_len(Service::Location, 255).not_null())
                    .col(string_len(Service::Phone, 32).not_null())
                    .col(text(Service::Image).not_null())
                    .col(double(Service::Rating).not_null())
                    .col(integer(Service::ReviewCount).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_provider")
                            .from(Service::Table, Service::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    ProviderId,
    Name,
    Category,
    Description,
    PriceCents,
    Location,
    Phone,
    Image,
    Rating,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
