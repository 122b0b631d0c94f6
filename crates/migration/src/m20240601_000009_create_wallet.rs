//! Create `wallet` table. One wallet per user, balance never negative.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallet::Table)
                    .if_not_exists()
                    .col(uuid(Wallet::Id).primary_key())
                    .col(uuid(Wallet::UserId).not_null().unique_key())
                    .col(
                        big_integer(Wallet::BalanceCents)
                            .not_null()
                            .check(Expr::col(Wallet::BalanceCents).gte(0)),
                    )
                    .col(big_integer(Wallet::TotalAddedCents).not_null())
                    .col(big_integer(Wallet::TotalSpentCents).not_null())
                    .col(big_integer(Wallet::TotalRefundedCents).not_null())
                    .col(timestamp_with_time_zone(Wallet::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Wallet::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_user")
                            .from(Wallet::Table, Wallet::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallet::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wallet {
    Table,
    Id,
    UserId,
    BalanceCents,
    TotalAddedCents,
    TotalSpentCents,
    TotalRefundedCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
