//! Create `wallet_transaction` table: append-only ledger entries.
//!
//! `reference` holds the external id (payment intent, payout) an entry was
//! created from; the unique key stops the same intent being credited twice.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalletTransaction::Table)
                    .if_not_exists()
                    .col(uuid(WalletTransaction::Id).primary_key())
                    .col(uuid(WalletTransaction::WalletId).not_null())
                    .col(string_len(WalletTransaction::Kind, 16).not_null())
                    .col(
                        big_integer(WalletTransaction::AmountCents)
                            .not_null()
                            .check(Expr::col(WalletTransaction::AmountCents).gt(0)),
                    )
                    .col(text(WalletTransaction::Description).not_null())
                    .col(uuid_null(WalletTransaction::RelatedPaymentId))
                    .col(string_len_null(WalletTransaction::Reference, 255).unique_key())
                    .col(big_integer(WalletTransaction::BalanceAfterCents).not_null())
                    .col(timestamp_with_time_zone(WalletTransaction::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_transaction_wallet")
                            .from(WalletTransaction::Table, WalletTransaction::WalletId)
                            .to(Wallet::Table, Wallet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WalletTransaction::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WalletTransaction {
    Table,
    Id,
    WalletId,
    Kind,
    AmountCents,
    Description,
    RelatedPaymentId,
    Reference,
    BalanceAfterCents,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Wallet { Table, Id }
