//! Create `payment` table.
//!
//! `invoice_id` is a back-reference filled after the invoice is issued; it
//! carries no foreign key because `invoice` references `payment`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(uuid(Payment::Id).primary_key())
                    .col(uuid(Payment::BookingId).not_null())
                    .col(uuid(Payment::CustomerId).not_null())
                    .col(uuid(Payment::ProviderId).not_null())
                    .col(uuid(Payment::ServiceId).not_null())
                    .col(
                        big_integer(Payment::AmountCents)
                            .not_null()
                            .check(Expr::col(Payment::AmountCents).gte(0)),
                    )
                    .col(string_len(Payment::Currency, 8).not_null())
                    .col(string_len_null(Payment::StripePaymentIntentId, 255).unique_key())
                    .col(string_len(Payment::Status, 16).not_null())
                    .col(string_len(Payment::PaymentMethod, 16).not_null())
                    .col(text(Payment::Description).not_null())
                    .col(uuid_null(Payment::InvoiceId))
                    .col(big_integer(Payment::PlatformFeeCents).not_null())
                    .col(big_integer(Payment::ProviderAmountCents).not_null())
                    .col(timestamp_with_time_zone(Payment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone_null(Payment::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_booking")
                            .from(Payment::Table, Payment::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_customer")
                            .from(Payment::Table, Payment::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Payment {
    Table,
    Id,
    BookingId,
    CustomerId,
    ProviderId,
    ServiceId,
    AmountCents,
    Currency,
    StripePaymentIntentId,
    Status,
    PaymentMethod,
    Description,
    InvoiceId,
    PlatformFeeCents,
    ProviderAmountCents,
    CreatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Booking { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
