//! Create `invoice` table. Party and service details are stored as JSON
//! snapshots taken when the invoice is issued.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoice::Table)
                    .if_not_exists()
                    .col(uuid(Invoice::Id).primary_key())
                    .col(string_len(Invoice::InvoiceNumber, 32).not_null().unique_key())
                    .col(uuid(Invoice::PaymentId).not_null().unique_key())
                    .col(uuid(Invoice::BookingId).not_null())
                    .col(uuid(Invoice::CustomerId).not_null())
                    .col(uuid(Invoice::ProviderId).not_null())
                    .col(uuid(Invoice::ServiceId).not_null())
                    .col(json_binary(Invoice::ServiceDetails).not_null())
                    .col(json_binary(Invoice::CustomerDetails).not_null())
                    .col(json_binary(Invoice::ProviderDetails).not_null())
                    .col(big_integer(Invoice::SubtotalCents).not_null())
                    .col(big_integer(Invoice::PlatformFeeCents).not_null())
                    .col(big_integer(Invoice::TaxCents).not_null())
                    .col(big_integer(Invoice::TotalCents).not_null())
                    .col(string_len(Invoice::Status, 16).not_null())
                    .col(string_len(Invoice::PaymentStatus, 16).not_null())
                    .col(text_null(Invoice::PdfUrl))
                    .col(text_null(Invoice::Notes))
                    .col(timestamp_with_time_zone_null(Invoice::DueDate))
                    .col(timestamp_with_time_zone(Invoice::IssuedDate).not_null())
                    .col(timestamp_with_time_zone_null(Invoice::PaidDate))
                    .col(timestamp_with_time_zone(Invoice::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_payment")
                            .from(Invoice::Table, Invoice::PaymentId)
                            .to(Payment::Table, Payment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Invoice::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Invoice {
    Table,
    Id,
    InvoiceNumber,
    PaymentId,
    BookingId,
    CustomerId,
    ProviderId,
    ServiceId,
    ServiceDetails,
    CustomerDetails,
    ProviderDetails,
    SubtotalCents,
    PlatformFeeCents,
    TaxCents,
    TotalCents,
    Status,
    PaymentStatus,
    PdfUrl,
    Notes,
    DueDate,
    IssuedDate,
    PaidDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payment { Table, Id }
