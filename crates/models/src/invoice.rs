//! Invoices issued for payments. Party and service details are copied in at
//! issue time so later profile edits do not rewrite history.
use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::payment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "viewed")]
    Viewed,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum InvoicePaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl InvoicePaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoicePaymentStatus::Pending => "pending",
            InvoicePaymentStatus::Paid => "paid",
            InvoicePaymentStatus::Overdue => "overdue",
            InvoicePaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ServiceSnapshot {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub date: Option<DateTimeWithTimeZone>,
    pub location: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct CustomerSnapshot {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ProviderSnapshot {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    #[sea_orm(unique)]
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub service_details: ServiceSnapshot,
    #[sea_orm(column_type = "JsonBinary")]
    pub customer_details: CustomerSnapshot,
    #[sea_orm(column_type = "JsonBinary")]
    pub provider_details: ProviderSnapshot,
    pub subtotal_cents: i64,
    pub platform_fee_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub status: InvoiceStatus,
    pub payment_status: InvoicePaymentStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub pdf_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub issued_date: DateTimeWithTimeZone,
    pub paid_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Payment }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Payment => Entity::belongs_to(payment::Entity).from(Column::PaymentId).to(payment::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
