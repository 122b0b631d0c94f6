use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ModelError;
use crate::{booking, user};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "succeeded")]
    Succeeded,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "wallet")]
    Wallet,
    #[sea_orm(string_value = "upi")]
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "wallet" => Ok(PaymentMethod::Wallet),
            "upi" => Ok(PaymentMethod::Upi),
            other => Err(ModelError::Validation(format!("invalid payment method: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    #[sea_orm(unique)]
    pub stripe_payment_intent_id: Option<String>,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub invoice_id: Option<Uuid>,
    pub platform_fee_cents: i64,
    pub provider_amount_cents: i64,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Booking, Customer }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Booking => Entity::belongs_to(booking::Entity).from(Column::BookingId).to(booking::Column::Id).into(),
            Relation::Customer => Entity::belongs_to(user::Entity).from(Column::CustomerId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct NewPayment {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub stripe_payment_intent_id: Option<String>,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub platform_fee_cents: i64,
    pub provider_amount_cents: i64,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewPayment) -> Result<Model, ModelError> {
    if input.amount_cents < 0 {
        return Err(ModelError::Validation("amount must be >= 0".into()));
    }
    if input.platform_fee_cents + input.provider_amount_cents != input.amount_cents {
        return Err(ModelError::Validation("fee split does not add up to amount".into()));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let completed_at = (input.status == PaymentStatus::Succeeded).then_some(now);
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(input.booking_id),
        customer_id: Set(input.customer_id),
        provider_id: Set(input.provider_id),
        service_id: Set(input.service_id),
        amount_cents: Set(input.amount_cents),
        currency: Set(input.currency),
        stripe_payment_intent_id: Set(input.stripe_payment_intent_id),
        status: Set(input.status),
        payment_method: Set(input.payment_method),
        description: Set(input.description),
        invoice_id: Set(None),
        platform_fee_cents: Set(input.platform_fee_cents),
        provider_amount_cents: Set(input.provider_amount_cents),
        created_at: Set(now),
        completed_at: Set(completed_at),
    };
    Ok(am.insert(db).await?)
}
