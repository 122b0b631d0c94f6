//! Payment gateway seam.
//!
//! Amounts cross this boundary in the smallest currency unit (cents).
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The processor refused the operation (card declined, bad destination, ...).
    #[error("declined: {0}")]
    Declined(String),
    #[error("unknown payment intent: {0}")]
    NotFound(String),
    /// Network failure or an unreadable response.
    #[error("transport: {0}")]
    Transport(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    #[serde(rename = "amount")]
    pub amount_cents: i64,
    pub currency: String,
    pub status: IntentStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct CreateIntent {
    pub amount_cents: i64,
    pub currency: String,
    pub metadata: Vec<(String, String)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub status: String,
    #[serde(rename = "amount")]
    pub amount_cents: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub status: String,
    #[serde(rename = "amount")]
    pub amount_cents: i64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_intent(&self, req: CreateIntent) -> Result<PaymentIntent, GatewayError>;

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError>;

    /// Refund the full captured amount of an intent.
    async fn refund(&self, intent_id: &str) -> Result<Refund, GatewayError>;

    /// Send funds to an external bank account token.
    async fn payout(&self, amount_cents: i64, currency: &str, destination: &str) -> Result<Payout, GatewayError>;
}
