//! In-memory gateway used by tests and when no Stripe key is configured.
//!
//! Intents are created already `succeeded` unless the amount is listed in
//! `declined_amounts`; payouts to a destination starting with `fail` are refused.
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

use super::gateway::{CreateIntent, GatewayError, IntentStatus, PaymentGateway, PaymentIntent, Payout, Refund};

#[derive(Default)]
pub struct MockGateway {
    intents: DashMap<String, PaymentIntent>,
    refunds: DashMap<String, Refund>,
    declined_amounts: HashSet<i64>,
}

impl MockGateway {
    pub fn new() -> Self { Self::default() }

    /// Intents for these amounts stay in `requires_payment_method`.
    pub fn with_declined_amounts(amounts: impl IntoIterator<Item = i64>) -> Self {
        Self { declined_amounts: amounts.into_iter().collect(), ..Self::default() }
    }

    /// Force an intent into a given state.
    pub fn set_status(&self, intent_id: &str, status: IntentStatus) {
        if let Some(mut intent) = self.intents.get_mut(intent_id) {
            intent.status = status;
        }
    }

    pub fn refund_count(&self) -> usize { self.refunds.len() }
}

fn short_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str { "mock" }

    async fn create_intent(&self, req: CreateIntent) -> Result<PaymentIntent, GatewayError> {
        if req.amount_cents <= 0 {
            return Err(GatewayError::Declined("amount must be positive".into()));
        }
        let id = short_id("pi");
        let status = if self.declined_amounts.contains(&req.amount_cents) {
            IntentStatus::RequiresPaymentMethod
        } else {
            IntentStatus::Succeeded
        };
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret_{}", id, Uuid::new_v4().simple())),
            id: id.clone(),
            amount_cents: req.amount_cents,
            currency: req.currency,
            status,
            metadata: req.metadata.into_iter().collect(),
        };
        self.intents.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        self.intents
            .get(intent_id)
            .map(|i| i.clone())
            .ok_or_else(|| GatewayError::NotFound(intent_id.to_string()))
    }

    async fn refund(&self, intent_id: &str) -> Result<Refund, GatewayError> {
        let intent = self.retrieve_intent(intent_id).await?;
        if intent.status != IntentStatus::Succeeded {
            return Err(GatewayError::Declined("intent has not succeeded".into()));
        }
        if self.refunds.contains_key(intent_id) {
            return Err(GatewayError::Declined("charge already refunded".into()));
        }
        let refund = Refund { id: short_id("re"), status: "succeeded".into(), amount_cents: intent.amount_cents };
        self.refunds.insert(intent_id.to_string(), refund.clone());
        Ok(refund)
    }

    async fn payout(&self, amount_cents: i64, _currency: &str, destination: &str) -> Result<Payout, GatewayError> {
        if destination.trim().is_empty() || destination.starts_with("fail") {
            return Err(GatewayError::Declined("no such external account".into()));
        }
        Ok(Payout { id: short_id("po"), status: "pending".into(), amount_cents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(amount: i64) -> CreateIntent {
        CreateIntent { amount_cents: amount, currency: "usd".into(), metadata: vec![("type".into(), "wallet_topup".into())] }
    }

    #[tokio::test]
    async fn intent_roundtrip_and_refund_once() {
        let gw = MockGateway::new();
        let intent = gw.create_intent(req(2500)).await.unwrap();
        assert_eq!(intent.status, IntentStatus::Succeeded);
        assert_eq!(intent.metadata.get("type").map(String::as_str), Some("wallet_topup"));

        let fetched = gw.retrieve_intent(&intent.id).await.unwrap();
        assert_eq!(fetched.amount_cents, 2500);

        assert!(gw.refund(&intent.id).await.is_ok());
        assert!(matches!(gw.refund(&intent.id).await, Err(GatewayError::Declined(_))));
        assert_eq!(gw.refund_count(), 1);
    }

    #[tokio::test]
    async fn declined_amounts_do_not_succeed() {
        let gw = MockGateway::with_declined_amounts([999]);
        let intent = gw.create_intent(req(999)).await.unwrap();
        assert_eq!(intent.status, IntentStatus::RequiresPaymentMethod);
        assert!(gw.refund(&intent.id).await.is_err());
    }

    #[tokio::test]
    async fn payout_to_failing_destination() {
        let gw = MockGateway::new();
        assert!(gw.payout(100, "usd", "btok_ok").await.is_ok());
        assert!(gw.payout(100, "usd", "fail_token").await.is_err());
    }

    #[tokio::test]
    async fn unknown_intent_is_not_found() {
        let gw = MockGateway::new();
        assert!(matches!(gw.retrieve_intent("pi_missing").await, Err(GatewayError::NotFound(_))));
    }
}
