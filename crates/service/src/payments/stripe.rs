//! Stripe REST client (`application/x-www-form-urlencoded`, bearer secret key).
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::gateway::{CreateIntent, GatewayError, PaymentGateway, PaymentIntent, Payout, Refund};

pub struct StripeGateway {
    http: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl StripeGateway {
    pub fn new(api_base: &str, secret_key: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, GatewayError> {
        let resp = req
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| GatewayError::Transport(e.to_string()));
        }
        let body = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<StripeErrorBody>(&body).ok().map(|b| b.error);
        let message = detail
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| format!("stripe returned {}", status));
        warn!(status = status.as_u16(), code = ?detail.and_then(|d| d.code), "stripe_request_failed");
        match status.as_u16() {
            404 => Err(GatewayError::NotFound(message)),
            400 | 402 => Err(GatewayError::Declined(message)),
            _ => Err(GatewayError::Transport(message)),
        }
    }
}

/// Stripe intent ids are `pi_` plus alphanumerics; anything else never
/// reaches a request path.
fn checked_intent_id(intent_id: &str) -> Result<&str, GatewayError> {
    let well_formed = intent_id
        .strip_prefix("pi_")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if well_formed {
        Ok(intent_id)
    } else {
        Err(GatewayError::NotFound(format!("malformed payment intent id {:?}", intent_id)))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str { "stripe" }

    async fn create_intent(&self, req: CreateIntent) -> Result<PaymentIntent, GatewayError> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), req.amount_cents.to_string()),
            ("currency".into(), req.currency.clone()),
            ("payment_method_types[]".into(), "card".into()),
        ];
        for (k, v) in req.metadata {
            form.push((format!("metadata[{}]", k), v));
        }
        debug!(amount = req.amount_cents, currency = %req.currency, "stripe_create_intent");
        self.send(self.http.post(format!("{}/payment_intents", self.api_base)).form(&form)).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        let intent_id = checked_intent_id(intent_id)?;
        self.send(self.http.get(format!("{}/payment_intents/{}", self.api_base, intent_id))).await
    }

    async fn refund(&self, intent_id: &str) -> Result<Refund, GatewayError> {
        let form = [("payment_intent", checked_intent_id(intent_id)?)];
        self.send(self.http.post(format!("{}/refunds", self.api_base)).form(&form)).await
    }

    async fn payout(&self, amount_cents: i64, currency: &str, destination: &str) -> Result<Payout, GatewayError> {
        let amount = amount_cents.to_string();
        let form = [("amount", amount.as_str()), ("currency", currency), ("destination", destination)];
        self.send(self.http.post(format!("{}/payouts", self.api_base)).form(&form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_ids_are_checked() {
        assert!(checked_intent_id("pi_3OqK2aLkdIwHu7ix0Xb1c2Dd").is_ok());
        assert!(checked_intent_id("pi_mock_0a1b").is_ok());
        for bad in ["", "pi_", "ch_123", "pi_../../customers", "pi_1?expand[]=customer", "pi_1/cancel", "pi_1%2F"] {
            assert!(matches!(checked_intent_id(bad), Err(GatewayError::NotFound(_))), "{bad}");
        }
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_any_request() {
        // nothing listens here; reaching the network would surface as Transport
        let gw = StripeGateway::new("http://127.0.0.1:9/v1", "sk_test_x").unwrap();
        let res = gw.retrieve_intent("pi_1/../../balance").await;
        assert!(matches!(res, Err(GatewayError::NotFound(_))));
        assert!(matches!(gw.refund("../payouts").await, Err(GatewayError::NotFound(_))));
    }
}
