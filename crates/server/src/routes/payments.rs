use axum::extract::{Path, State};
use axum::Json;
use models::payment;
use serde::Deserialize;
use serde_json::{json, Value};
use service::payments::service::{CheckoutIntent, PaymentView};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateIntentInput {
    pub booking_id: Uuid,
    /// `card` (default) or `upi`
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ConfirmInput {
    pub payment_intent_id: String,
    pub payment_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct WalletPayInput {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
}

#[utoipa::path(post, path = "/api/payments/create-intent", tag = "payments", request_body = CreateIntentInput, responses((status = 200, description = "Intent created"), (status = 400, description = "Booking not payable"), (status = 404, description = "Booking not found"), (status = 402, description = "Declined")))]
pub async fn create_intent(
    State(state): State<AppState>,
    Json(input): Json<CreateIntentInput>,
) -> Result<Json<CheckoutIntent>, JsonApiError> {
    Ok(Json(state.payments.create_intent(input.booking_id, input.payment_method.as_deref()).await?))
}

#[utoipa::path(post, path = "/api/payments/confirm", tag = "payments", request_body = ConfirmInput, responses((status = 200, description = "Confirmed"), (status = 400, description = "Payment not successful"), (status = 404, description = "Payment not found")))]
pub async fn confirm(State(state): State<AppState>, Json(input): Json<ConfirmInput>) -> Result<Json<Value>, JsonApiError> {
    let payment = state.payments.confirm(&input.payment_intent_id, input.payment_id).await?;
    Ok(Json(json!({ "success": true, "message": "Payment confirmed successfully", "payment": payment })))
}

#[utoipa::path(post, path = "/api/payments/pay-with-wallet", tag = "payments", request_body = WalletPayInput, responses((status = 200, description = "Paid"), (status = 400, description = "Insufficient wallet balance"), (status = 404, description = "Booking not found")))]
pub async fn pay_with_wallet(State(state): State<AppState>, Json(input): Json<WalletPayInput>) -> Result<Json<Value>, JsonApiError> {
    let out = state.payments.pay_with_wallet(input.booking_id, input.customer_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Payment successful using wallet",
        "payment": out.payment,
        "booking": out.booking,
        "new_balance_cents": out.remaining_balance_cents,
    })))
}

#[utoipa::path(get, path = "/api/payments/history/{user_id}", tag = "payments", params(("user_id" = Uuid, Path, description = "Customer or provider id")), responses((status = 200, description = "Payments, newest first")))]
pub async fn history(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<Json<Vec<PaymentView>>, JsonApiError> {
    Ok(Json(state.payments.history(user_id).await?))
}

#[utoipa::path(get, path = "/api/payments/{id}", tag = "payments", params(("id" = Uuid, Path, description = "Payment id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<payment::Model>, JsonApiError> {
    Ok(Json(state.payments.get(id).await?))
}

#[utoipa::path(post, path = "/api/payments/{id}/refund", tag = "payments", params(("id" = Uuid, Path, description = "Payment id")), responses((status = 200, description = "Refunded"), (status = 400, description = "Not refundable"), (status = 404, description = "Not Found")))]
pub async fn refund(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, JsonApiError> {
    let payment = state.payments.refund(id).await?;
    Ok(Json(json!({ "success": true, "message": "Payment refunded successfully", "payment": payment })))
}
