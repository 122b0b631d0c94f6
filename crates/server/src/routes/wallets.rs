use axum::extract::{Path, Query, State};
use axum::Json;
use models::wallet_transaction::TxnKind;
use serde::Deserialize;
use serde_json::{json, Value};
use service::pagination::Pagination;
use service::wallets::service::{TopupIntent, TransactionList, WalletSummary};
use service::wallets::WalletBalance;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TransactionsQuery {
    /// credit, debit or refund
    pub kind: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TopupInput {
    pub user_id: Uuid,
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddMoneyInput {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub payment_intent_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct WithdrawInput {
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub bank_account_token: String,
}

#[utoipa::path(get, path = "/api/wallets/balance/{user_id}", tag = "wallets", params(("user_id" = Uuid, Path, description = "User id")), responses((status = 200, description = "Balance and totals"), (status = 404, description = "User not found")))]
pub async fn balance(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Result<Json<WalletBalance>, JsonApiError> {
    Ok(Json(state.wallets.balance(user_id).await?))
}

#[utoipa::path(get, path = "/api/wallets/{user_id}", tag = "wallets", params(("user_id" = Uuid, Path, description = "User id"), PageQuery), responses((status = 200, description = "Wallet with a page of transactions"), (status = 404, description = "User not found")))]
pub async fn summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<PageQuery>,
) -> Result<Json<WalletSummary>, JsonApiError> {
    Ok(Json(state.wallets.summary(user_id, Pagination::from_skip(q.limit, q.skip, 20)).await?))
}

#[utoipa::path(get, path = "/api/wallets/transactions/{user_id}", tag = "wallets", params(("user_id" = Uuid, Path, description = "User id"), TransactionsQuery), responses((status = 200, description = "Transactions, newest first"), (status = 400, description = "Unknown kind")))]
pub async fn transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<TransactionsQuery>,
) -> Result<Json<TransactionList>, JsonApiError> {
    let kind = q.kind.as_deref().filter(|k| !k.trim().is_empty()).map(str::parse::<TxnKind>).transpose()?;
    Ok(Json(state.wallets.transactions(user_id, kind, q.limit.unwrap_or(50)).await?))
}

#[utoipa::path(post, path = "/api/wallets/topup-intent", tag = "wallets", request_body = TopupInput, responses((status = 200, description = "Intent created"), (status = 400, description = "Invalid amount"), (status = 404, description = "User not found")))]
pub async fn topup_intent(State(state): State<AppState>, Json(input): Json<TopupInput>) -> Result<Json<TopupIntent>, JsonApiError> {
    Ok(Json(state.wallets.topup_intent(input.user_id, input.amount_cents).await?))
}

#[utoipa::path(post, path = "/api/wallets/add-money", tag = "wallets", request_body = AddMoneyInput, responses((status = 200, description = "Credited"), (status = 400, description = "Payment not successful"), (status = 409, description = "Intent already applied")))]
pub async fn add_money(State(state): State<AppState>, Json(input): Json<AddMoneyInput>) -> Result<Json<Value>, JsonApiError> {
    let moved = state.wallets.add_money(input.user_id, input.amount_cents, &input.payment_intent_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Money added to wallet successfully",
        "new_balance_cents": moved.wallet.balance_cents,
        "wallet": moved.wallet,
        "transaction": moved.transaction,
    })))
}

#[utoipa::path(post, path = "/api/wallets/withdraw", tag = "wallets", request_body = WithdrawInput, responses((status = 200, description = "Withdrawal initiated"), (status = 400, description = "Insufficient balance or bank transfer failed")))]
pub async fn withdraw(State(state): State<AppState>, Json(input): Json<WithdrawInput>) -> Result<Json<Value>, JsonApiError> {
    let out = state.wallets.withdraw(input.user_id, input.amount_cents, &input.bank_account_token).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Withdrawal initiated successfully",
        "payout_id": out.payout_id,
        "new_balance_cents": out.wallet.balance_cents,
        "transaction": out.transaction,
    })))
}
