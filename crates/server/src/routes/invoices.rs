use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Ack;
use models::invoice;
use serde::Deserialize;
use serde_json::{json, Value};
use service::invoices::InvoicePage;
use service::pagination::Pagination;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateInvoiceInput {
    pub payment_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UserInvoicesQuery {
    /// `customer` (default) or `provider`
    pub role: Option<String>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

#[utoipa::path(post, path = "/api/invoices/create", tag = "invoices", request_body = CreateInvoiceInput, responses((status = 200, description = "Created or existing invoice"), (status = 404, description = "Payment not found")))]
pub async fn create(State(state): State<AppState>, Json(input): Json<CreateInvoiceInput>) -> Result<Json<Value>, JsonApiError> {
    let invoice = state.invoices.create(input.payment_id).await?;
    Ok(Json(json!({ "success": true, "message": "Invoice created successfully", "invoice": invoice })))
}

#[utoipa::path(get, path = "/api/invoices/{id}", tag = "invoices", params(("id" = Uuid, Path, description = "Invoice id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<invoice::Model>, JsonApiError> {
    Ok(Json(state.invoices.get(id).await?))
}

#[utoipa::path(get, path = "/api/invoices/user/{user_id}", tag = "invoices", params(("user_id" = Uuid, Path, description = "User id"), UserInvoicesQuery), responses((status = 200, description = "Invoices, newest issued first")))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<UserInvoicesQuery>,
) -> Result<Json<InvoicePage>, JsonApiError> {
    let page = Pagination::from_skip(q.limit, q.skip, 20);
    Ok(Json(state.invoices.list_for_user(user_id, q.role.as_deref(), page).await?))
}

#[utoipa::path(get, path = "/api/invoices/{id}/download", tag = "invoices", params(("id" = Uuid, Path, description = "Invoice id")), responses((status = 200, description = "PDF file", content_type = "application/pdf"), (status = 404, description = "Invoice or file missing")))]
pub async fn download(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, JsonApiError> {
    let file = state.invoices.download(id).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok(([(header::CONTENT_TYPE, "application/pdf".to_string()), (header::CONTENT_DISPOSITION, disposition)], file.bytes).into_response())
}

#[utoipa::path(patch, path = "/api/invoices/{id}/mark-paid", tag = "invoices", params(("id" = Uuid, Path, description = "Invoice id")), responses((status = 200, description = "Marked paid"), (status = 404, description = "Not Found")))]
pub async fn mark_paid(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, JsonApiError> {
    let invoice = state.invoices.mark_paid(id).await?;
    Ok(Json(json!({ "success": true, "message": "Invoice marked as paid", "invoice": invoice })))
}

#[utoipa::path(post, path = "/api/invoices/{id}/send-email", tag = "invoices", params(("id" = Uuid, Path, description = "Invoice id")), responses((status = 200, description = "Marked sent"), (status = 404, description = "Not Found")))]
pub async fn send_email(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, JsonApiError> {
    let invoice = state.invoices.send_email(id).await?;
    let message = format!("Invoice sent to {}", invoice.customer_details.email);
    Ok(Json(json!({ "success": true, "message": message, "invoice": invoice })))
}

#[utoipa::path(delete, path = "/api/invoices/{id}", tag = "invoices", params(("id" = Uuid, Path, description = "Invoice id")), responses((status = 200, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Ack>, JsonApiError> {
    state.invoices.delete(id).await?;
    Ok(Json(Ack::ok("Invoice deleted successfully")))
}
