use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use common::types::Ack;
use models::contact::{self, ContactStatus, NewContact};
use serde::{Deserialize, Serialize};
use service::contacts::{self, ContactPage};
use service::pagination::Pagination;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ContactInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct StatusInput {
    pub status: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactAck {
    #[serde(flatten)]
    pub ack: Ack,
    pub contact: contact::Model,
}

#[utoipa::path(post, path = "/api/contacts", tag = "contacts", request_body = ContactInput, responses((status = 201, description = "Received"), (status = 400, description = "Validation Error")))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> Result<(StatusCode, Json<ContactAck>), JsonApiError> {
    let contact = contacts::create(
        &state.db,
        NewContact { first_name: input.first_name, last_name: input.last_name, email: input.email, message: input.message },
    )
    .await?;
    let ack = Ack::ok("Thank you for contacting us! We will get back to you soon.");
    Ok((StatusCode::CREATED, Json(ContactAck { ack, contact })))
}

#[utoipa::path(get, path = "/api/contacts", tag = "contacts", params(ListQuery), responses((status = 200, description = "Messages, newest first"), (status = 400, description = "Unknown status")))]
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Json<ContactPage>, JsonApiError> {
    let status = q.status.as_deref().filter(|s| !s.trim().is_empty()).map(str::parse::<ContactStatus>).transpose()?;
    let page = Pagination::from_page(q.page, q.limit, 10);
    Ok(Json(contacts::list(&state.db, status, page).await?))
}

#[utoipa::path(get, path = "/api/contacts/{id}", tag = "contacts", params(("id" = Uuid, Path, description = "Contact id")), responses((status = 200, description = "Found, now marked read"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<contact::Model>, JsonApiError> {
    Ok(Json(contacts::open(&state.db, id).await?))
}

#[utoipa::path(patch, path = "/api/contacts/{id}", tag = "contacts", params(("id" = Uuid, Path, description = "Contact id")), request_body = StatusInput, responses((status = 200, description = "Updated"), (status = 400, description = "Invalid status"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput>,
) -> Result<Json<ContactAck>, JsonApiError> {
    let status: ContactStatus = input.status.parse()?;
    let contact = contacts::update_status(&state.db, id, status).await?;
    Ok(Json(ContactAck { ack: Ack::ok("Contact status updated"), contact }))
}

#[utoipa::path(delete, path = "/api/contacts/{id}", tag = "contacts", params(("id" = Uuid, Path, description = "Contact id")), responses((status = 200, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Ack>, JsonApiError> {
    contacts::delete(&state.db, id).await?;
    Ok(Json(Ack::ok("Contact deleted successfully")))
}
