use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use models::booking::{self, BookingStatus};
use serde::Deserialize;
use service::bookings::{self, BookingView, NewBooking, Side};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateBookingInput {
    pub customer_id: Uuid,
    pub service_id: Uuid,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateBookingInput {
    pub status: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RoleQuery {
    /// `customer` or `business`; both sides when absent
    pub role: Option<String>,
}

#[utoipa::path(post, path = "/api/bookings", tag = "bookings", request_body = CreateBookingInput, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Service or customer not found")))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBookingInput>,
) -> Result<(StatusCode, Json<booking::Model>), JsonApiError> {
    let date = bookings::parse_date(&input.date)?;
    let created = bookings::create(
        &state.db,
        NewBooking { customer_id: input.customer_id, service_id: input.service_id, provider_id: input.provider_id, date },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/bookings/{user_id}", tag = "bookings", params(("user_id" = Uuid, Path, description = "User id"), RoleQuery), responses((status = 200, description = "Bookings with service and parties, soonest first")))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<RoleQuery>,
) -> Result<Json<Vec<BookingView>>, JsonApiError> {
    Ok(Json(bookings::list_for_user(&state.db, user_id, Side::from_role(q.role.as_deref())).await?))
}

#[utoipa::path(patch, path = "/api/bookings/{id}", tag = "bookings", params(("id" = Uuid, Path, description = "Booking id")), request_body = UpdateBookingInput, responses((status = 200, description = "Updated"), (status = 400, description = "Unknown status"), (status = 404, description = "Not Found"), (status = 409, description = "Transition not allowed")))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBookingInput>,
) -> Result<Json<BookingView>, JsonApiError> {
    let next: BookingStatus = input.status.parse()?;
    Ok(Json(bookings::update_status(&state.db, id, next).await?))
}
