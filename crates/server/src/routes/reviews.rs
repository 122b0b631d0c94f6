use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use models::review;
use serde::Deserialize;
use service::reviews::{self, NewReview};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateReviewInput {
    pub service_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub user_name: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

#[utoipa::path(get, path = "/api/reviews/{service_id}", tag = "reviews", params(("service_id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Reviews, newest first")))]
pub async fn list(State(state): State<AppState>, Path(service_id): Path<Uuid>) -> Result<Json<Vec<review::Model>>, JsonApiError> {
    Ok(Json(reviews::list_for_service(&state.db, service_id).await?))
}

#[utoipa::path(post, path = "/api/reviews", tag = "reviews", request_body = CreateReviewInput, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Service not found")))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateReviewInput>,
) -> Result<(StatusCode, Json<review::Model>), JsonApiError> {
    let created = reviews::create(
        &state.db,
        NewReview {
            service_id: input.service_id,
            user_id: input.user_id,
            user_name: input.user_name,
            rating: input.rating,
            comment: input.comment,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
