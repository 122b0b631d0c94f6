use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use models::service::{self, NewService};
use serde::Deserialize;
use ::service::catalog::{self, ServiceFilter};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateServiceInput {
    pub provider_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub provider_id: Option<Uuid>,
    pub category: Option<String>,
    /// free-text match on name or description
    pub q: Option<String>,
}

#[utoipa::path(get, path = "/api/services", tag = "services", params(ListQuery), responses((status = 200, description = "Listings, newest first")))]
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<service::Model>>, JsonApiError> {
    let filter = ServiceFilter { provider_id: q.provider_id, category: q.category, q: q.q };
    Ok(Json(catalog::list(&state.db, filter).await?))
}

#[utoipa::path(post, path = "/api/services", tag = "services", request_body = CreateServiceInput, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Provider not found")))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateServiceInput>,
) -> Result<(StatusCode, Json<service::Model>), JsonApiError> {
    let created = catalog::create(
        &state.db,
        NewService {
            provider_id: input.provider_id,
            name: input.name,
            category: input.category,
            description: input.description,
            price_cents: input.price_cents,
            location: input.location,
            phone: input.phone,
            image: input.image,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/services/categories/all", tag = "services", responses((status = 200, description = "Distinct categories, sorted")))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, JsonApiError> {
    Ok(Json(catalog::categories(&state.db).await?))
}

#[utoipa::path(get, path = "/api/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Found"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<service::Model>, JsonApiError> {
    Ok(Json(catalog::get(&state.db, id).await?))
}

#[utoipa::path(delete, path = "/api/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Service has payments")))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<serde_json::Value>, JsonApiError> {
    catalog::delete(&state.db, id).await?;
    Ok(Json(serde_json::json!({ "message": "Service deleted" })))
}
