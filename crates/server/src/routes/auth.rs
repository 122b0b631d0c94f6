use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use service::auth::domain::{AuthSession, AuthUser, LoginContext, LoginInput, RegisterInput};
use service::users::{self, LoginStats, UsersByRole};
use tracing::info;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Client address from `X-Forwarded-For` (first hop) or `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Bearer token from the `Authorization` header, falling back to the auth cookie.
pub fn bearer_token(headers: &HeaderMap, jar: &CookieJar) -> Result<String, JsonApiError> {
    if let Some(h) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return h
            .strip_prefix("Bearer ")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| JsonApiError::unauthorized("expected Authorization: Bearer <token>"));
    }
    jar.get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| JsonApiError::unauthorized("No token provided"))
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.auth.register(input).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((StatusCode::CREATED, jar, Json(session)))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let ctx = LoginContext {
        ip_address: client_ip(&headers),
        user_agent: headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
    };
    let session = state.auth.login(input, ctx).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, Json(session)))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Result<Json<AuthUser>, JsonApiError> {
    let token = bearer_token(&headers, &jar)?;
    Ok(Json(state.auth.current_user(&token).await?))
}

#[utoipa::path(get, path = "/api/auth/users/all", tag = "auth", responses((status = 200, description = "Users grouped by role")))]
pub async fn all_users(State(state): State<AppState>) -> Result<Json<UsersByRole>, JsonApiError> {
    Ok(Json(users::list_grouped(&state.db).await?))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    pub user_id: Option<Uuid>,
    pub limit: Option<u64>,
}

#[utoipa::path(get, path = "/api/auth/login-history", tag = "auth", params(HistoryQuery), responses((status = 200, description = "Login attempts, newest first")))]
pub async fn login_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<models::login_history::Model>>, JsonApiError> {
    let rows = users::login_history(&state.db, q.user_id, q.limit.unwrap_or(100)).await?;
    info!(count = rows.len(), "login_history_listed");
    Ok(Json(rows))
}

#[utoipa::path(get, path = "/api/auth/login-stats", tag = "auth", responses((status = 200, description = "Login statistics")))]
pub async fn login_stats(State(state): State<AppState>) -> Result<Json<LoginStats>, JsonApiError> {
    Ok(Json(users::login_stats(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut h = HeaderMap::new();
        h.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&h).as_deref(), Some("203.0.113.7"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_header_then_cookie() {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&h, &CookieJar::new()).unwrap(), "abc");

        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, "from-cookie"));
        assert_eq!(bearer_token(&HeaderMap::new(), &jar).unwrap(), "from-cookie");

        let mut bad = HeaderMap::new();
        bad.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&bad, &jar).is_err());
        assert!(bearer_token(&HeaderMap::new(), &CookieJar::new()).is_err());
    }
}
