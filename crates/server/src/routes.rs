pub mod auth;
pub mod bookings;
pub mod contacts;
pub mod invoices;
pub mod payments;
pub mod reviews;
pub mod services;
pub mod wallets;

use axum::{
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Prometheus text exposition of the money-flow counters.
pub async fn metrics() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], common::metrics::gather_text())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/users/all", get(auth::all_users))
        .route("/api/auth/login-history", get(auth::login_history))
        .route("/api/auth/login-stats", get(auth::login_stats))
        // catalog
        .route("/api/services", get(services::list).post(services::create))
        .route("/api/services/categories/all", get(services::categories))
        .route("/api/services/:id", get(services::get).delete(services::delete))
        // bookings: GET takes a user id, PATCH a booking id
        .route("/api/bookings", post(bookings::create))
        .route("/api/bookings/:id", get(bookings::list_for_user).patch(bookings::update))
        // reviews: GET takes a service id
        .route("/api/reviews", post(reviews::create))
        .route("/api/reviews/:id", get(reviews::list))
        // contacts
        .route("/api/contacts", get(contacts::list).post(contacts::create))
        .route("/api/contacts/:id", get(contacts::get).patch(contacts::update).delete(contacts::delete))
        // payments
        .route("/api/payments/create-intent", post(payments::create_intent))
        .route("/api/payments/confirm", post(payments::confirm))
        .route("/api/payments/pay-with-wallet", post(payments::pay_with_wallet))
        .route("/api/payments/history/:user_id", get(payments::history))
        .route("/api/payments/:id", get(payments::get))
        .route("/api/payments/:id/refund", post(payments::refund))
        // wallets
        .route("/api/wallets/balance/:user_id", get(wallets::balance))
        .route("/api/wallets/transactions/:user_id", get(wallets::transactions))
        .route("/api/wallets/topup-intent", post(wallets::topup_intent))
        .route("/api/wallets/add-money", post(wallets::add_money))
        .route("/api/wallets/withdraw", post(wallets::withdraw))
        .route("/api/wallets/:user_id", get(wallets::summary))
        // invoices
        .route("/api/invoices/create", post(invoices::create))
        .route("/api/invoices/user/:user_id", get(invoices::list_for_user))
        .route("/api/invoices/:id", get(invoices::get).delete(invoices::delete))
        .route("/api/invoices/:id/download", get(invoices::download))
        .route("/api/invoices/:id/mark-paid", axum::routing::patch(invoices::mark_paid))
        .route("/api/invoices/:id/send-email", post(invoices::send_email))
}

/// Build the full application router: API, health, metrics, generated PDFs and Swagger UI.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let pdfs = ServeDir::new(state.invoices.invoice_dir());

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api_routes())
        .nest_service("/invoices", pdfs)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
