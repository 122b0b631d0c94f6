#![allow(dead_code)]
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::Value;
use service::auth::service::AuthConfig;
use service::payments::mock::MockGateway;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

use server::routes;
use server::state::AppState;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<MockGateway>,
    pub invoice_dir: std::path::PathBuf,
}

pub async fn build_app() -> anyhow::Result<TestApp> {
    let db = models::db::connect().await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;

    let invoice_dir = std::env::temp_dir().join(format!("servicedir-it-{}", Uuid::new_v4()));
    let mut cfg = configs::AppConfig::default();
    cfg.storage.invoice_dir = invoice_dir.to_string_lossy().to_string();
    cfg.payments.currency = "usd".into();
    cfg.payments.platform_fee_bps = 1000;

    let gateway = Arc::new(MockGateway::new());
    let state = AppState::new(db, gateway.clone(), AuthConfig::with_secret("test-secret"), &cfg);
    let router = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive());
    Ok(TestApp { router, gateway, invoice_dir })
}

/// Send one request through the router and decode the JSON body (Null when empty or not JSON).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, json))
}

pub fn id_of(v: &Value) -> Uuid {
    v["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()).unwrap_or_default()
}

pub fn unique_email(tag: &str) -> String {
    format!("{}_{}@example.com", tag, Uuid::new_v4())
}
