use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use rand::{distributions::Alphanumeric, Rng};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::auth::service::AuthConfig;
use service::payments::mock::MockGateway;
use service::payments::stripe::StripeGateway;
use service::payments::PaymentGateway;
use service::{runtime, seed};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Stripe when a secret key is configured, otherwise the in-memory gateway.
fn build_gateway(cfg: &AppConfig) -> anyhow::Result<Arc<dyn PaymentGateway>> {
    let key = cfg.payments.stripe_secret_key.trim();
    if key.is_empty() {
        warn!("no Stripe secret key configured; using in-memory payment gateway");
        return Ok(Arc::new(MockGateway::new()));
    }
    Ok(Arc::new(StripeGateway::new(&cfg.payments.stripe_api_base, key)?))
}

/// Tokens signed with a per-process secret stop verifying after a restart.
fn auth_config(cfg: &AppConfig) -> AuthConfig {
    let mut auth = AuthConfig::from(&cfg.auth);
    if auth.jwt_secret.trim().is_empty() {
        warn!("JWT secret not configured; generated an ephemeral one");
        auth.jwt_secret = rand::thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
    }
    auth
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Connect, migrate, prepare storage and seed; returns the ready router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    migration::Migrator::up(&db, None).await?;
    info!("database migrations applied");

    runtime::ensure_storage(&cfg.storage.data_dir, &cfg.storage.invoice_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    if cfg.seed.enabled {
        let inserted = seed::seed_if_empty(&db).await?;
        info!(inserted, "seed finished");
    }

    let gateway = build_gateway(cfg)?;
    info!(gateway = gateway.name(), currency = %cfg.payments.currency, fee_bps = cfg.payments.platform_fee_bps, "payments configured");
    let state = AppState::new(db, gateway, auth_config(cfg), cfg);
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: load config, build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "servicedir listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining connections");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_replaced() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = String::new();
        let auth = auth_config(&cfg);
        assert_eq!(auth.jwt_secret.len(), 48);

        cfg.auth.jwt_secret = "configured".into();
        assert_eq!(auth_config(&cfg).jwt_secret, "configured");
    }

    #[test]
    fn mock_gateway_without_key() {
        let mut cfg = AppConfig::default();
        cfg.payments.stripe_secret_key = String::new();
        assert_eq!(build_gateway(&cfg).unwrap().name(), "mock");
        cfg.payments.stripe_secret_key = "sk_test_123".into();
        assert_eq!(build_gateway(&cfg).unwrap().name(), "stripe");
    }

    #[test]
    fn bind_addr_from_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "0.0.0.0".into();
        cfg.server.port = 8090;
        assert_eq!(bind_addr(&cfg).unwrap().port(), 8090);
    }
}
