use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::invoices::InvoiceService;
use service::payments::{PaymentGateway, PaymentService};
use service::wallets::WalletService;

pub type Auth = AuthService<SeaOrmAuthRepository>;

/// Shared handler state. Cloning is cheap: every member is a pool or an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: Arc<Auth>,
    pub payments: PaymentService,
    pub wallets: WalletService,
    pub invoices: InvoiceService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, gateway: Arc<dyn PaymentGateway>, auth: AuthConfig, cfg: &configs::AppConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        Self {
            auth: Arc::new(AuthService::new(repo, auth)),
            payments: PaymentService::new(db.clone(), gateway.clone(), &cfg.payments.currency, cfg.payments.platform_fee_bps),
            wallets: WalletService::new(db.clone(), gateway, &cfg.payments.currency),
            invoices: InvoiceService::new(db.clone(), cfg.storage.invoice_dir.clone()),
            db,
        }
    }
}
