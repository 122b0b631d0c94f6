use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// customer (default), business or admin
    pub role: Option<String>,
    pub business_name: Option<String>,
    pub business_category: Option<String>,
    pub phone: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::all_users,
        crate::routes::auth::login_history,
        crate::routes::auth::login_stats,
        crate::routes::services::list,
        crate::routes::services::create,
        crate::routes::services::categories,
        crate::routes::services::get,
        crate::routes::services::delete,
        crate::routes::bookings::create,
        crate::routes::bookings::list_for_user,
        crate::routes::bookings::update,
        crate::routes::reviews::list,
        crate::routes::reviews::create,
        crate::routes::contacts::create,
        crate::routes::contacts::list,
        crate::routes::contacts::get,
        crate::routes::contacts::update,
        crate::routes::contacts::delete,
        crate::routes::payments::create_intent,
        crate::routes::payments::confirm,
        crate::routes::payments::pay_with_wallet,
        crate::routes::payments::history,
        crate::routes::payments::get,
        crate::routes::payments::refund,
        crate::routes::wallets::balance,
        crate::routes::wallets::summary,
        crate::routes::wallets::transactions,
        crate::routes::wallets::topup_intent,
        crate::routes::wallets::add_money,
        crate::routes::wallets::withdraw,
        crate::routes::invoices::create,
        crate::routes::invoices::get,
        crate::routes::invoices::list_for_user,
        crate::routes::invoices::download,
        crate::routes::invoices::mark_paid,
        crate::routes::invoices::send_email,
        crate::routes::invoices::delete,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            crate::routes::services::CreateServiceInput,
            crate::routes::bookings::CreateBookingInput,
            crate::routes::bookings::UpdateBookingInput,
            crate::routes::reviews::CreateReviewInput,
            crate::routes::contacts::ContactInput,
            crate::routes::contacts::StatusInput,
            crate::routes::payments::CreateIntentInput,
            crate::routes::payments::ConfirmInput,
            crate::routes::payments::WalletPayInput,
            crate::routes::wallets::TopupInput,
            crate::routes::wallets::AddMoneyInput,
            crate::routes::wallets::WithdrawInput,
            crate::routes::invoices::CreateInvoiceInput,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "services"),
        (name = "bookings"),
        (name = "reviews"),
        (name = "contacts"),
        (name = "payments"),
        (name = "wallets"),
        (name = "invoices")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        for p in ["/health", "/api/auth/login", "/api/payments/{id}/refund", "/api/wallets/withdraw", "/api/invoices/{id}/download"] {
            assert!(doc.paths.paths.contains_key(p), "missing {}", p);
        }
    }
}
