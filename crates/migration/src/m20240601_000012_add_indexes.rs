use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, columns)
const INDEXES: &[(&str, &str, &[&str])] = &[
    ("idx_service_provider", "service", &["provider_id"]),
    ("idx_service_category", "service", &["category"]),
    ("idx_booking_customer", "booking", &["customer_id"]),
    ("idx_booking_provider", "booking", &["provider_id"]),
    ("idx_review_service", "review", &["service_id"]),
    ("idx_contact_status", "contact", &["status"]),
    ("idx_login_history_user_time", "login_history", &["user_id", "login_time"]),
    ("idx_login_history_email_time", "login_history", &["email", "login_time"]),
    ("idx_login_history_role_time", "login_history", &["role", "login_time"]),
    ("idx_payment_customer", "payment", &["customer_id"]),
    ("idx_payment_provider", "payment", &["provider_id"]),
    ("idx_payment_booking", "payment", &["booking_id"]),
    ("idx_wallet_txn_wallet_time", "wallet_transaction", &["wallet_id", "created_at"]),
    ("idx_invoice_customer", "invoice", &["customer_id"]),
    ("idx_invoice_provider", "invoice", &["provider_id"]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, cols) in INDEXES {
            let mut index = Index::create();
            index.name(*name).table(Alias::new(*table)).if_not_exists();
            for col in cols.iter() {
                index.col(Alias::new(*col));
            }
            manager.create_index(index.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
