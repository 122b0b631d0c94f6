#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::user::{self, NewUser, Role};
use uuid::Uuid;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_init(|| async {
            let mut cfg = DatabaseConfig::from_file().unwrap_or_else(DatabaseConfig::from_env);
            cfg.max_connections = cfg.max_connections.max(10);
            cfg.min_connections = cfg.min_connections.min(1);
            let db = connect_with_config(&cfg).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    let mut cfg = DatabaseConfig::from_file().unwrap_or_else(DatabaseConfig::from_env);
    cfg.max_connections = cfg.max_connections.max(20);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout = std::time::Duration::from_secs(10);
    let db = connect_with_config(&cfg).await?;
    Ok(db)
}

/// Insert a throwaway account with a unique address.
pub async fn make_user(db: &DatabaseConnection, role: Role) -> Result<user::Model, anyhow::Error> {
    Ok(user::create(
        db,
        NewUser {
            name: format!("{} tester", role.as_str()),
            email: format!("svc_{}@example.com", Uuid::new_v4()),
            role,
            business_name: (role == Role::Business).then(|| "Tester & Co".to_string()),
            business_category: None,
            phone: Some("555-0199".into()),
        },
    )
    .await?)
}

/// A listing owned by `provider` at the given price.
pub async fn make_service(db: &DatabaseConnection, provider: &user::Model, price_cents: i64) -> Result<models::service::Model, anyhow::Error> {
    Ok(crate::catalog::create(
        db,
        models::service::NewService {
            provider_id: provider.id,
            name: "Gutter Cleaning".into(),
            category: "Home".into(),
            description: "Single storey homes".into(),
            price_cents,
            location: "Eastside".into(),
            phone: "555-0142".into(),
            image: None,
        },
    )
    .await?)
}

/// Remove everything hanging off the given users, then the users.
pub async fn cleanup_users(db: &DatabaseConnection, ids: &[Uuid]) -> Result<(), anyhow::Error> {
    use models::{booking, payment, wallet};
    use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};

    let parties = Condition::any()
        .add(payment::Column::CustomerId.is_in(ids.to_vec()))
        .add(payment::Column::ProviderId.is_in(ids.to_vec()));
    payment::Entity::delete_many().filter(parties).exec(db).await?;
    booking::Entity::delete_many().filter(booking::Column::CustomerId.is_in(ids.to_vec())).exec(db).await?;
    wallet::Entity::delete_many().filter(wallet::Column::UserId.is_in(ids.to_vec())).exec(db).await?;
    user::Entity::delete_many().filter(user::Column::Id.is_in(ids.to_vec())).exec(db).await?;
    Ok(())
}
