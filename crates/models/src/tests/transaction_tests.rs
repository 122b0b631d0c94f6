use crate::db::connect;
use crate::user::{self, NewUser, Role};
use crate::wallet;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use migration::MigratorTrait;
use anyhow::Result;
use uuid::Uuid;

/// Setup test database
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn customer(db: &DatabaseConnection) -> Result<user::Model> {
    Ok(user::create(
        db,
        NewUser {
            name: "Tx Tester".into(),
            email: format!("tx_{}@example.com", Uuid::new_v4()),
            role: Role::Customer,
            business_name: None,
            business_category: None,
            phone: None,
        },
    )
    .await?)
}

/// Test basic transaction commit
#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let u = customer(&db).await?;

    let txn = db.begin().await?;
    let w = wallet::create_empty(&txn, u.id).await?;
    txn.commit().await?;

    assert!(wallet::Entity::find_by_id(w.id).one(&db).await?.is_some());
    user::Entity::delete_by_id(u.id).exec(&db).await?;
    Ok(())
}

/// Test transaction rollback
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let u = customer(&db).await?;

    let txn = db.begin().await?;
    let w = wallet::create_empty(&txn, u.id).await?;
    txn.rollback().await?;

    assert!(wallet::Entity::find_by_id(w.id).one(&db).await?.is_none());
    user::Entity::delete_by_id(u.id).exec(&db).await?;
    Ok(())
}

/// The balance check constraint rejects negative balances.
#[tokio::test]
async fn test_negative_balance_rejected() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let u = customer(&db).await?;
    let w = wallet::create_empty(&db, u.id).await?;

    let mut am: wallet::ActiveModel = w.clone().into();
    am.balance_cents = Set(-1);
    assert!(am.update(&db).await.is_err());

    let reloaded = wallet::Entity::find_by_id(w.id).one(&db).await?.expect("wallet");
    assert_eq!(reloaded.balance_cents, 0);
    user::Entity::delete_by_id(u.id).exec(&db).await?;
    Ok(())
}
