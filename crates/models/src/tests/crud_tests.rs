use crate::db::connect;
use crate::{booking, contact, review, service, user, wallet};
use crate::booking::BookingStatus;
use crate::contact::ContactStatus;
use crate::errors::ModelError;
use crate::user::{NewUser, Role};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use anyhow::Result;
use migration::MigratorTrait;
use uuid::Uuid;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn new_user(role: Role) -> NewUser {
    NewUser {
        name: format!("User {}", Uuid::new_v4()),
        email: format!("crud_{}@Example.com", Uuid::new_v4()),
        role,
        business_name: Some("Acme Plumbing".into()),
        business_category: Some("Plumbing".into()),
        phone: None,
    }
}

/// Test user CRUD operations
#[tokio::test]
async fn test_user_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;

    let customer = user::create(&db, new_user(Role::Customer)).await?;
    assert_eq!(customer.role, Role::Customer);
    assert!(customer.email.ends_with("@example.com"));
    assert!(customer.business_name.is_none(), "business fields only kept for business users");

    let owner = user::create(&db, new_user(Role::Business)).await?;
    assert_eq!(owner.business_name.as_deref(), Some("Acme Plumbing"));

    let found = user::find_by_email(&db, &customer.email.to_uppercase()).await?;
    assert_eq!(found.map(|u| u.id), Some(customer.id));

    // duplicate email violates the unique key
    let mut dup = new_user(Role::Customer);
    dup.email = customer.email.clone();
    assert!(matches!(user::create(&db, dup).await, Err(ModelError::Conflict(_))));

    user::Entity::delete_by_id(customer.id).exec(&db).await?;
    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    Ok(())
}

/// Service, booking and review rows linked together
#[tokio::test]
async fn test_service_booking_review_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let owner = user::create(&db, new_user(Role::Business)).await?;
    let customer = user::create(&db, new_user(Role::Customer)).await?;

    let svc = service::create(
        &db,
        service::NewService {
            provider_id: owner.id,
            name: "Pipe Repair".into(),
            category: "Plumbing".into(),
            description: "Leaks and bursts".into(),
            price_cents: 8_000,
            location: "Downtown".into(),
            phone: "555-0101".into(),
            image: None,
        },
    )
    .await?;
    assert_eq!(svc.image, service::DEFAULT_IMAGE);
    assert_eq!(svc.review_count, 0);

    let b = booking::create(&db, customer.id, owner.id, svc.id, chrono::Utc::now().into()).await?;
    assert_eq!(b.status, BookingStatus::Pending);

    let mut am: booking::ActiveModel = b.clone().into();
    am.status = Set(BookingStatus::Confirmed);
    let updated = am.update(&db).await?;
    assert_eq!(updated.status, BookingStatus::Confirmed);

    let r = review::create(&db, svc.id, customer.id, "Cara", 4, "Quick and tidy").await?;
    assert_eq!(r.rating, 4);
    assert!(review::create(&db, svc.id, customer.id, "Cara", 9, "nope").await.is_err());

    // deleting the service cascades to bookings and reviews
    service::Entity::delete_by_id(svc.id).exec(&db).await?;
    assert!(booking::Entity::find_by_id(b.id).one(&db).await?.is_none());
    assert!(review::Entity::find_by_id(r.id).one(&db).await?.is_none());

    user::Entity::delete_by_id(customer.id).exec(&db).await?;
    user::Entity::delete_by_id(owner.id).exec(&db).await?;
    Ok(())
}

/// Contact create and status update
#[tokio::test]
async fn test_contact_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let c = contact::create(
        &db,
        &contact::NewContact {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "Grace@Navy.mil".into(),
            message: "Please call me back about an estimate.".into(),
        },
    )
    .await?;
    assert_eq!(c.status, ContactStatus::New);
    assert!(!c.is_read);
    assert_eq!(c.email, "grace@navy.mil");

    contact::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}

/// Wallet is unique per user
#[tokio::test]
async fn test_wallet_unique_per_user() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let u = user::create(&db, new_user(Role::Customer)).await?;
    let w = wallet::create_empty(&db, u.id).await?;
    assert_eq!(w.balance_cents, 0);
    assert!(wallet::create_empty(&db, u.id).await.is_err());

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert!(wallet::Entity::find_by_id(w.id).one(&db).await?.is_none());
    Ok(())
}
