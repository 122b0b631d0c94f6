//! Service listings.
use models::payment;
use models::service::{self, NewService};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::users::get_user;

#[derive(Clone, Debug, Default)]
pub struct ServiceFilter {
    pub provider_id: Option<Uuid>,
    pub category: Option<String>,
    /// case-insensitive substring of name or description
    pub q: Option<String>,
}

fn like_pattern(q: &str) -> String {
    let escaped = q.trim().to_lowercase().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewService) -> Result<service::Model, ServiceError> {
    service::validate(&input)?;
    get_user(db, input.provider_id).await.map_err(|_| ServiceError::not_found("provider"))?;
    let created = service::create(db, input).await?;
    info!(service_id = %created.id, provider_id = %created.provider_id, "service_created");
    Ok(created)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service::Model, ServiceError> {
    service::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("service"))
}

/// Newest first.
pub async fn list<C: ConnectionTrait>(db: &C, filter: ServiceFilter) -> Result<Vec<service::Model>, ServiceError> {
    let mut cond = Condition::all();
    if let Some(p) = filter.provider_id {
        cond = cond.add(service::Column::ProviderId.eq(p));
    }
    if let Some(c) = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        cond = cond.add(service::Column::Category.eq(c));
    }
    if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = like_pattern(q);
        cond = cond.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(service::Column::Name))).like(LikeExpr::new(pattern.clone()).escape('\\')))
                .add(Expr::expr(Func::lower(Expr::col(service::Column::Description))).like(LikeExpr::new(pattern).escape('\\'))),
        );
    }
    Ok(service::Entity::find()
        .filter(cond)
        .order_by_desc(service::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Distinct categories, sorted.
pub async fn categories<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, ServiceError> {
    Ok(service::Entity::find()
        .select_only()
        .column(service::Column::Category)
        .distinct()
        .order_by_asc(service::Column::Category)
        .into_tuple::<String>()
        .all(db)
        .await?)
}

/// Remove a listing and its bookings. Listings with payment history stay, the
/// money trail keeps pointing at them.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    let paid = payment::Entity::find().filter(payment::Column::ServiceId.eq(id)).count(db).await?;
    if paid > 0 {
        return Err(ServiceError::Conflict(format!("service has {} payment(s) and cannot be deleted", paid)));
    }
    // a payment racing in after the count blocks the booking cascade instead
    let res = service::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("service"));
    }
    info!(service_id = %id, "service_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::{self, parse_date, NewBooking};
    use crate::payments::{mock::MockGateway, service::PaymentService};
    use crate::test_support::{cleanup_users, get_db, make_service, make_user};
    use std::sync::Arc;
    use models::user::{self, Role};

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 50%_Off "), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn service_catalog_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = make_user(&db, Role::Business).await?;
        let category = format!("Cat-{}", Uuid::new_v4());

        let s = create(&db, NewService {
            provider_id: owner.id,
            name: "Gutter Cleaning".into(),
            category: category.clone(),
            description: "Removes LEAVES and debris".into(),
            price_cents: 4_500,
            location: "Eastside".into(),
            phone: "555-0110".into(),
            image: None,
        }).await?;

        let by_q = list(&db, ServiceFilter { q: Some("leaves".into()), provider_id: Some(owner.id), ..Default::default() }).await?;
        assert_eq!(by_q.len(), 1);
        let by_cat = list(&db, ServiceFilter { category: Some(category.clone()), ..Default::default() }).await?;
        assert_eq!(by_cat[0].id, s.id);
        assert!(categories(&db).await?.contains(&category));

        let missing_provider = create(&db, NewService { provider_id: Uuid::new_v4(), ..NewService {
            provider_id: owner.id, name: "x".into(), category: "y".into(), description: "z".into(),
            price_cents: 1, location: "l".into(), phone: "p".into(), image: None,
        } }).await;
        assert!(matches!(missing_provider, Err(ServiceError::NotFound(_))));

        delete(&db, s.id).await?;
        assert!(matches!(get(&db, s.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete(&db, s.id).await, Err(ServiceError::NotFound(_))));

        user::Entity::delete_by_id(owner.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn paid_listing_cannot_be_deleted() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let owner = make_user(&db, Role::Business).await?;
        let customer = make_user(&db, Role::Customer).await?;
        let listing = make_service(&db, &owner, 2_500).await?;
        let b = bookings::create(&db, NewBooking {
            customer_id: customer.id,
            service_id: listing.id,
            provider_id: None,
            date: parse_date("2031-08-01T08:00:00Z")?,
        }).await?;
        PaymentService::new(db.clone(), Arc::new(MockGateway::new()), "usd", 1000).create_intent(b.id, None).await?;

        let res = delete(&db, listing.id).await;
        assert!(matches!(res, Err(ServiceError::Conflict(m)) if m.contains("payment")));
        assert_eq!(get(&db, listing.id).await?.id, listing.id);
        assert_eq!(bookings::get(&db, b.id).await?.service_id, listing.id);

        // a listing with only unpaid bookings goes, bookings with it
        let unpaid = make_service(&db, &owner, 900).await?;
        let ub = bookings::create(&db, NewBooking {
            customer_id: customer.id,
            service_id: unpaid.id,
            provider_id: None,
            date: parse_date("2031-08-02T08:00:00Z")?,
        }).await?;
        delete(&db, unpaid.id).await?;
        assert!(matches!(bookings::get(&db, ub.id).await, Err(ServiceError::NotFound(_))));

        cleanup_users(&db, &[owner.id, customer.id]).await?;
        Ok(())
    }
}
