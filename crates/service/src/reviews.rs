//! Reviews and the denormalized rating on each service.
use chrono::Utc;
use models::{review, service};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Clone, Debug)]
pub struct NewReview {
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
}

/// Mean of `ratings` rounded to one decimal place; 0.0 when empty.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

pub async fn list_for_service<C: ConnectionTrait>(db: &C, service_id: Uuid) -> Result<Vec<review::Model>, ServiceError> {
    Ok(review::Entity::find()
        .filter(review::Column::ServiceId.eq(service_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Insert a review and refresh the service's rating and review count in one transaction.
pub async fn create(db: &DatabaseConnection, input: NewReview) -> Result<review::Model, ServiceError> {
    review::validate_rating(input.rating)?;
    let txn = db.begin().await?;
    // lock the service row so concurrent reviews recompute in turn
    let svc = service::Entity::find_by_id(input.service_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    let created = review::create(&txn, input.service_id, input.user_id, &input.user_name, input.rating, &input.comment).await?;

    let ratings: Vec<i32> = review::Entity::find()
        .select_only()
        .column(review::Column::Rating)
        .filter(review::Column::ServiceId.eq(input.service_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let rating = average_rating(&ratings);
    let count = ratings.len() as i32;
    let mut am: service::ActiveModel = svc.into();
    am.rating = Set(rating);
    am.review_count = Set(count);
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await?;
    txn.commit().await?;

    info!(service_id = %input.service_id, review_id = %created.id, rating, review_count = count, "review_added");
    Ok(created)
}
