//! Bookings and their status lifecycle.
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use models::booking::{self, BookingStatus};
use models::{service, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::users::get_user;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartySummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&user::Model> for PartySummary {
    fn from(u: &user::Model) -> Self {
        Self { id: u.id, name: u.name.clone(), email: u.email.clone() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub service: Option<service::Model>,
    pub customer: Option<PartySummary>,
    pub provider: Option<PartySummary>,
}

/// Which side of the booking a listing is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Customer,
    Provider,
    Either,
}

impl Side {
    /// `customer`, `business`/`provider`, anything else means either side.
    pub fn from_role(role: Option<&str>) -> Self {
        match role.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("customer") => Side::Customer,
            Some("business") | Some("provider") => Side::Provider,
            _ => Side::Either,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewBooking {
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub date: DateTime<FixedOffset>,
}

/// Accept RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) or a bare date (midnight UTC).
pub fn parse_date(raw: &str) -> Result<DateTime<FixedOffset>, ServiceError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = d.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    Err(ServiceError::Validation(format!("invalid date: {}", raw)))
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewBooking) -> Result<booking::Model, ServiceError> {
    let svc = service::Entity::find_by_id(input.service_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    get_user(db, input.customer_id).await.map_err(|_| ServiceError::not_found("customer"))?;
    if let Some(p) = input.provider_id {
        if p != svc.provider_id {
            return Err(ServiceError::Validation("provider_id does not match the service provider".into()));
        }
    }
    let created = booking::create(db, input.customer_id, svc.provider_id, svc.id, input.date).await?;
    info!(booking_id = %created.id, customer_id = %created.customer_id, service_id = %created.service_id, "booking_created");
    Ok(created)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<booking::Model, ServiceError> {
    booking::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("booking"))
}

/// Attach service and party summaries to a batch of bookings.
pub async fn embed<C: ConnectionTrait>(db: &C, rows: Vec<booking::Model>) -> Result<Vec<BookingView>, ServiceError> {
    let service_ids: Vec<Uuid> = rows.iter().map(|b| b.service_id).collect();
    let user_ids: Vec<Uuid> = rows.iter().flat_map(|b| [b.customer_id, b.provider_id]).collect();
    let services: HashMap<Uuid, service::Model> = service::Entity::find()
        .filter(service::Column::Id.is_in(service_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let users: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    Ok(rows
        .into_iter()
        .map(|b| BookingView {
            service: services.get(&b.service_id).cloned(),
            customer: users.get(&b.customer_id).map(PartySummary::from),
            provider: users.get(&b.provider_id).map(PartySummary::from),
            booking: b,
        })
        .collect())
}

/// Bookings for a user, soonest first.
pub async fn list_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid, side: Side) -> Result<Vec<BookingView>, ServiceError> {
    let cond = match side {
        Side::Customer => Condition::all().add(booking::Column::CustomerId.eq(user_id)),
        Side::Provider => Condition::all().add(booking::Column::ProviderId.eq(user_id)),
        Side::Either => Condition::any()
            .add(booking::Column::CustomerId.eq(user_id))
            .add(booking::Column::ProviderId.eq(user_id)),
    };
    let rows = booking::Entity::find().filter(cond).order_by_asc(booking::Column::Date).all(db).await?;
    embed(db, rows).await
}

/// Move a booking along its lifecycle. Setting the current status again is a no-op.
pub async fn update_status<C: ConnectionTrait>(db: &C, id: Uuid, next: BookingStatus) -> Result<BookingView, ServiceError> {
    let current = get(db, id).await?;
    let updated = transition(db, current, next).await?;
    let mut views = embed(db, vec![updated]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("booking"))
}

/// Apply a transition to an already loaded booking.
pub async fn transition<C: ConnectionTrait>(db: &C, current: booking::Model, next: BookingStatus) -> Result<booking::Model, ServiceError> {
    if current.status == next {
        return Ok(current);
    }
    if !current.status.can_transition_to(next) {
        return Err(ServiceError::Conflict(format!(
            "cannot change booking status from {} to {}",
            current.status.as_str(),
            next.as_str()
        )));
    }
    let from = current.status;
    let mut am: booking::ActiveModel = current.into();
    am.status = Set(next);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(booking_id = %updated.id, from = from.as_str(), to = next.as_str(), "booking_status_changed");
    Ok(updated)
}
