//! Messages from the public contact form.
use chrono::Utc;
use models::contact::{self, ContactStatus, NewContact};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContactPage {
    pub contacts: Vec<contact::Model>,
    pub pagination: PageInfo,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewContact) -> Result<contact::Model, ServiceError> {
    let created = contact::create(db, &input).await?;
    info!(contact_id = %created.id, "contact_received");
    Ok(created)
}

/// Newest first, optionally filtered by status.
pub async fn list<C: ConnectionTrait>(db: &C, status: Option<ContactStatus>, page: Pagination) -> Result<ContactPage, ServiceError> {
    let mut q = contact::Entity::find();
    if let Some(s) = status {
        q = q.filter(contact::Column::Status.eq(s));
    }
    let total = q.clone().count(db).await?;
    let contacts = q
        .order_by_desc(contact::Column::CreatedAt)
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok(ContactPage {
        contacts,
        pagination: PageInfo { page: page.page(), limit: page.limit, total, pages: page.pages(total) },
    })
}

/// Fetch one message; the first read stamps `is_read`/`read_at` and moves `new` to `read`.
pub async fn open<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<contact::Model, ServiceError> {
    let found = contact::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("contact"))?;
    if found.is_read {
        return Ok(found);
    }
    let now = Utc::now().into();
    let was_new = found.status == ContactStatus::New;
    let mut am: contact::ActiveModel = found.into();
    am.is_read = Set(true);
    am.read_at = Set(Some(now));
    if was_new {
        am.status = Set(ContactStatus::Read);
    }
    am.updated_at = Set(now);
    Ok(am.update(db).await?)
}

pub async fn update_status<C: ConnectionTrait>(db: &C, id: Uuid, status: ContactStatus) -> Result<contact::Model, ServiceError> {
    let found = contact::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("contact"))?;
    let now = Utc::now().into();
    let mut am: contact::ActiveModel = found.into();
    am.status = Set(status);
    match status {
        ContactStatus::Replied => am.replied_at = Set(Some(now)),
        ContactStatus::Read => {
            am.is_read = Set(true);
        }
        ContactStatus::New => {}
    }
    am.updated_at = Set(now);
    let updated = am.update(db).await?;
    info!(contact_id = %id, status = ?status, "contact_status_changed");
    Ok(updated)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    let res = contact::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("contact"));
    }
    Ok(())
}
