//! Account listings and login history reporting.
use chrono::{Duration, Utc};
use models::login_history::{self, LoginStatus};
use models::user::{self, Role};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ServiceError;

pub async fn get_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("user"))
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct UsersByRole {
    pub customers: Vec<user::Model>,
    pub business_owners: Vec<user::Model>,
    pub admins: Vec<user::Model>,
}

/// Every account, newest first, grouped by role.
pub async fn list_grouped<C: ConnectionTrait>(db: &C) -> Result<UsersByRole, ServiceError> {
    let all = user::Entity::find().order_by_desc(user::Column::CreatedAt).all(db).await?;
    let mut out = UsersByRole::default();
    for u in all {
        match u.role {
            Role::Customer => out.customers.push(u),
            Role::Business => out.business_owners.push(u),
            Role::Admin => out.admins.push(u),
        }
    }
    Ok(out)
}

/// Newest-first login attempts, optionally for one user.
pub async fn login_history<C: ConnectionTrait>(
    db: &C,
    user_id: Option<Uuid>,
    limit: u64,
) -> Result<Vec<login_history::Model>, ServiceError> {
    let mut q = login_history::Entity::find();
    if let Some(id) = user_id {
        q = q.filter(login_history::Column::UserId.eq(id));
    }
    Ok(q.order_by_desc(login_history::Column::LoginTime).limit(limit.clamp(1, 500)).all(db).await?)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub customer: u64,
    pub business: u64,
    pub admin: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoginStats {
    pub total_logins: u64,
    pub successful: u64,
    pub failed: u64,
    pub unique_users: u64,
    pub by_role: RoleCounts,
    pub last_24h: u64,
}

pub async fn login_stats<C: ConnectionTrait>(db: &C) -> Result<LoginStats, ServiceError> {
    let count_where = |cond: sea_orm::Condition| login_history::Entity::find().filter(cond).count(db);
    let total_logins = login_history::Entity::find().count(db).await?;
    let successful = count_where(sea_orm::Condition::all().add(login_history::Column::Status.eq(LoginStatus::Success))).await?;
    let failed = count_where(sea_orm::Condition::all().add(login_history::Column::Status.eq(LoginStatus::Failed))).await?;
    let since = Utc::now() - Duration::hours(24);
    let last_24h = count_where(sea_orm::Condition::all().add(login_history::Column::LoginTime.gte(since))).await?;
    let by_role = RoleCounts {
        customer: count_where(sea_orm::Condition::all().add(login_history::Column::Role.eq(Role::Customer))).await?,
        business: count_where(sea_orm::Condition::all().add(login_history::Column::Role.eq(Role::Business))).await?,
        admin: count_where(sea_orm::Condition::all().add(login_history::Column::Role.eq(Role::Admin))).await?,
    };
    let unique_users = login_history::Entity::find()
        .select_only()
        .column(login_history::Column::UserId)
        .distinct()
        .into_tuple::<Uuid>()
        .all(db)
        .await?
        .len() as u64;
    Ok(LoginStats { total_logins, successful, failed, unique_users, by_role, last_24h })
}
