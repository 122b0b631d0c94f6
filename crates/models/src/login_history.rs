//! Login attempts on existing accounts.
use sea_orm::{entity::prelude::*, ConnectionTrait, FromJsonQueryResult, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user::{self, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum LoginStatus {
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct DeviceInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "login_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub login_time: DateTimeWithTimeZone,
    pub status: LoginStatus,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub device_info: Option<DeviceInfo>,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct NewLoginRecord {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub status: LoginStatus,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: Option<DeviceInfo>,
}

pub async fn record<C: ConnectionTrait>(db: &C, input: NewLoginRecord) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        email: Set(input.email.to_ascii_lowercase()),
        role: Set(input.role),
        login_time: Set(Utc::now().into()),
        status: Set(input.status),
        reason: Set(input.reason),
        ip_address: Set(input.ip_address),
        user_agent: Set(input.user_agent),
        device_info: Set(input.device_info),
        is_admin: Set(input.role == Role::Admin),
    };
    Ok(am.insert(db).await?)
}
