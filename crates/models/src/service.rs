//! A listing offered by a business user.
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

pub const DEFAULT_IMAGE: &str = "https://images.unsplash.com/photo-1581578731548-c64695cc6952?w=400&h=300&fit=crop";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price_cents: i64,
    pub location: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub image: String,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Provider }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Provider => Entity::belongs_to(user::Entity)
                .from(Column::ProviderId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Provider.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct NewService {
    pub provider_id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price_cents: i64,
    pub location: String,
    pub phone: String,
    pub image: Option<String>,
}

/// Collect every required text field that is blank, then check the price.
pub fn validate(input: &NewService) -> Result<(), ModelError> {
    let missing: Vec<&str> = [
        ("name", &input.name),
        ("category", &input.category),
        ("description", &input.description),
        ("location", &input.location),
        ("phone", &input.phone),
    ]
    .into_iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| k)
    .collect();
    if !missing.is_empty() {
        return Err(ModelError::Validation(format!("missing required fields: {}", missing.join(", "))));
    }
    if input.price_cents < 0 {
        return Err(ModelError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewService) -> Result<Model, ModelError> {
    validate(&input)?;
    let image = input
        .image
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string());
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        provider_id: Set(input.provider_id),
        name: Set(input.name.trim().to_string()),
        category: Set(input.category.trim().to_string()),
        description: Set(input.description.trim().to_string()),
        price_cents: Set(input.price_cents),
        location: Set(input.location.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        image: Set(image),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewService {
        NewService {
            provider_id: Uuid::new_v4(),
            name: "Deep Cleaning".into(),
            category: "Cleaning".into(),
            description: "Whole house".into(),
            price_cents: 12_000,
            location: "Springfield".into(),
            phone: "555-0100".into(),
            image: None,
        }
    }

    #[test]
    fn lists_all_blank_fields() {
        let mut s = sample();
        s.name = " ".into();
        s.phone = String::new();
        let err = validate(&s).unwrap_err().to_string();
        assert!(err.contains("name"));
        assert!(err.contains("phone"));
        assert!(!err.contains("category"));
    }

    #[test]
    fn negative_price_rejected() {
        let mut s = sample();
        s.price_cents = -1;
        assert!(validate(&s).is_err());
        assert!(validate(&sample()).is_ok());
    }
}
