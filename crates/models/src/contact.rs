use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ModelError;
use crate::user::normalize_email;

pub const MIN_MESSAGE_LEN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "read")]
    Read,
    #[sea_orm(string_value = "replied")]
    Replied,
}

impl FromStr for ContactStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(ContactStatus::New),
            "read" => Ok(ContactStatus::Read),
            "replied" => Ok(ContactStatus::Replied),
            _ => Err(ModelError::Validation("Invalid status. Must be: new, read, or replied".into())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub status: ContactStatus,
    pub is_read: bool,
    pub read_at: Option<DateTimeWithTimeZone>,
    pub replied_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

/// Validate and normalize a contact form submission.
pub fn validate(input: &NewContact) -> Result<NewContact, ModelError> {
    let missing: Vec<&str> = [
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
        ("email", &input.email),
        ("message", &input.message),
    ]
    .into_iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| k)
    .collect();
    if !missing.is_empty() {
        return Err(ModelError::Validation(format!("missing required fields: {}", missing.join(", "))));
    }
    let email = normalize_email(&input.email).map_err(|_| ModelError::Validation("Please provide a valid email".into()))?;
    let message = input.message.trim();
    if message.chars().count() < MIN_MESSAGE_LEN {
        return Err(ModelError::Validation(format!("Message must be at least {} characters long", MIN_MESSAGE_LEN)));
    }
    Ok(NewContact {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email,
        message: message.to_string(),
    })
}

pub async fn create<C: ConnectionTrait>(db: &C, input: &NewContact) -> Result<Model, ModelError> {
    let clean = validate(input)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(clean.first_name),
        last_name: Set(clean.last_name),
        email: Set(clean.email),
        message: Set(clean.message),
        status: Set(ContactStatus::New),
        is_read: Set(false),
        read_at: Set(None),
        replied_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewContact {
        NewContact {
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            email: "ADA@Example.org".into(),
            message: "Hello there, I need a plumber.".into(),
        }
    }

    #[test]
    fn normalizes_fields() {
        let c = validate(&form()).unwrap();
        assert_eq!(c.first_name, "Ada");
        assert_eq!(c.email, "ada@example.org");
    }

    #[test]
    fn reports_missing_fields() {
        let mut f = form();
        f.last_name.clear();
        f.message = "  ".into();
        let msg = validate(&f).unwrap_err().to_string();
        assert!(msg.contains("last_name"));
        assert!(msg.contains("message"));
    }

    #[test]
    fn short_message_rejected() {
        let mut f = form();
        f.message = "  long enough ".into();
        assert!(validate(&f).is_ok());
        f.message = " short ".into();
        assert!(validate(&f).is_err());
    }

    #[test]
    fn status_parse() {
        assert_eq!("REPLIED".parse::<ContactStatus>().unwrap(), ContactStatus::Replied);
        assert!("archived".parse::<ContactStatus>().is_err());
    }
}
