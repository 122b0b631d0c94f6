use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// A unique or foreign key constraint refused the write.
    #[error("constraint violation: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

/// Unique and foreign key violations, which callers usually turn into a 409.
pub fn constraint_violation(e: &DbErr) -> Option<String> {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(m)) | Some(SqlErr::ForeignKeyConstraintViolation(m)) => Some(m),
        _ => None,
    }
}

pub fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl From<DbErr> for ModelError {
    fn from(e: DbErr) -> Self {
        match constraint_violation(&e) {
            Some(m) => ModelError::Conflict(m),
            None => ModelError::Db(e.to_string()),
        }
    }
}
