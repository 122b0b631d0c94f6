use models::errors::{constraint_violation, ModelError};
use thiserror::Error;

use crate::payments::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("insufficient wallet balance: available {available_cents}, required {required_cents}")]
    InsufficientFunds { available_cents: i64, required_cents: i64 },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(ModelError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            // a unique or foreign key refused the write: the caller raced someone
            ModelError::Conflict(m) => ServiceError::Conflict(m),
            other => ServiceError::Model(other),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        match constraint_violation(&e) {
            Some(m) => ServiceError::Conflict(m),
            None => ServiceError::Db(e.to_string()),
        }
    }
}

impl From<sea_orm::TransactionError<ServiceError>> for ServiceError {
    fn from(e: sea_orm::TransactionError<ServiceError>) -> Self {
        match e {
            sea_orm::TransactionError::Connection(db) => db.into(),
            sea_orm::TransactionError::Transaction(inner) => inner,
        }
    }
}
