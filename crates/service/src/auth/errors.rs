use thiserror::Error;

use models::errors::ModelError;

/// Failures of register/login/session checks.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("an account with this email already exists")]
    Conflict,
    #[error("account not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("session token is invalid or expired")]
    InvalidToken,
    #[error("password hashing failed: {0}")]
    HashError(String),
    #[error("token signing failed: {0}")]
    TokenError(String),
    #[error("account store error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Numeric code carried in error logs; 1xxx caller faults, 2xxx server faults.
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1009,
            AuthError::NotFound => 1004,
            AuthError::Unauthorized => 1011,
            AuthError::InvalidToken => 1012,
            AuthError::HashError(_) => 2001,
            AuthError::TokenError(_) => 2002,
            AuthError::Repository(_) => 2100,
        }
    }

    pub fn is_client_fault(&self) -> bool { self.code() < 2000 }
}

impl From<ModelError> for AuthError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => AuthError::Validation(m),
            ModelError::Conflict(_) => AuthError::Conflict,
            ModelError::Db(m) => AuthError::Repository(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_split_caller_and_server_faults() {
        assert!(AuthError::Conflict.is_client_fault());
        assert!(AuthError::InvalidToken.is_client_fault());
        assert!(!AuthError::HashError("x".into()).is_client_fault());
        assert!(matches!(AuthError::from(ModelError::Validation("bad".into())), AuthError::Validation(m) if m == "bad"));
    }
}
