use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, LoginAttempt, NewAccount};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// Store the account and its credentials atomically: either both rows
    /// exist afterwards or neither does.
    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;

    async fn record_login(&self, attempt: LoginAttempt) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,   // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>,  // key: user_id
        logins: Mutex<Vec<LoginAttempt>>,
    }

    impl MockAuthRepository {
        /// Recorded login attempts, oldest first.
        pub fn logins(&self) -> Vec<LoginAttempt> {
            self.logins.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&account.email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), name: account.name, email: account.email.clone(), role: account.role };
            let c = Credentials { user_id: user.id, password_hash: account.password_hash, password_algorithm: account.password_algorithm };
            self.creds.lock().unwrap().insert(user.id, c);
            users.insert(account.email, user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn record_login(&self, attempt: LoginAttempt) -> Result<(), AuthError> {
            self.logins.lock().unwrap().push(attempt);
            Ok(())
        }
    }
}
