use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use uuid::Uuid;

use models::login_history::{self, LoginStatus, NewLoginRecord};
use models::user::{self, NewUser};
use crate::auth::device::parse_user_agent;
use crate::auth::domain::{AuthUser, Credentials, LoginAttempt, NewAccount};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser { id: u.id, name: u.name, email: u.email, role: u.role }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_email(&self.db, email).await?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
        let input = NewUser {
            name: account.name,
            email: account.email,
            role: account.role,
            business_name: account.business_name,
            business_category: account.business_category,
            phone: account.phone,
        };
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        // two concurrent registrations for one address: the unique key decides
        let created = user::create(&txn, input).await?;
        models::user_credentials::upsert_password(&txn, created.id, account.password_hash, &account.password_algorithm).await?;
        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_for_user(&self.db, user_id).await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn record_login(&self, attempt: LoginAttempt) -> Result<(), AuthError> {
        let device_info = attempt.context.user_agent.as_deref().map(parse_user_agent);
        login_history::record(
            &self.db,
            NewLoginRecord {
                user_id: attempt.user.id,
                email: attempt.user.email,
                role: attempt.user.role,
                status: if attempt.success { LoginStatus::Success } else { LoginStatus::Failed },
                reason: attempt.reason,
                ip_address: attempt.context.ip_address,
                user_agent: attempt.context.user_agent,
                device_info,
            },
        )
        .await?;
        Ok(())
    }
}
