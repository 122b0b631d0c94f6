use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::user::{normalize_email, validate_name, Role};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, LoginAttempt, LoginContext, LoginInput, NewAccount, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub min_password_len: usize,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn with_secret(secret: &str) -> Self {
        Self { jwt_secret: secret.to_string(), token_ttl_hours: 24, min_password_len: 8, password_algorithm: "argon2".into() }
    }
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: c.jwt_secret.clone(),
            token_ttl_hours: c.token_ttl_hours,
            min_password_len: c.min_password_len,
            password_algorithm: "argon2".into(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new account and log it in.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::with_secret("secret"));
    /// let input = RegisterInput { name: "Test".into(), email: "User@Example.com".into(), password: "Secret123".into(), role: None, business_name: None, business_category: None, phone: None };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        validate_name(&input.name)?;
        let email = normalize_email(&input.email)?;
        if input.password.chars().count() < self.cfg.min_password_len {
            return Err(AuthError::Validation(format!("password too short (>={})", self.cfg.min_password_len)));
        }
        let role = match input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => r.parse::<Role>()?,
            None => Role::Customer,
        };
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(NewAccount {
                name: input.name,
                email,
                role,
                business_name: input.business_name,
                business_category: input.business_category,
                phone: input.phone,
                password_hash: hash,
                password_algorithm: self.cfg.password_algorithm.clone(),
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "user_registered");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user })
    }

    /// Authenticate a user and issue a token. Attempts against an existing
    /// account are recorded in login history whether they succeed or not.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput, LoginContext};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("secret"));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { name: "N".into(), email: "u@e.com".into(), password: "Passw0rd".into(), role: None, business_name: None, business_category: None, phone: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() }, LoginContext::default())).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert_eq!(repo.logins().len(), 1);
    /// ```
    #[instrument(skip(self, input, ctx), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput, ctx: LoginContext) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_ascii_lowercase();
        let user = self.repo.find_user_by_email(&email).await?.ok_or(AuthError::Unauthorized)?;

        let verified = match self.repo.get_credentials(user.id).await? {
            Some(cred) => {
                let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
                Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_ok()
            }
            None => false,
        };

        let reason = (!verified).then(|| "invalid password".to_string());
        self.record(LoginAttempt { user: user.clone(), success: verified, reason, context: ctx }).await;
        if !verified {
            return Err(AuthError::Unauthorized);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, role = user.role.as_str(), "user_logged_in");
        Ok(AuthSession { token, user })
    }

    /// Decode and validate a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims)
    }

    /// Resolve the account behind a bearer token.
    pub async fn current_user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.verify_token(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::InvalidToken)
    }

    fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.cfg.token_ttl_hours);
        let claims = Claims { sub: user.id.to_string(), role: user.role, iat: now.timestamp() as usize, exp: exp.timestamp() as usize };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    async fn record(&self, attempt: LoginAttempt) {
        let user_id = attempt.user.id;
        if let Err(e) = self.repo.record_login(attempt).await {
            warn!(%user_id, error = %e, "login_history_write_failed");
        }
    }
}
