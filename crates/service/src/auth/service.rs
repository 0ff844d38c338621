use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};

use models::user::{self, Role, UserStatus};

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), token_ttl_hours: c.token_ttl_hours, password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new client or promoteur with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use models::user::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into(), role: Role::Client, phone: None };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.role == Role::Admin {
            return Err(AuthError::Validation("admin accounts cannot self-register".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let email = user::normalize_email(&input.email);
        user::validate_email(&email).map_err(|e| AuthError::Validation(e.to_string()))?;
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&email, &input.name, input.role, input.phone.as_deref()).await?;
        let hash = hash_password(&input.password)?;
        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, role = %user.role, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate an active user and issue a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use models::user::Role;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), role: Role::Promoteur, phone: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = user::normalize_email(&input.email);
        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if user.status != UserStatus::Active {
            warn!(user_id = %user.id, status = %user.status, "login_refused_inactive");
            return Err(AuthError::Inactive(user.status));
        }

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = token::issue(&self.cfg.jwt_secret, user.id, user.role, self.cfg.token_ttl_hours)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Create the configured admin account if no user holds that email yet.
    ///
    /// Returns `true` when an account was created.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let email = user::normalize_email(email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            if existing.role != Role::Admin {
                warn!(user_id = %existing.id, "bootstrap admin email belongs to a non-admin account");
            }
            return Ok(false);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let admin = self.repo.create_user(&email, "Administrator", Role::Admin, None).await?;
        let hash = hash_password(password)?;
        self.repo.upsert_password(admin.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %admin.id, "bootstrap_admin_created");
        Ok(true)
    }

    pub fn config(&self) -> &AuthConfig { &self.cfg }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::auth::repo::SeaOrmAuthRepository;
    use crate::test_support::get_db;

    fn cfg() -> AuthConfig {
        AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() }
    }

    fn input(email: &str, role: Role) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Jane".into(), password: "Passw0rd!".into(), role, phone: None }
    }

    #[tokio::test]
    async fn admin_cannot_self_register() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        let err = svc.register(input("a@example.com", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        let mut i = input("a@example.com", Role::Client);
        i.password = "short".into();
        assert!(matches!(svc.register(i).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        svc.register(input("dup@example.com", Role::Client)).await.unwrap();
        let err = svc.register(input("DUP@example.com", Role::Promoteur)).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(err.code(), 1002);
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        let u = svc.register(input("p@example.com", Role::Promoteur)).await.unwrap();
        let session = svc.login(LoginInput { email: "p@example.com".into(), password: "Passw0rd!".into() }).await.unwrap();
        let actor = token::actor_from_token("test-secret", &session.token).unwrap();
        assert_eq!(actor.user_id, u.id);
        assert_eq!(actor.role, Role::Promoteur);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg());
        svc.register(input("c@example.com", Role::Client)).await.unwrap();
        let bad = svc.login(LoginInput { email: "c@example.com".into(), password: "nope-nope".into() }).await;
        assert!(matches!(bad, Err(AuthError::Unauthorized)));
        let unknown = svc.login(LoginInput { email: "x@example.com".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn suspended_user_cannot_login() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), cfg());
        svc.register(input("s@example.com", Role::Client)).await.unwrap();
        repo.set_status("s@example.com", UserStatus::Suspended);
        let res = svc.login(LoginInput { email: "s@example.com".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(res, Err(AuthError::Inactive(UserStatus::Suspended))));
    }

    #[tokio::test]
    async fn seaorm_register_login_and_bootstrap() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let svc = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), cfg());

        let u = svc.register(input("Owner@Example.com", Role::Promoteur)).await?;
        assert_eq!(u.email, "owner@example.com");
        let session = svc.login(LoginInput { email: "owner@example.com".into(), password: "Passw0rd!".into() }).await?;
        assert_eq!(session.user.id, u.id);

        assert!(svc.ensure_admin("root@example.com", "Adm1nPass").await?);
        assert!(!svc.ensure_admin("root@example.com", "Adm1nPass").await?);
        let admin = svc.login(LoginInput { email: "root@example.com".into(), password: "Adm1nPass".into() }).await?;
        assert_eq!(admin.user.role, Role::Admin);
        Ok(())
    }
}
