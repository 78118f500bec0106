use tokio::task;
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenService;
use crate::db::models::{PublicUser, SignupDefaults, User};
use crate::db::operations::UserStore;
use crate::error::AppError;
use crate::Result;

const MIN_PASSWORD_LEN: usize = 6;

/// Signup, login, and current-identity flows: validation and email
/// normalization, then hashing, the store, and token issuance composed in
/// that order. Signup and login are the only paths that mint tokens.
#[derive(Clone)]
pub struct AccountService {
    users: UserStore,
    tokens: TokenService,
    defaults: SignupDefaults,
}

impl AccountService {
    pub fn new(users: UserStore, tokens: TokenService, defaults: SignupDefaults) -> Self {
        Self {
            users,
            tokens,
            defaults,
        }
    }

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<(String, PublicUser)> {
        let email = normalize_email(email);
        let name = name.trim().to_string();

        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        // bcrypt is deliberately slow; keep it off the async executor
        let password = password.to_string();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

        let user = User::new(email, password_hash, name, &self.defaults);
        let created = self.users.create(&user).await?;

        let token = self.tokens.issue(&created.id)?;
        info!("New account created: {}", created.id);
        Ok((token, created))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, PublicUser)> {
        let email = normalize_email(email);

        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        // Unknown email and wrong password take the same exit
        let user = self
            .users
            .find_by_email_raw(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_string();
        let digest = user.password_hash.clone();
        let matches = task::spawn_blocking(move || verify_password(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("Verify task failed: {}", e)))?;

        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id)?;
        Ok((token, user.into()))
    }

    /// Sanitized record for a guard-resolved id. The id can be stale: a
    /// token outlives its account if the row was deleted after issuance.
    pub async fn current_user(&self, user_id: &str) -> Result<PublicUser> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }
}

/// Emails are stored and looked up in normalized form; the store itself
/// stays exact-match.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
