pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod profiles;

use std::sync::Arc;
use actix_web::HttpResponse;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AccountService, AuthenticatedUser, RateLimitConfig, RateLimiter, TokenService};
pub use db::{ProfilePatch, PublicUser, SignupDefaults, User, UserStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all request handlers. Built once by the
/// process entry point and injected; nothing here is created as a
/// module-load side effect.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub users: UserStore,
    pub accounts: AccountService,
    pub tokens: TokenService,
    pub auth_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let users = UserStore::connect(&config.database.url, config.database.max_connections).await?;
        users.init_schema().await?;

        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_lifetime_days);
        let accounts = AccountService::new(users.clone(), tokens.clone(), SignupDefaults::default());

        Ok(Self {
            config: Arc::new(config),
            users,
            accounts,
            tokens,
            auth_limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.users.close().await;
        Ok(())
    }
}
