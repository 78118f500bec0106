use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::extractor::AuthenticatedUser;
use crate::auth::service::normalize_email;
use crate::db::models::PublicUser;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received signup request for email: {}", req.email);

    if !state.auth_limiter.check(&normalize_email(&req.email)).await {
        return Err(AppError::RateLimited);
    }

    match state.accounts.signup(&req.email, &req.password, &req.name).await {
        Ok((token, user)) => {
            info!("Signup successful for email: {}", user.email);
            Ok(HttpResponse::Created().json(AuthResponse { token, user }))
        }
        Err(e) => {
            error!("Signup failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);

    if !state.auth_limiter.check(&normalize_email(&req.email)).await {
        return Err(AppError::RateLimited);
    }

    match state.accounts.login(&req.email, &req.password).await {
        Ok((token, user)) => {
            info!("Login successful for email: {}", user.email);
            Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
        }
        Err(e) => {
            error!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

/// The identity behind the presented token, or 404 if the account was
/// deleted after the token was issued.
pub async fn me(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.accounts.current_user(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}
