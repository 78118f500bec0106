use std::path::PathBuf;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use tracing::info;

use crate::auth::extractor::AuthenticatedUser;
use crate::db::models::ProfilePatch;
use crate::error::AppError;
use crate::profiles::upload::save_image;
use crate::AppState;

/// Public directory of all profiles, newest first.
pub async fn list_profiles(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.users.list().await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_profile(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn update_my_profile(
    auth: AuthenticatedUser,
    patch: web::Json<ProfilePatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Profile update for user: {}", auth.user_id);
    let user = state
        .users
        .update_profile(&auth.user_id, &patch)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn upload_avatar(
    auth: AuthenticatedUser,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let url = store_image(&state, payload).await?;
    info!("Avatar updated for user: {}", auth.user_id);
    let user = state
        .users
        .update_avatar(&auth.user_id, &url)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn upload_cover(
    auth: AuthenticatedUser,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let url = store_image(&state, payload).await?;
    info!("Cover photo updated for user: {}", auth.user_id);
    let user = state
        .users
        .update_cover_photo(&auth.user_id, &url)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(user))
}

async fn store_image(state: &AppState, payload: Multipart) -> Result<String, AppError> {
    let dir = PathBuf::from(&state.config.uploads.dir);
    save_image(payload, &dir, state.config.uploads.max_bytes).await
}
