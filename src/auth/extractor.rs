use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Request identity resolved from the bearer token. Handlers that take
/// this as an argument never run for unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    // A missing or non-Bearer header fails before the verifier is consulted
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingCredentials)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("Application state not configured".to_string()))?;

    let user_id = state.tokens.verify(token)?;
    Ok(AuthenticatedUser { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    use crate::config::Settings;

    async fn test_state() -> web::Data<AppState> {
        let config = Settings::new_for_test().unwrap();
        web::Data::new(AppState::new(config).await.unwrap())
    }

    #[actix_web::test]
    async fn test_valid_bearer_token_resolves_identity() {
        let state = test_state().await;
        let token = state.tokens.issue("user-42").unwrap();

        let req = TestRequest::default()
            .app_data(state.clone())
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let user = resolve(&req).unwrap();
        assert_eq!(user.user_id, "user-42");
    }

    #[actix_web::test]
    async fn test_missing_header_fails_without_verifier() {
        let state = test_state().await;
        let req = TestRequest::default().app_data(state).to_http_request();

        let err = resolve(&req).unwrap_err();
        assert!(matches!(
            err,
            AppError::Authentication(AuthError::MissingCredentials)
        ));
    }

    #[actix_web::test]
    async fn test_non_bearer_scheme_is_rejected() {
        let state = test_state().await;
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();

        let err = resolve(&req).unwrap_err();
        assert!(matches!(
            err,
            AppError::Authentication(AuthError::MissingCredentials)
        ));
    }

    #[actix_web::test]
    async fn test_garbage_token_is_rejected() {
        let state = test_state().await;
        let req = TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, "Bearer garbage"))
            .to_http_request();

        let err = resolve(&req).unwrap_err();
        assert!(matches!(
            err,
            AppError::Authentication(AuthError::InvalidToken)
        ));
    }
}
