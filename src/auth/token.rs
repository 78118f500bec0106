use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError};
use crate::Result;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

/// Stateless session tokens: validity is signature plus expiry, nothing is
/// kept server-side and nothing can be revoked before `exp` passes.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::days(lifetime_days),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.lifetime).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Returns the subject user id. Tampered, malformed, and expired
    /// tokens all collapse into the same error so callers cannot tell the
    /// cases apart.
    pub fn verify(&self, token: &str) -> Result<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::Authentication(AuthError::InvalidToken))?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new("test_secret", 7)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = test_service();
        let token = service.issue("user-123").unwrap();
        assert_eq!(service.verify(&token).unwrap(), "user-123");
    }

    #[test]
    fn test_corrupted_signature_is_rejected() {
        let service = test_service();
        let token = service.issue("user-123").unwrap();

        // flip the signature segment
        let mut parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let garbage = "AAAAAAAAAAAAAAAAAAAAAA";
        parts[2] = garbage;
        let tampered = parts.join(".");

        let err = service.verify(&tampered).unwrap_err();
        assert!(matches!(
            err,
            AppError::Authentication(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = test_service().issue("user-123").unwrap();
        let other = TokenService::new("different_secret", 7);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // negative lifetime puts exp in the past at issuance
        let service = TokenService::new("test_secret", -1);
        let token = service.issue("user-123").unwrap();

        let err = service.verify(&token).unwrap_err();
        assert!(matches!(
            err,
            AppError::Authentication(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let service = test_service();
        assert!(service.verify("garbage").is_err());
        assert!(service.verify("").is_err());
    }
}
