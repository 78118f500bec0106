use bcrypt::{hash, verify, BcryptError};

use crate::error::AppError;
use crate::Result;

/// Work factor matching the deployed system. Tens of milliseconds per
/// hash on current hardware; callers run this off the async executor.
const COST: u32 = 10;

/// Hash a password with bcrypt. Each call salts independently, so two
/// hashes of the same input never match.
pub fn hash_password(plain: &str) -> Result<String> {
    hash(plain, COST).map_err(|e: BcryptError| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored digest. A malformed digest is "no
/// match", never an error: login must not behave differently for a
/// corrupted row than for a wrong password.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    verify(plain, digest).unwrap_or(false)
}
