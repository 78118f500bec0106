//! Authentication for the Opto server
//!
//! This module handles credential hashing, session token issuance and
//! verification, the request-level bearer guard, and the signup/login
//! orchestration on top of them.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod token;

pub use extractor::AuthenticatedUser;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use service::AccountService;
pub use token::{Claims, TokenService};
