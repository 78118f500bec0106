//! User persistence for the Opto server
//!
//! This module owns the users table: schema, row models, sanitized
//! views, and the single-statement operations over them.

pub mod models;
pub mod operations;

pub use models::{level_for_score, ProfilePatch, PublicUser, SignupDefaults, User};
pub use operations::UserStore;
