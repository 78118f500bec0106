//! Profile surface for the Opto server
//!
//! Public directory reads plus the authenticated profile, avatar, and
//! cover-photo mutations.

pub mod handlers;
pub mod upload;
