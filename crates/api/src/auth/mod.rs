//! Access tokens for privileged sessions.
//!
//! - [`jwt`]: HS256 token generation and validation.
//! - [`revocation`]: in-memory denylist of signed-out token ids.

pub mod jwt;
pub mod revocation;
