//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: a valid, unrevoked Bearer token.
//! - [`auth::OfficialUser`]: an [`auth::AuthUser`] whose email is on the
//!   privileged allow-list.

pub mod auth;
