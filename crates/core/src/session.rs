//! Privileged-account allow-list and view selection.
//!
//! The allow-list is a client-side comparison, not a server-verified
//! authorization claim. Anyone who can modify the client can bypass it; real
//! deployments must replace it with a claim checked by the backend.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Accounts allowed into the officials dashboard.
pub const PRIVILEGED_EMAILS: &[&str] = &["admin@citypulse.com", "official@citypulse.com"];

/// Shown when an authenticated account is not on the allow-list.
pub const MSG_ACCESS_RESTRICTED: &str = "Access restricted to authorized officials only";

/// Shown for every authentication failure, whatever the underlying cause.
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";

/// An identity returned by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

/// Fixed set of privileged emails, matched exactly and case-sensitively.
#[derive(Debug, Clone)]
pub struct AllowList {
    emails: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn admits_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e == email)
    }

    /// Identities without an email are never privileged.
    pub fn admits(&self, identity: &Identity) -> bool {
        identity
            .email
            .as_deref()
            .is_some_and(|email| self.admits_email(email))
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(PRIVILEGED_EMAILS.iter().copied())
    }
}

/// Top-level view of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum View {
    /// Public map with report submission.
    #[default]
    Citizen,
    /// Stats, bottlenecks and the filtered map; privileged only.
    Officials,
}
