//! Loading demo data into a fresh store.
//!
//! A seed file is JSON with four optional arrays:
//!
//! ```json
//! {
//!   "accounts": [{ "email": "admin@citypulse.com", "password": "..." }],
//!   "projects": [{ "id": "p-1", "name": "...", "type": "road", ... }],
//!   "reports":  [ ... ],
//!   "alerts":   [ ... ]
//! }
//! ```
//!
//! Documents with an `id` field keep it; the rest get store-assigned ids.
//! Accounts take either a plaintext `password` or a PHC `password_hash`.

use std::path::Path;

use citypulse_core::alert::COLLECTION_ALERTS;
use citypulse_core::project::COLLECTION_PROJECTS;
use citypulse_core::report::COLLECTION_REPORTS;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::MemoryAuth;
use crate::document::DocumentStore;
use crate::error::{AuthError, StoreError};
use crate::memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Account '{0}' has neither password nor password_hash")]
    MissingPassword(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
    #[serde(default)]
    pub projects: Vec<Value>,
    #[serde(default)]
    pub reports: Vec<Value>,
    #[serde(default)]
    pub alerts: Vec<Value>,
}

/// Counts of what [`apply`] loaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub accounts: usize,
    pub projects: usize,
    pub reports: usize,
    pub alerts: usize,
}

pub fn load(path: impl AsRef<Path>) -> Result<SeedData, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub async fn apply(
    data: SeedData,
    store: &MemoryStore,
    auth: &MemoryAuth,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for account in data.accounts {
        match (account.password, account.password_hash) {
            (_, Some(hash)) => auth.add_account_with_hash(&account.email, hash)?,
            (Some(password), None) => auth.add_account(&account.email, &password)?,
            (None, None) => return Err(SeedError::MissingPassword(account.email)),
        };
        summary.accounts += 1;
    }

    summary.projects = insert_all(store, COLLECTION_PROJECTS, data.projects).await?;
    summary.reports = insert_all(store, COLLECTION_REPORTS, data.reports).await?;
    summary.alerts = insert_all(store, COLLECTION_ALERTS, data.alerts).await?;

    tracing::info!(
        accounts = summary.accounts,
        projects = summary.projects,
        reports = summary.reports,
        alerts = summary.alerts,
        "Seed data loaded"
    );
    Ok(summary)
}

async fn insert_all(
    store: &MemoryStore,
    collection: &str,
    docs: Vec<Value>,
) -> Result<usize, SeedError> {
    let count = docs.len();
    for mut doc in docs {
        let id = doc
            .as_object_mut()
            .and_then(|body| body.remove("id"))
            .and_then(|id| id.as_str().map(str::to_string));
        match id {
            Some(id) => {
                store.set_document(collection, &id, doc).await?;
            }
            None => {
                store.add_document(collection, doc).await?;
            }
        }
    }
    Ok(count)
}
