//! The authentication-service boundary and its in-memory backend.
//!
//! An [`AuthService`] is one client's sign-in state: it authenticates with
//! email and password, signs out, and broadcasts identity changes through a
//! `watch` channel. [`MemoryAuth`] owns the shared account table and hands out
//! one [`MemoryAuthSession`] per connected client.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use citypulse_core::session::Identity;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The identity currently signed in, if any.
    fn current(&self) -> Option<Identity>;

    /// Receiver notified on every identity change.
    fn watch(&self) -> watch::Receiver<Option<Identity>>;
}

// ---------------------------------------------------------------------------
// Account table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password_hash: String,
}

type Accounts = Arc<RwLock<HashMap<String, Account>>>;

/// Shared account table.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    accounts: Accounts,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account, hashing `password` with Argon2id.
    pub fn add_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let hash = hash_password(password)?;
        self.add_account_with_hash(email, hash)
    }

    /// Register an account from an existing PHC hash.
    pub fn add_account_with_hash(
        &self,
        email: &str,
        password_hash: impl Into<String>,
    ) -> Result<Identity, AuthError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(email) {
            return Err(AuthError::DuplicateAccount(email.to_string()));
        }
        let uid = uuid::Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password_hash: password_hash.into(),
            },
        );
        Ok(Identity {
            uid,
            email: Some(email.to_string()),
        })
    }

    pub fn account_count(&self) -> usize {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check credentials without touching any session.
    pub fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
            .ok_or_else(|| AuthError::UnknownAccount(email.to_string()))?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AuthError::WrongPassword);
        }
        Ok(Identity {
            uid: account.uid,
            email: Some(email.to_string()),
        })
    }

    /// A fresh, signed-out session over this account table.
    pub fn new_session(&self) -> MemoryAuthSession {
        let (state, _) = watch::channel(None);
        MemoryAuthSession {
            auth: self.clone(),
            state,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct MemoryAuthSession {
    auth: MemoryAuth,
    state: watch::Sender<Option<Identity>>,
}

#[async_trait]
impl AuthService for MemoryAuthSession {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.auth.verify(email, password)?;
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.state.send_replace(None);
        Ok(())
    }

    fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn sign_in_and_out_update_the_watch() {
        let auth = MemoryAuth::new();
        auth.add_account("admin@citypulse.com", "pw-123456").unwrap();
        let session = auth.new_session();
        let mut rx = session.watch();

        let identity = session.sign_in("admin@citypulse.com", "pw-123456").await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("admin@citypulse.com"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref(), Some(&identity));

        session.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn bad_credentials_leave_the_session_signed_out() {
        let auth = MemoryAuth::new();
        auth.add_account("resident@example.com", "pw-123456").unwrap();
        let session = auth.new_session();

        assert_matches!(
            session.sign_in("resident@example.com", "wrong").await,
            Err(AuthError::WrongPassword)
        );
        assert_matches!(
            session.sign_in("nobody@example.com", "pw-123456").await,
            Err(AuthError::UnknownAccount(_))
        );
        assert!(session.current().is_none());
    }

    #[test]
    fn duplicate_accounts_are_refused() {
        let auth = MemoryAuth::new();
        auth.add_account("a@b.c", "pw").unwrap();
        assert_matches!(auth.add_account("a@b.c", "pw"), Err(AuthError::DuplicateAccount(_)));
        assert_eq!(auth.account_count(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let auth = MemoryAuth::new();
        auth.add_account("a@b.c", "pw").unwrap();
        let first = auth.new_session();
        let second = auth.new_session();

        first.sign_in("a@b.c", "pw").await.unwrap();
        assert!(first.current().is_some());
        assert!(second.current().is_none());
    }
}
