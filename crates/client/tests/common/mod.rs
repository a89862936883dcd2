//! Test doubles for the store, auth and notification boundaries.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use citypulse_core::session::Identity;
use citypulse_events::{NotificationPermission, NotifyError, SystemNotifier};
use citypulse_store::{AuthError, AuthService, DocumentStore, MemoryStore, StoreError, Subscription};
use tokio::sync::{watch, Notify};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Auth session over a fixed password table that counts sign-outs.
pub struct CountingAuth {
    accounts: HashMap<String, String>,
    state: watch::Sender<Option<Identity>>,
    pub sign_in_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl CountingAuth {
    pub fn new(accounts: &[(&str, &str)]) -> Arc<Self> {
        let (state, _) = watch::channel(None);
        Arc::new(Self {
            accounts: accounts
                .iter()
                .map(|(email, pw)| (email.to_string(), pw.to_string()))
                .collect(),
            state,
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        })
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for CountingAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        match self.accounts.get(email) {
            None => Err(AuthError::UnknownAccount(email.to_string())),
            Some(expected) if expected != password => Err(AuthError::WrongPassword),
            Some(_) => {
                let identity = Identity {
                    uid: format!("uid-{email}"),
                    email: Some(email.to_string()),
                };
                self.state.send_replace(Some(identity.clone()));
                Ok(identity)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
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

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A [`MemoryStore`] whose writes can be made to fail or to wait for a
/// signal before committing.
pub struct ScriptedStore {
    pub inner: MemoryStore,
    fail_writes: AtomicBool,
    hold_writes: AtomicBool,
    release: Notify,
    pub write_attempts: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_writes: AtomicBool::new(false),
            hold_writes: AtomicBool::new(false),
            release: Notify::new(),
            write_attempts: AtomicUsize::new(0),
        })
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes block until [`ScriptedStore::release_one`] is called.
    pub fn hold_writes(&self) {
        self.hold_writes.store(true, Ordering::SeqCst);
    }

    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn listen(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.inner.listen(collection).await
    }

    async fn add_document(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<String, StoreError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.hold_writes.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".into()));
        }
        self.inner.add_document(collection, data).await
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

pub struct RecordingNotifier {
    permission: Mutex<NotificationPermission>,
    answer: NotificationPermission,
    pub requests: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new(initial: NotificationPermission, answer: NotificationPermission) -> Arc<Self> {
        Arc::new(Self {
            permission: Mutex::new(initial),
            answer,
            requests: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn granted() -> Arc<Self> {
        Self::new(NotificationPermission::Default, NotificationPermission::Granted)
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` notifications were delivered.
    pub async fn wait_for(&self, count: usize) -> Vec<(String, String)> {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let sent = self.sent();
                if sent.len() >= count {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("notifications should arrive")
    }
}

#[async_trait]
impl SystemNotifier for RecordingNotifier {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> NotificationPermission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut permission = self.permission.lock().unwrap();
        if *permission == NotificationPermission::Default {
            *permission = self.answer;
        }
        *permission
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Run `fut` with a short deadline; `None` if it did not finish.
pub async fn within<F: std::future::Future>(fut: F) -> Option<F::Output> {
    tokio::time::timeout(Duration::from_millis(100), fut).await.ok()
}
