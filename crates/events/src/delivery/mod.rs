//! System-notification delivery.
//!
//! New city alerts raise a best-effort notification outside the page. The
//! [`SystemNotifier`] trait models the platform boundary: a permission that
//! starts undecided, a one-time permission request, and fire-and-forget
//! display. Delivery failures are reported to the caller, which swallows
//! them.

pub mod log;
pub mod webhook;

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// Notification permission, as granted by the user's environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// Not yet decided; a request may be made.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Thread-safe holder for a notifier's current permission.
#[derive(Debug, Default)]
pub struct PermissionState(Mutex<NotificationPermission>);

impl PermissionState {
    pub fn new(initial: NotificationPermission) -> Self {
        Self(Mutex::new(initial))
    }

    pub fn get(&self) -> NotificationPermission {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, permission: NotificationPermission) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = permission;
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification permission not granted")]
    NotPermitted,

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote endpoint returned a non-2xx status code.
    #[error("Notification endpoint returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// SystemNotifier
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SystemNotifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    /// Ask for permission. Only meaningful while the permission is
    /// [`NotificationPermission::Default`]; afterwards the decided value is
    /// returned unchanged.
    async fn request_permission(&self) -> NotificationPermission;

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}
