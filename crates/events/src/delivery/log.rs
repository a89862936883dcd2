//! Notifier that writes notifications to the tracing log.
//!
//! Used when no push endpoint is configured. The permission request is
//! answered with whatever the notifier was built to grant.

use async_trait::async_trait;

use super::{NotificationPermission, NotifyError, PermissionState, SystemNotifier};

pub struct LogNotifier {
    permission: PermissionState,
    answer: NotificationPermission,
}

impl LogNotifier {
    /// Starts undecided and grants on request.
    pub fn new() -> Self {
        Self::answering(NotificationPermission::Granted)
    }

    /// Starts undecided and answers requests with `answer`.
    pub fn answering(answer: NotificationPermission) -> Self {
        Self {
            permission: PermissionState::default(),
            answer,
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemNotifier for LogNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission.get()
    }

    async fn request_permission(&self) -> NotificationPermission {
        if self.permission.get() == NotificationPermission::Default {
            self.permission.set(self.answer);
        }
        self.permission.get()
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission.get() != NotificationPermission::Granted {
            return Err(NotifyError::NotPermitted);
        }
        tracing::info!(title, body, "System notification");
        Ok(())
    }
}
