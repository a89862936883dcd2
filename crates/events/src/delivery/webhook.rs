//! Push notifications over an HTTP webhook.
//!
//! [`WebhookNotifier`] POSTs `{title, body, timestamp}` to a configured push
//! endpoint (e.g. a self-hosted ntfy or Gotify relay). A single attempt is
//! made per notification; system notifications are best-effort.

use std::time::Duration;

use async_trait::async_trait;

use super::{NotificationPermission, NotifyError, PermissionState, SystemNotifier};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    permission: PermissionState,
}

impl WebhookNotifier {
    /// Build a notifier for `url`. The permission starts undecided; the
    /// operator configuring the endpoint is taken as consent on request.
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            permission: PermissionState::default(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SystemNotifier for WebhookNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission.get()
    }

    async fn request_permission(&self) -> NotificationPermission {
        if self.permission.get() == NotificationPermission::Default {
            self.permission.set(NotificationPermission::Granted);
        }
        self.permission.get()
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission.get() != NotificationPermission::Granted {
            return Err(NotifyError::NotPermitted);
        }
        let payload = serde_json::json!({
            "title": title,
            "body": body,
            "timestamp": chrono::Utc::now(),
        });
        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_panic() {
        let notifier = WebhookNotifier::new("http://localhost:9/push").unwrap();
        assert_eq!(notifier.url(), "http://localhost:9/push");
    }

    #[tokio::test]
    async fn notify_before_permission_is_refused() {
        let notifier = WebhookNotifier::new("http://localhost:9/push").unwrap();
        assert!(matches!(
            notifier.notify("t", "b").await,
            Err(NotifyError::NotPermitted)
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_request_error() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/push").unwrap();
        notifier.request_permission().await;
        let err = notifier.notify("t", "b").await.unwrap_err();
        assert!(matches!(err, NotifyError::Request(_)));
    }
}
