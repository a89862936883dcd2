use std::collections::HashMap;

use tokio::sync::RwLock;

/// Token ids revoked by logout, kept until the token would have expired
/// anyway.
#[derive(Debug, Default)]
pub struct TokenRevocations {
    revoked: RwLock<HashMap<String, i64>>,
}

impl TokenRevocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke `jti` until `exp` (UTC Unix timestamp).
    ///
    /// Entries past their expiry are purged on the way.
    pub async fn revoke(&self, jti: &str, exp: i64) {
        let now = chrono::Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, until| *until > now);
        revoked.insert(jti.to_string(), exp);
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().await.contains_key(jti)
    }

    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.revoked.read().await.is_empty()
    }
}
