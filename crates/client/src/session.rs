//! Session gate: who is signed in, and whether they may see the dashboard.
//!
//! The gate wraps one [`AuthService`] session. Only identities on the
//! [`AllowList`] become a session; everyone else is signed straight back out.
//! The view switch between the citizen map and the officials dashboard lives
//! here too, since reaching the dashboard depends on the session.

use std::sync::Arc;

use citypulse_core::session::{AllowList, Identity, View};
use citypulse_store::AuthService;
use tokio::sync::watch;

use crate::error::GateError;

pub struct SessionGate {
    auth: Arc<dyn AuthService>,
    allow_list: AllowList,
    session: Option<Identity>,
    view: View,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self::with_allow_list(auth, AllowList::default())
    }

    pub fn with_allow_list(auth: Arc<dyn AuthService>, allow_list: AllowList) -> Self {
        Self {
            auth,
            allow_list,
            session: None,
            view: View::Citizen,
        }
    }

    /// Authenticate and admit the identity if it is privileged.
    ///
    /// On success the view switches to the officials dashboard. Any
    /// authentication failure reports [`GateError::InvalidCredentials`]; an
    /// authenticated but non-privileged identity is signed out once and
    /// reported as [`GateError::AccessRestricted`]. The session is unset
    /// after either failure.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Identity, GateError> {
        let identity = match self.auth.sign_in(email, password).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(email, error = %e, "Sign-in failed");
                self.clear();
                return Err(GateError::InvalidCredentials);
            }
        };

        if !self.allow_list.admits(&identity) {
            tracing::info!(uid = %identity.uid, "Non-privileged sign-in refused");
            self.clear();
            if let Err(e) = self.auth.sign_out().await {
                tracing::error!(error = %e, "Sign-out after refused sign-in failed");
            }
            return Err(GateError::AccessRestricted);
        }

        tracing::info!(uid = %identity.uid, "Official signed in");
        self.view = View::Officials;
        Ok(&*self.session.insert(identity))
    }

    /// Sign out and return to the citizen view.
    ///
    /// A failed external sign-out is logged; the local session is cleared
    /// regardless.
    pub async fn logout(&mut self) {
        if let Err(e) = self.auth.sign_out().await {
            tracing::error!(error = %e, "Sign-out failed");
        }
        self.clear();
    }

    /// Apply an identity change observed on the auth service.
    pub fn on_auth_state(&mut self, identity: Option<Identity>) {
        match identity {
            Some(identity) if self.allow_list.admits(&identity) => {
                self.session = Some(identity);
            }
            _ => self.clear(),
        }
    }

    /// Receiver for identity changes of the wrapped auth session.
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.auth.watch()
    }

    pub fn session(&self) -> Option<&Identity> {
        self.session.as_ref()
    }

    pub fn is_privileged(&self) -> bool {
        self.session.is_some()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) -> Result<(), GateError> {
        if view == View::Officials && !self.is_privileged() {
            return Err(GateError::NotPrivileged);
        }
        self.view = view;
        Ok(())
    }

    fn clear(&mut self) {
        self.session = None;
        self.view = View::Citizen;
    }
}
