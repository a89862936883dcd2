//! Integration tests for the session gate.

mod common;

use std::sync::atomic::Ordering;

use assert_matches::assert_matches;
use citypulse_client::{GateError, SessionGate};
use citypulse_core::session::View;
use citypulse_store::AuthService;
use common::CountingAuth;

fn accounts() -> [(&'static str, &'static str); 3] {
    [
        ("admin@citypulse.com", "admin-pw"),
        ("official@citypulse.com", "official-pw"),
        ("resident@example.com", "resident-pw"),
    ]
}

// ---------------------------------------------------------------------------
// Test: privileged login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn privileged_login_sets_session_and_switches_view() {
    let auth = CountingAuth::new(&accounts());
    let mut gate = SessionGate::new(auth.clone());

    let identity = gate.login("admin@citypulse.com", "admin-pw").await.unwrap();
    assert_eq!(identity.email.as_deref(), Some("admin@citypulse.com"));

    assert!(gate.is_privileged());
    assert_eq!(gate.view(), View::Officials);
    assert_eq!(auth.sign_outs(), 0);
}

// ---------------------------------------------------------------------------
// Test: non-privileged login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_privileged_login_signs_out_exactly_once() {
    let auth = CountingAuth::new(&accounts());
    let mut gate = SessionGate::new(auth.clone());

    let result = gate.login("resident@example.com", "resident-pw").await;

    assert_matches!(result, Err(GateError::AccessRestricted));
    assert!(gate.session().is_none());
    assert_eq!(gate.view(), View::Citizen);
    assert_eq!(auth.sign_outs(), 1);
    assert!(auth.current().is_none());
}

#[tokio::test]
async fn allow_list_match_is_case_sensitive() {
    let auth = CountingAuth::new(&[("Admin@CityPulse.com", "pw")]);
    let mut gate = SessionGate::new(auth.clone());

    let result = gate.login("Admin@CityPulse.com", "pw").await;

    assert_matches!(result, Err(GateError::AccessRestricted));
    assert_eq!(auth.sign_outs(), 1);
}

// ---------------------------------------------------------------------------
// Test: authentication failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_password_and_unknown_account_share_one_message() {
    let auth = CountingAuth::new(&accounts());
    let mut gate = SessionGate::new(auth.clone());

    let wrong = gate.login("official@citypulse.com", "nope").await.unwrap_err();
    let unknown = gate.login("ghost@citypulse.com", "nope").await.unwrap_err();

    assert_eq!(wrong, GateError::InvalidCredentials);
    assert_eq!(unknown, GateError::InvalidCredentials);
    assert_eq!(wrong.to_string(), "Invalid email or password");
    assert!(gate.session().is_none());
    assert_eq!(auth.sign_in_calls.load(Ordering::SeqCst), 2);
    assert_eq!(auth.sign_outs(), 0);
}

#[tokio::test]
async fn failed_login_clears_an_existing_session() {
    let auth = CountingAuth::new(&accounts());
    let mut gate = SessionGate::new(auth.clone());
    gate.login("official@citypulse.com", "official-pw").await.unwrap();

    let _ = gate.login("official@citypulse.com", "bad").await;

    assert!(gate.session().is_none());
    assert_eq!(gate.view(), View::Citizen);
}

// ---------------------------------------------------------------------------
// Test: logout and observed auth state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_returns_to_citizen_view() {
    let auth = CountingAuth::new(&accounts());
    let mut gate = SessionGate::new(auth.clone());
    gate.login("official@citypulse.com", "official-pw").await.unwrap();

    gate.logout().await;

    assert!(gate.session().is_none());
    assert_eq!(gate.view(), View::Citizen);
    assert_eq!(auth.sign_outs(), 1);
}

#[tokio::test]
async fn watched_identity_restores_only_privileged_sessions() {
    let auth = CountingAuth::new(&accounts());
    let mut gate = SessionGate::new(auth.clone());
    let mut rx = gate.watch();

    // Sign in behind the gate's back, as a restored session would.
    auth.sign_in("official@citypulse.com", "official-pw").await.unwrap();
    rx.changed().await.unwrap();
    gate.on_auth_state(rx.borrow().clone());
    assert!(gate.is_privileged());
    assert_eq!(gate.view(), View::Citizen);

    auth.sign_in("resident@example.com", "resident-pw").await.unwrap();
    rx.changed().await.unwrap();
    gate.on_auth_state(rx.borrow().clone());
    assert!(!gate.is_privileged());
}
