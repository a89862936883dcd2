//! Document store and authentication boundaries for CityPulse.
//!
//! Client controllers depend only on the [`DocumentStore`] and
//! [`AuthService`] traits. The in-memory implementations here back the server
//! and the test suites.

pub mod auth;
pub mod document;
pub mod error;
pub mod memory;
pub mod password;
pub mod seed;

pub use auth::{AuthService, MemoryAuth, MemoryAuthSession};
pub use document::{DocumentStore, Subscription};
pub use error::{AuthError, StoreError};
pub use memory::MemoryStore;
