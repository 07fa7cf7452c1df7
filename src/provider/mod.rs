//! Seams to the external identity provider and role directory.

pub mod firebase;

use crate::session::error::AuthError;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Identity returned by the provider after a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    /// Opaque bearer token proving this identity to backend calls.
    pub token: String,
}

/// Auth-state change pushed by the provider to its subscribers.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(AuthenticatedUser),
    SignedOut,
}

/// Credential sign-in, sign-out, and auth-state change notifications.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str)
        -> Result<AuthenticatedUser, AuthError>;

    async fn sign_out(&self);

    /// Subscribe to auth-state changes. Every successful `sign_in` and every
    /// `sign_out` is replayed to all receivers.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Read access to the user directory keyed by the provider uid.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Read the role attribute of the user's directory document.
    ///
    /// A missing document or attribute is `Ok(None)`; only transport and
    /// server failures are errors.
    async fn fetch_role(&self, uid: &str, token: &str) -> Result<Option<String>, AuthError>;
}
