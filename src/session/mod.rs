//! The authoritative session record and its manager.

pub mod error;

use crate::provider::{AuthEvent, AuthenticatedUser, IdentityProvider, RoleStore};
use crate::session::error::AuthError;
use crate::storage::TokenCache;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Identity record of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub uid: String,
    pub email: String,
}

/// Snapshot of the session state the dashboard renders.
///
/// `token` is present if and only if `user` is present, and `is_admin` is
/// never true without a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: Option<User>,
    pub is_admin: bool,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotSignedIn`] when no session is active; reading
    /// the identity of an absent session is consumer misuse.
    pub fn authorized_user(&self) -> Result<&User, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotSignedIn)
    }
}

/// True only for the role values that grant dashboard access.
fn is_admin_role(role: Option<&str>) -> bool {
    // The directory carries both historical spellings.
    matches!(role, Some("admin" | "Admin"))
}

/// Owns the session record and drives it through login, logout, and the
/// provider's auth-state replay.
///
/// Every dependency is injected, so tests run isolated instances against
/// in-memory fakes.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    roles: Arc<dyn RoleStore>,
    cache: Arc<dyn TokenCache>,
    state: RwLock<Session>,
    // Serializes overlapping login calls so their state transitions never
    // interleave.
    login_gate: Mutex<()>,
    // Sign-outs this manager initiated itself; the echoed SignedOut event
    // must not wipe the terminal state (notably the denial message).
    own_sign_outs: AtomicUsize,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        roles: Arc<dyn RoleStore>,
        cache: Arc<dyn TokenCache>,
    ) -> Self {
        Self {
            provider,
            roles,
            cache,
            state: RwLock::new(Session::default()),
            login_gate: Mutex::new(()),
            own_sign_outs: AtomicUsize::new(0),
        }
    }

    /// Current session snapshot.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    /// Sign in with email and password, then authorize against the role
    /// directory. Dashboard access is admin-only: valid credentials with a
    /// non-admin role are signed out again.
    ///
    /// Failures are absorbed into the returned snapshot's `error` field, not
    /// returned as `Err`; callers render the snapshot as-is.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Session {
        let _serialized = self.login_gate.lock().await;

        self.update(|session| {
            session.loading = true;
            session.error = None;
        })
        .await;

        let authed = match self.provider.sign_in(email, password).await {
            Ok(authed) => authed,
            Err(err) => {
                warn!("sign-in rejected: {err}");
                return self
                    .update(|session| {
                        session.loading = false;
                        session.error = Some(err.to_string());
                    })
                    .await;
            }
        };

        if self.authorize(&authed).await {
            self.complete_sign_in(&authed).await
        } else {
            self.deny().await
        }
    }

    /// Sign out and clear the session unconditionally. Idempotent; there is
    /// no error path.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Session {
        self.own_sign_outs.fetch_add(1, Ordering::SeqCst);
        self.provider.sign_out().await;

        if let Err(err) = self.cache.clear().await {
            warn!("failed to clear token cache: {err}");
        }

        self.update(|session| {
            session.user = None;
            session.token = None;
            session.is_admin = false;
        })
        .await
    }

    /// Subscribe to the provider's auth-state changes for the lifetime of
    /// the returned handle. Each event replays the same role-lookup-and-
    /// authorize sequence as [`login`](Self::login).
    ///
    /// Dropping or stopping the handle tears the subscription down; one
    /// watch per manager is expected.
    #[must_use]
    pub fn watch(self: &Arc<Self>) -> AuthWatch {
        let mut events = self.provider.subscribe();
        // Sign-outs performed while no watch existed were never delivered
        // to any receiver; their leftover credits must not swallow external
        // sign-out events observed by this subscription.
        self.own_sign_outs.store(0, Ordering::SeqCst);
        let manager = Arc::clone(self);

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => manager.apply_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("auth event stream lagged, {skipped} events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        AuthWatch { handle }
    }

    async fn apply_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(authed) => {
                debug!("auth-state change: signed in as {}", authed.uid);

                self.update(|session| {
                    session.loading = true;
                    session.error = None;
                })
                .await;

                if self.authorize(&authed).await {
                    self.complete_sign_in(&authed).await;
                } else {
                    self.deny().await;
                }
            }
            AuthEvent::SignedOut => {
                if self.consume_own_sign_out() {
                    // Echo of a sign-out this manager performed; the
                    // terminal state is already applied.
                    return;
                }

                debug!("auth-state change: signed out");

                if let Err(err) = self.cache.clear().await {
                    warn!("failed to clear token cache: {err}");
                }

                self.update(|session| {
                    session.user = None;
                    session.token = None;
                    session.is_admin = false;
                    session.loading = false;
                    session.error = None;
                })
                .await;
            }
        }
    }

    /// Admin check against the role directory. A failed or missing role
    /// read never grants access.
    async fn authorize(&self, authed: &AuthenticatedUser) -> bool {
        match self.roles.fetch_role(&authed.uid, &authed.token).await {
            Ok(role) => is_admin_role(role.as_deref()),
            Err(err) => {
                warn!("role lookup failed for {}: {err}", authed.uid);
                false
            }
        }
    }

    async fn complete_sign_in(&self, authed: &AuthenticatedUser) -> Session {
        if let Err(err) = self.cache.store(&authed.token).await {
            warn!("failed to cache token: {err}");
        }

        self.update(|session| {
            session.user = Some(User {
                uid: authed.uid.clone(),
                email: authed.email.clone(),
            });
            session.token = Some(authed.token.clone());
            session.is_admin = true;
            session.loading = false;
            session.error = None;
        })
        .await
    }

    /// Valid credentials, non-admin role: force the sign-out and leave the
    /// denial message for the caller to render.
    async fn deny(&self) -> Session {
        self.own_sign_outs.fetch_add(1, Ordering::SeqCst);
        self.provider.sign_out().await;

        if let Err(err) = self.cache.clear().await {
            warn!("failed to clear token cache: {err}");
        }

        self.update(|session| {
            session.user = None;
            session.token = None;
            session.is_admin = false;
            session.loading = false;
            session.error = Some(AuthError::NotAuthorized.to_string());
        })
        .await
    }

    fn consume_own_sign_out(&self) -> bool {
        self.own_sign_outs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn update(&self, apply: impl FnOnce(&mut Session)) -> Session {
        let mut state = self.state.write().await;
        apply(&mut state);
        state.clone()
    }
}

/// Cancellation handle for the auth-state subscription.
pub struct AuthWatch {
    handle: JoinHandle<()>,
}

impl AuthWatch {
    /// Tear the subscription down; events emitted afterwards no longer
    /// mutate the session.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for AuthWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_role_spellings() {
        assert!(is_admin_role(Some("admin")));
        assert!(is_admin_role(Some("Admin")));
        assert!(!is_admin_role(Some("ADMIN")));
        assert!(!is_admin_role(Some("user")));
        assert!(!is_admin_role(Some("")));
        assert!(!is_admin_role(None));
    }

    #[test]
    fn test_default_session_is_empty() {
        let session = Session::default();
        assert!(session.user.is_none());
        assert!(session.token.is_none());
        assert!(!session.is_admin);
        assert!(!session.loading);
        assert!(session.error.is_none());
    }

    #[test]
    fn test_authorized_user_guard() {
        let session = Session::default();
        assert!(matches!(
            session.authorized_user(),
            Err(AuthError::NotSignedIn)
        ));

        let session = Session {
            user: Some(User {
                uid: "uid-1".to_string(),
                email: "admin@padelyzer.mx".to_string(),
            }),
            is_admin: true,
            token: Some("bearer".to_string()),
            loading: false,
            error: None,
        };
        assert_eq!(
            session.authorized_user().map(|u| u.uid.clone()).ok(),
            Some("uid-1".to_string())
        );
    }
}
