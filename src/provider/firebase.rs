//! Production implementations against the Firebase REST surface: the
//! Identity Toolkit for credential sign-in and Firestore for the user
//! directory.

use crate::provider::{AuthEvent, AuthenticatedUser, IdentityProvider, RoleStore};
use crate::session::error::AuthError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use url::Url;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Events kept for slow subscribers before they start lagging.
const EVENT_CAPACITY: usize = 16;

/// Normalize a configured base URL and append an endpoint path.
#[instrument]
pub fn endpoint_url(base: &str, endpoint: &str) -> Result<String> {
    let url = Url::parse(base)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{endpoint}");

    debug!("endpoint URL: {}", endpoint);

    Ok(endpoint_url)
}

/// Identity provider backed by the Identity Toolkit
/// `accounts:signInWithPassword` endpoint.
pub struct FirebaseAuth {
    client: Client,
    auth_url: String,
    api_key: SecretString,
    events: broadcast::Sender<AuthEvent>,
}

impl FirebaseAuth {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(auth_url: &str, api_key: SecretString) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client,
            auth_url: auth_url.to_string(),
            api_key,
            events,
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let sign_in_url = endpoint_url(&self.auth_url, "/v1/accounts:signInWithPassword")
            .map_err(|err| AuthError::authentication(&err.to_string()))?;

        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .client
            .post(&sign_in_url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&payload)
            .send()
            .await
            .map_err(|err| AuthError::authentication(&err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or_default();
            let message = body["error"]["message"].as_str().unwrap_or("");

            debug!("sign-in rejected: {} - {}", status, message);

            return Err(AuthError::authentication(message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AuthError::authentication(&err.to_string()))?;

        let user = authenticated_user_from_response(email, &body)?;

        // Replay to subscribers, mirroring the SDK's auth-state callback.
        let _ = self.events.send(AuthEvent::SignedIn(user.clone()));

        Ok(user)
    }

    async fn sign_out(&self) {
        // The Identity Toolkit holds no server-side session; discarding the
        // token locally is the whole operation.
        debug!("signing out");
        let _ = self.events.send(AuthEvent::SignedOut);
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn authenticated_user_from_response(
    email: &str,
    body: &Value,
) -> Result<AuthenticatedUser, AuthError> {
    let uid = body["localId"]
        .as_str()
        .ok_or_else(|| AuthError::authentication("Error parsing response: no localId found"))?;

    let token = body["idToken"]
        .as_str()
        .ok_or_else(|| AuthError::authentication("Error parsing response: no idToken found"))?;

    Ok(AuthenticatedUser {
        uid: uid.to_string(),
        email: body["email"].as_str().unwrap_or(email).to_string(),
        token: token.to_string(),
    })
}

/// Role directory backed by the Firestore REST API, one document per user
/// under the `users` collection.
pub struct FirestoreRoles {
    client: Client,
    store_url: String,
    project_id: String,
}

impl FirestoreRoles {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(store_url: &str, project_id: &str) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            store_url: store_url.to_string(),
            project_id: project_id.to_string(),
        })
    }
}

#[async_trait]
impl RoleStore for FirestoreRoles {
    #[instrument(skip(self, token))]
    async fn fetch_role(&self, uid: &str, token: &str) -> Result<Option<String>, AuthError> {
        let document_url = endpoint_url(
            &self.store_url,
            &format!(
                "/v1/projects/{}/databases/(default)/documents/users/{uid}",
                self.project_id
            ),
        )
        .map_err(|err| AuthError::Lookup(err.to_string()))?;

        let response = self
            .client
            .get(&document_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| AuthError::Lookup(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("no directory document for uid {uid}");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            return Err(AuthError::Lookup(format!("{document_url} - {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AuthError::Lookup(err.to_string()))?;

        Ok(role_from_document(&body))
    }
}

fn role_from_document(body: &Value) -> Option<String> {
    body["fields"]["role"]["stringValue"]
        .as_str()
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_https_default_port() {
        let url = endpoint_url("https://identitytoolkit.googleapis.com", "/v1/accounts:signInWithPassword").unwrap();
        assert_eq!(
            url,
            "https://identitytoolkit.googleapis.com:443/v1/accounts:signInWithPassword"
        );
    }

    #[test]
    fn test_endpoint_url_explicit_port() {
        let url = endpoint_url("http://localhost:9099", "/v1/accounts:signInWithPassword").unwrap();
        assert_eq!(url, "http://localhost:9099/v1/accounts:signInWithPassword");
    }

    #[test]
    fn test_endpoint_url_rejects_unknown_scheme() {
        let result = endpoint_url("ftp://identitytoolkit.googleapis.com", "/v1");
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_url_rejects_missing_host() {
        let result = endpoint_url("https://", "/v1");
        assert!(result.is_err());
    }

    #[test]
    fn test_user_from_response() {
        let body = json!({
            "localId": "uid-1",
            "email": "admin@padelyzer.mx",
            "idToken": "token-1",
        });
        let user = authenticated_user_from_response("fallback@x.com", &body).unwrap();
        assert_eq!(user.uid, "uid-1");
        assert_eq!(user.email, "admin@padelyzer.mx");
        assert_eq!(user.token, "token-1");
    }

    #[test]
    fn test_user_from_response_missing_token() {
        let body = json!({ "localId": "uid-1" });
        let result = authenticated_user_from_response("a@x.com", &body);
        assert!(result.is_err());
    }

    #[test]
    fn test_role_from_document() {
        let body = json!({
            "name": "projects/p/databases/(default)/documents/users/uid-1",
            "fields": { "role": { "stringValue": "admin" } },
        });
        assert_eq!(role_from_document(&body), Some("admin".to_string()));
    }

    #[test]
    fn test_role_from_document_missing_field() {
        let body = json!({ "fields": {} });
        assert_eq!(role_from_document(&body), None);
    }
}
