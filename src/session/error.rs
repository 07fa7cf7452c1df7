use thiserror::Error;

/// Generic message shown when the provider gives us nothing usable.
pub const AUTH_FALLBACK_MESSAGE: &str = "Error de autenticación";

#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider rejected the credentials.
    #[error("{0}")]
    Authentication(String),
    /// Valid credentials, but the account has no admin role.
    #[error("Acceso solo para administradores")]
    NotAuthorized,
    /// The role document could not be read.
    #[error("role lookup failed: {0}")]
    Lookup(String),
    /// Consumer asked for the identity of a session that has none.
    #[error("no authenticated session")]
    NotSignedIn,
}

impl AuthError {
    /// Build an [`AuthError::Authentication`] from a provider message,
    /// falling back to the generic message when the provider gave none.
    #[must_use]
    pub fn authentication(message: &str) -> Self {
        if message.trim().is_empty() {
            Self::Authentication(AUTH_FALLBACK_MESSAGE.to_string())
        } else {
            Self::Authentication(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_keeps_provider_message() {
        let err = AuthError::authentication("INVALID_PASSWORD");
        assert_eq!(err.to_string(), "INVALID_PASSWORD");
    }

    #[test]
    fn authentication_falls_back_on_empty_message() {
        let err = AuthError::authentication("   ");
        assert_eq!(err.to_string(), AUTH_FALLBACK_MESSAGE);
    }

    #[test]
    fn denial_message_is_the_admin_only_text() {
        assert_eq!(
            AuthError::NotAuthorized.to_string(),
            "Acceso solo para administradores"
        );
    }
}
