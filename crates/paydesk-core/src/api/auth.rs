//! Credential presented to the backend.
//!
//! Every service is called with the session's bearer credential; there is no
//! second scheme.

use crate::session::{CredentialStore, SessionContext};

/// Token provider for backend authentication.
#[derive(Debug, Clone, Default)]
pub enum TokenProvider {
    /// Bearer credential from a session.
    Bearer(String),

    /// No authentication (login only).
    #[default]
    None,
}

impl TokenProvider {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Current credential of `session`, if authenticated.
    pub fn from_session<S: CredentialStore>(session: &SessionContext<S>) -> Self {
        session
            .bearer()
            .map(Self::bearer)
            .unwrap_or(Self::None)
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Bearer(token) => Some(token),
            Self::None => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{encode_test_token, MemoryStore};
    use serde_json::json;

    #[test]
    fn test_from_anonymous_session() {
        let session = SessionContext::restore(MemoryStore::new());
        let provider = TokenProvider::from_session(&session);
        assert!(!provider.is_authenticated());
        assert_eq!(provider.token(), None);
    }

    #[test]
    fn test_from_authenticated_session() {
        let token = encode_test_token(&json!({"role": "MERCHANT"}));
        let mut session = SessionContext::restore(MemoryStore::new());
        session.login(&token).unwrap();

        let provider = TokenProvider::from_session(&session);
        assert!(provider.is_authenticated());
        assert_eq!(provider.token(), Some(token.as_str()));
    }
}
