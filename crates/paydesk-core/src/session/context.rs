//! Session state machine.
//!
//! ```text
//! Loading ──initialize──▶ Authenticated(session)
//!    │                        │  ▲
//!    └──────────▶ Anonymous ◀─┘  │ login
//!                     └──────────┘
//! ```
//!
//! `Loading` is left by the first `initialize` and never re-entered.

use tracing::{debug, info, warn};

use crate::error::{PaydeskError, PaydeskResult};
use crate::session::claim::{decode_token, SessionClaim};
use crate::session::store::{CredentialStore, StoredCredential};
use crate::types::LoginResponse;

/// Token plus the claim decoded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    token: String,
    claim: SessionClaim,
}

impl ActiveSession {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claim(&self) -> &SessionClaim {
        &self.claim
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Authenticated(ActiveSession),
    Anonymous,
}

/// Owner of the current-user state and of the credential slot.
#[derive(Debug)]
pub struct SessionContext<S> {
    store: S,
    state: SessionState,
}

impl<S: CredentialStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Loading,
        }
    }

    /// Create and immediately run the start-up check.
    pub fn restore(store: S) -> Self {
        let mut context = Self::new(store);
        context.initialize();
        context
    }

    /// Resolve `Loading` from the stored credential. No-op afterwards.
    ///
    /// An undecodable or unreadable credential is discarded.
    pub fn initialize(&mut self) -> &SessionState {
        if self.state != SessionState::Loading {
            return &self.state;
        }

        self.state = match self.store.load() {
            Ok(Some(stored)) => match establish(&stored.token, fallback_user_id(&stored)) {
                Ok(session) => {
                    debug!(role = %session.claim.role, "restored session");
                    SessionState::Authenticated(session)
                }
                Err(e) => {
                    warn!(error = %e, "discarding stored credential");
                    self.discard();
                    SessionState::Anonymous
                }
            },
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!(error = %e, "unreadable credential slot");
                self.discard();
                SessionState::Anonymous
            }
        };

        &self.state
    }

    /// Decode and store `token`.
    ///
    /// A credential that does not decode is rejected: the slot is cleared and
    /// the session becomes anonymous.
    pub fn login(&mut self, token: &str) -> PaydeskResult<&SessionClaim> {
        self.login_inner(token, None)
    }

    /// Log in from an auth-service response.
    ///
    /// The token's role is authoritative; the response's `userId` only fills
    /// a user id the token does not carry.
    pub fn login_with(&mut self, response: &LoginResponse) -> PaydeskResult<&SessionClaim> {
        self.login_inner(&response.token, response.user_id)
            .inspect(|claim| {
                if let Some(reported) = response.role {
                    if reported != claim.role {
                        warn!(
                            token_role = %claim.role,
                            reported_role = %reported,
                            "login response role disagrees with credential"
                        );
                    }
                }
            })
    }

    fn login_inner(
        &mut self,
        token: &str,
        fallback_user_id: Option<i64>,
    ) -> PaydeskResult<&SessionClaim> {
        let session = match establish(token, fallback_user_id) {
            Ok(session) => session,
            Err(e) => {
                self.discard();
                self.state = SessionState::Anonymous;
                return Err(e);
            }
        };

        let stored = StoredCredential {
            token: session.token.clone(),
            role: Some(session.claim.role.as_str().to_string()),
            user_id: session.claim.user_id.map(|id| id.to_string()),
        };
        if let Err(e) = self.store.save(&stored) {
            self.discard();
            self.state = SessionState::Anonymous;
            return Err(e);
        }

        info!(role = %session.claim.role, user_id = ?session.claim.user_id, "logged in");
        self.state = SessionState::Authenticated(session);
        self.claim().ok_or(PaydeskError::NotAuthenticated)
    }

    /// Clear the slot and drop the session.
    pub fn logout(&mut self) -> PaydeskResult<()> {
        self.state = SessionState::Anonymous;
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn claim(&self) -> Option<&SessionClaim> {
        self.session().map(ActiveSession::claim)
    }

    /// Credential to present to the backend.
    pub fn bearer(&self) -> Option<&str> {
        self.session().map(ActiveSession::token)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn discard(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear credential slot");
        }
    }
}

fn establish(token: &str, fallback_user_id: Option<i64>) -> PaydeskResult<ActiveSession> {
    let mut claim = decode_token(token)?;
    if claim.user_id.is_none() {
        claim.user_id = fallback_user_id;
    }
    Ok(ActiveSession {
        token: token.trim().to_string(),
        claim,
    })
}

fn fallback_user_id(stored: &StoredCredential) -> Option<i64> {
    stored.user_id.as_deref().and_then(|id| id.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::claim::{encode_test_token, Role};
    use crate::session::store::MemoryStore;
    use crate::session::TokenError;
    use serde_json::json;

    fn token(role: &str) -> String {
        encode_test_token(&json!({"sub": "alice", "role": role, "userId": 42}))
    }

    fn stored(token: String) -> StoredCredential {
        StoredCredential {
            token,
            role: None,
            user_id: None,
        }
    }

    #[test]
    fn test_starts_loading() {
        let ctx = SessionContext::new(MemoryStore::new());
        assert_eq!(ctx.state(), &SessionState::Loading);
        assert!(ctx.bearer().is_none());
    }

    #[test]
    fn test_initialize_without_credential_is_anonymous() {
        let mut ctx = SessionContext::new(MemoryStore::new());
        assert_eq!(ctx.initialize(), &SessionState::Anonymous);
        assert_eq!(ctx.store().writes(), 0);
    }

    #[test]
    fn test_initialize_restores_valid_credential() {
        let ctx = SessionContext::restore(MemoryStore::with_credential(stored(token("MERCHANT"))));
        let claim = ctx.claim().expect("authenticated");
        assert_eq!(claim.role, Role::Merchant);
        assert_eq!(claim.user_id, Some(42));
        assert_eq!(ctx.bearer(), Some(token("MERCHANT").as_str()));
    }

    #[test]
    fn test_initialize_discards_undecodable_credential() {
        let ctx = SessionContext::restore(MemoryStore::with_credential(stored("garbage".into())));
        assert_eq!(ctx.state(), &SessionState::Anonymous);
        assert_eq!(ctx.store().load().unwrap(), None);
        assert_eq!(ctx.store().writes(), 1);
    }

    #[test]
    fn test_initialize_discards_expired_credential() {
        let token = encode_test_token(&json!({"role": "MERCHANT", "exp": 1_000_000.5}));
        let ctx = SessionContext::restore(MemoryStore::with_credential(stored(token)));
        assert_eq!(ctx.state(), &SessionState::Anonymous);
        assert_eq!(ctx.store().load().unwrap(), None);
    }

    #[test]
    fn test_initialize_uses_stored_user_id() {
        let token = encode_test_token(&json!({"sub": "alice", "role": "MERCHANT"}));
        let ctx = SessionContext::restore(MemoryStore::with_credential(StoredCredential {
            token,
            role: Some("MERCHANT".into()),
            user_id: Some("5".into()),
        }));
        assert_eq!(ctx.claim().unwrap().user_id, Some(5));
    }

    #[test]
    fn test_initialize_is_not_repeated() {
        let mut ctx = SessionContext::new(MemoryStore::new());
        ctx.initialize();
        ctx.login(&token("BANK_ADMIN")).unwrap();
        // A second start-up check must not reset the session.
        assert!(matches!(ctx.initialize(), SessionState::Authenticated(_)));
    }

    #[test]
    fn test_login_round_trip_role() {
        let mut ctx = SessionContext::restore(MemoryStore::new());
        let role = ctx.login(&token("BANK_ADMIN")).unwrap().role;
        assert_eq!(role, Role::BankAdmin);
        assert_eq!(ctx.claim().unwrap().role, Role::BankAdmin);
        assert_eq!(ctx.store().writes(), 1);

        let saved = ctx.store().load().unwrap().unwrap();
        assert_eq!(saved.role.as_deref(), Some("BANK_ADMIN"));
        assert_eq!(saved.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_login_rejects_malformed_credential() {
        let mut ctx = SessionContext::restore(MemoryStore::new());
        ctx.login(&token("MERCHANT")).unwrap();

        let err = ctx.login("not-a-token").unwrap_err();
        assert!(matches!(
            err,
            PaydeskError::InvalidToken(TokenError::Malformed { .. })
        ));
        assert_eq!(ctx.state(), &SessionState::Anonymous);
        assert_eq!(ctx.store().load().unwrap(), None);
        assert_eq!(ctx.store().writes(), 2);
    }

    #[test]
    fn test_login_with_response_fills_user_id() {
        let mut ctx = SessionContext::restore(MemoryStore::new());
        let response = LoginResponse {
            token: encode_test_token(&json!({"sub": "bob", "role": "MERCHANT"})),
            role: Some(Role::BankAdmin),
            user_id: Some(8),
        };

        let claim = ctx.login_with(&response).unwrap();
        assert_eq!(claim.role, Role::Merchant);
        assert_eq!(claim.user_id, Some(8));
    }

    /// Keeps its slot but refuses every `save`.
    struct ReadOnlySlot(MemoryStore);

    impl CredentialStore for ReadOnlySlot {
        fn load(&self) -> PaydeskResult<Option<StoredCredential>> {
            self.0.load()
        }

        fn save(&mut self, _credential: &StoredCredential) -> PaydeskResult<()> {
            Err(PaydeskError::Store {
                message: "disk full".into(),
            })
        }

        fn clear(&mut self) -> PaydeskResult<()> {
            self.0.clear()
        }
    }

    #[test]
    fn test_failed_save_clears_previous_credential() {
        let previous = MemoryStore::with_credential(stored(token("MERCHANT")));
        let mut ctx = SessionContext::restore(ReadOnlySlot(previous));
        assert!(ctx.claim().is_some());

        let err = ctx.login(&token("BANK_ADMIN")).unwrap_err();
        assert!(matches!(err, PaydeskError::Store { .. }));
        assert_eq!(ctx.state(), &SessionState::Anonymous);
        assert_eq!(ctx.store().load().unwrap(), None);

        // A later start-up finds nothing to restore.
        let restarted = SessionContext::restore(ctx.store().0.clone());
        assert_eq!(restarted.state(), &SessionState::Anonymous);
    }

    #[test]
    fn test_logout_single_write() {
        let mut ctx = SessionContext::restore(MemoryStore::new());
        ctx.login(&token("MERCHANT")).unwrap();
        ctx.logout().unwrap();

        assert_eq!(ctx.state(), &SessionState::Anonymous);
        assert_eq!(ctx.store().load().unwrap(), None);
        assert_eq!(ctx.store().writes(), 2);
    }
}
