//! Client-held authentication: credential decoding, the credential slot and
//! the session state machine.

mod claim;
mod context;
mod store;

pub use claim::{decode_token, decode_token_at, Role, SessionClaim, TokenError};
pub use context::{ActiveSession, SessionContext, SessionState};
pub use store::{CredentialStore, FileStore, MemoryStore, StoredCredential};

#[cfg(test)]
pub(crate) use claim::encode_test_token;
