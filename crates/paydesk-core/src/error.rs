//! Error types for the paydesk client.

use crate::session::TokenError;

/// Paydesk errors.
#[derive(Debug, thiserror::Error)]
pub enum PaydeskError {
    /// Bearer credential could not be decoded into a session claim.
    #[error("invalid credential: {0}")]
    InvalidToken(#[from] TokenError),

    /// The operation needs a session and there is none.
    #[error("not logged in")]
    NotAuthenticated,

    /// Server rejected the credential (401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Server refused the operation for this role (403).
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Resource does not exist (404).
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// One or more form fields are invalid.
    #[error("invalid input: {}", fields.join(", "))]
    Validation { fields: Vec<&'static str> },

    /// Transport failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-success status not covered by a dedicated variant.
    #[error("server error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Credential storage error.
    #[error("credential store error: {message}")]
    Store { message: String },
}

impl PaydeskError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 1,
            Self::Config { .. } => 1,
            Self::Api { .. } => 1,

            // Auth issues
            Self::InvalidToken(_) => 2,
            Self::NotAuthenticated => 2,
            Self::Unauthorized { .. } => 2,
            Self::Forbidden { .. } => 2,

            Self::Validation { .. } => 3,

            Self::Network { .. } => 5,

            Self::InvalidResponse { .. } => 6,
            Self::Store { .. } => 6,
        }
    }

    /// Whether the session should be torn down after this error.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::InvalidToken(_) | Self::Unauthorized { .. })
    }

    /// Generic message shown to the user in place of transport details.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "unable to reach the payment server, check your connection or try again later"
                    .to_string()
            }
            Self::NotAuthenticated | Self::Unauthorized { .. } | Self::InvalidToken(_) => {
                "you must be logged in to perform this action".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for PaydeskError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for paydesk operations.
pub type PaydeskResult<T> = Result<T, PaydeskError>;
