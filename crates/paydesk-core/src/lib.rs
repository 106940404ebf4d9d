//! Client core for the paydesk merchant/admin payment console.
//!
//! This crate provides:
//!
//! - Payment-card validation (Luhn, brand, expiry, CVV) and display formatting
//! - Client-held sessions decoded from the bearer credential
//! - A role-based route guard for the merchant and admin areas
//! - An HTTP client for the auth, payment, transaction and card services
//! - Dashboard aggregates over the admin lists
//!
//! # Quick Start
//!
//! ```no_run
//! use paydesk_core::{ApiClient, ClientConfig, FileStore, SessionContext, TokenProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env();
//! let client = ApiClient::new(&config)?;
//!
//! let response = client.login("merchant", "secret").await?;
//! let mut session = SessionContext::restore(FileStore::at_default_location()?);
//! let claim = session.login_with(&response)?;
//! println!("logged in as {}", claim.role);
//!
//! let client = ApiClient::with_token_provider(&config, TokenProvider::from_session(&session))?;
//! for tx in client.list_transactions().await? {
//!     println!("{:?} {}", tx.id, tx.outcome());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `PAYDESK_AUTH_URL` | Auth service (default: `http://localhost:8084`) |
//! | `PAYDESK_PAYMENTS_URL` | Payment service (default: `http://localhost:8083`) |
//! | `PAYDESK_TRANSACTIONS_URL` | Transaction service (default: `http://localhost:8082`) |
//! | `PAYDESK_CARDS_URL` | Card administration (default: `http://localhost:8081`) |
//! | `PAYDESK_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `PAYDESK_CREDENTIALS` | Credential file path |

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod payment;
pub mod session;
pub mod types;
pub mod validator;

// Re-export main types
pub use api::{ApiClient, TokenProvider};
pub use config::{ClientConfig, ServiceUrls};
pub use dashboard::{fetch_dashboard, DashboardData, DashboardSummary, DataSource};
pub use error::{PaydeskError, PaydeskResult};
pub use guard::{guard, guard_route, GuardDecision, RedirectReason, Route};
pub use payment::{AmountBreakdown, FormCheck, PaymentForm, CURRENCY};
pub use session::{
    decode_token, ActiveSession, CredentialStore, FileStore, MemoryStore, Role, SessionClaim,
    SessionContext, SessionState, StoredCredential, TokenError,
};
pub use types::{
    BankCard, LoginResponse, MobileToken, PaymentEntity, PaymentOutcome, PaymentRequest,
    PaymentResponse, TransactionEntity, TransactionOutcome,
};
pub use validator::{
    can_submit, cvv_valid, detect_brand, expiry_valid, luhn_check, CardBrand, CardDraft,
};
