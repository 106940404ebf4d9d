//! Client configuration.
//!
//! Sources in increasing priority: defaults, an optional YAML file,
//! environment variables.
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `PAYDESK_AUTH_URL` | Auth service base URL |
//! | `PAYDESK_PAYMENTS_URL` | Payment service base URL |
//! | `PAYDESK_TRANSACTIONS_URL` | Transaction service base URL |
//! | `PAYDESK_CARDS_URL` | Card administration base URL |
//! | `PAYDESK_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `PAYDESK_CREDENTIALS` | Credential file path |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PaydeskError, PaydeskResult};

/// Base URL of each backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUrls {
    #[serde(default = "default_auth_url")]
    pub auth: String,

    #[serde(default = "default_payments_url")]
    pub payments: String,

    #[serde(default = "default_transactions_url")]
    pub transactions: String,

    #[serde(default = "default_cards_url")]
    pub cards: String,
}

fn default_auth_url() -> String {
    "http://localhost:8084".to_string()
}

fn default_payments_url() -> String {
    "http://localhost:8083".to_string()
}

fn default_transactions_url() -> String {
    "http://localhost:8082".to_string()
}

fn default_cards_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServiceUrls {
    fn default() -> Self {
        Self {
            auth: default_auth_url(),
            payments: default_payments_url(),
            transactions: default_transactions_url(),
            cards: default_cards_url(),
        }
    }
}

impl ServiceUrls {
    /// Every service behind one gateway.
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            auth: base.clone(),
            payments: base.clone(),
            transactions: base.clone(),
            cards: base,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub services: ServiceUrls,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Credential file; the per-user config directory when unset.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            services: ServiceUrls::default(),
            timeout_secs: default_timeout(),
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// YAML file overridden by the environment.
    pub fn load(path: &Path) -> PaydeskResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PaydeskError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| PaydeskError::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(url) = var("PAYDESK_AUTH_URL") {
            self.services.auth = url;
        }
        if let Some(url) = var("PAYDESK_PAYMENTS_URL") {
            self.services.payments = url;
        }
        if let Some(url) = var("PAYDESK_TRANSACTIONS_URL") {
            self.services.transactions = url;
        }
        if let Some(url) = var("PAYDESK_CARDS_URL") {
            self.services.cards = url;
        }
        if let Some(timeout) = var("PAYDESK_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.timeout_secs = timeout;
        }
        if let Some(path) = var("PAYDESK_CREDENTIALS") {
            self.credentials_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Reject URLs that are not absolute http(s) URLs.
    pub fn validate(&self) -> PaydeskResult<()> {
        let services = &self.services;
        for (name, value) in [
            ("auth", &services.auth),
            ("payments", &services.payments),
            ("transactions", &services.transactions),
            ("cards", &services.cards),
        ] {
            let url = Url::parse(value).map_err(|e| PaydeskError::Config {
                message: format!("invalid {} service URL {:?}: {}", name, value, e),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(PaydeskError::Config {
                    message: format!("{} service URL must be http(s): {}", name, value),
                });
            }
        }
        if self.timeout_secs == 0 {
            return Err(PaydeskError::Config {
                message: "timeout must be at least one second".into(),
            });
        }
        Ok(())
    }

    /// Route every service to `url`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.services = ServiceUrls::single(url);
        self
    }

    pub fn with_services(mut self, services: ServiceUrls) -> Self {
        self.services = services;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }
}
