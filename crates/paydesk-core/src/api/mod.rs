//! Client for the banking backend.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use tracing::{debug, info};

use crate::config::{ClientConfig, ServiceUrls};
use crate::error::{PaydeskError, PaydeskResult};
use crate::payment::PaymentForm;
use crate::types::{
    BankCard, CardCreate, CardUpdate, LoginRequest, LoginResponse, MobileToken, PaymentEntity,
    PaymentOutcome, PaymentRequest, PaymentResponse, TransactionEntity,
};
use crate::validator::CardDraft;

pub mod auth;
mod http;

pub use auth::TokenProvider;

use http::{endpoint, HttpBackend};

pub const USER_AGENT_VALUE: &str = concat!("paydesk/", env!("CARGO_PKG_VERSION"));

/// Client for the auth, payment, transaction and card services.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpBackend,
    services: ServiceUrls,
}

impl ApiClient {
    /// Unauthenticated client; only [`ApiClient::login`] will succeed.
    pub fn new(config: &ClientConfig) -> PaydeskResult<Self> {
        Self::with_token_provider(config, TokenProvider::None)
    }

    pub fn with_token_provider(
        config: &ClientConfig,
        token_provider: TokenProvider,
    ) -> PaydeskResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| PaydeskError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                token_provider,
            },
            services: config.services.clone(),
        })
    }

    /// Replace the credential, e.g. right after login.
    pub fn set_token_provider(&mut self, token_provider: TokenProvider) {
        self.http.token_provider = token_provider;
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.token_provider.is_authenticated()
    }

    pub fn services(&self) -> &ServiceUrls {
        &self.services
    }

    pub async fn login(&self, username: &str, password: &str) -> PaydeskResult<LoginResponse> {
        let url = endpoint(&self.services.auth, &["auth", "login"])?;
        debug!(url = %url, username, "logging in");

        let request = self
            .http
            .request(Method::POST, url)
            .json(&LoginRequest { username, password });
        let response = self.http.send(request, "login").await?;

        let login: LoginResponse =
            response
                .json()
                .await
                .map_err(|e| PaydeskError::InvalidResponse {
                    message: format!("failed to parse login response: {}", e),
                })?;

        if login.token.trim().is_empty() {
            return Err(PaydeskError::InvalidResponse {
                message: "login response carries no token".into(),
            });
        }
        Ok(login)
    }

    /// Submit a payment and return the bank's answer.
    ///
    /// Declines come back with an error status and a JSON explanation and are
    /// returned as a declined `PaymentResponse`, not as an error.
    pub async fn create_payment(&self, payment: &PaymentRequest) -> PaydeskResult<PaymentResponse> {
        let url = endpoint(&self.services.payments, &["merchant", "api", "payments"])?;
        debug!(url = %url, amount = payment.montant, "submitting payment");

        let request = self
            .http
            .authorized(self.http.request(Method::POST, url))?
            .json(payment);
        self.http.send_payment(request).await
    }

    /// Validate `form` against `reference` (`YYYY-MM`), then submit it.
    ///
    /// Nothing is sent unless every field is valid.
    pub async fn submit_payment(
        &self,
        form: &PaymentForm,
        reference: &str,
    ) -> PaydeskResult<PaymentOutcome> {
        let request = form.to_request(reference)?;
        let outcome = self.create_payment(&request).await?.outcome();
        match &outcome {
            PaymentOutcome::Approved { reference } => {
                info!(reference = %reference, "payment approved")
            }
            PaymentOutcome::Declined { code, .. } => info!(code = %code, "payment declined"),
        }
        Ok(outcome)
    }

    pub async fn list_payments(&self) -> PaydeskResult<Vec<PaymentEntity>> {
        let url = endpoint(&self.services.payments, &["api", "payments", "list"])?;
        debug!(url = %url, "listing payments");
        self.http.get_list(url, "payments").await
    }

    pub async fn list_transactions(&self) -> PaydeskResult<Vec<TransactionEntity>> {
        let url = endpoint(&self.services.transactions, &["api", "transactions", "list"])?;
        debug!(url = %url, "listing transactions");
        self.http.get_list(url, "transactions").await
    }

    pub async fn get_transaction(&self, id: &str) -> PaydeskResult<TransactionEntity> {
        let url = endpoint(&self.services.transactions, &["api", "transactions", id])?;
        debug!(url = %url, "fetching transaction");

        let request = self.http.authorized(self.http.request(Method::GET, url))?;
        let response = self
            .http
            .send(request, &format!("transaction {}", id))
            .await?;

        response
            .json()
            .await
            .map_err(|e| PaydeskError::InvalidResponse {
                message: format!("failed to parse transaction: {}", e),
            })
    }

    pub async fn list_cards(&self) -> PaydeskResult<Vec<BankCard>> {
        let url = endpoint(&self.services.cards, &["admin", "cards", "list"])?;
        debug!(url = %url, "listing cards");
        self.http.get_list(url, "cards").await
    }

    /// Create a card from a validated draft.
    pub async fn create_card(&self, draft: &CardDraft) -> PaydeskResult<()> {
        let balance = validated_balance(draft)?;
        let body = CardCreate {
            card_number: draft.digits(),
            expiration: draft.expiration.trim().to_string(),
            cvv: draft.cvv.clone(),
            balance,
            active: draft.active,
        };

        let url = endpoint(&self.services.cards, &["admin", "cards", "create"])?;
        debug!(url = %url, "creating card");

        let request = self
            .http
            .authorized(self.http.request(Method::POST, url))?
            .json(&body);
        self.http.send(request, "card").await?;
        info!("card created");
        Ok(())
    }

    /// Update the card identified by the draft's number.
    pub async fn update_card(&self, draft: &CardDraft) -> PaydeskResult<()> {
        let balance = validated_balance(draft)?;
        let number = draft.digits();
        let body = CardUpdate {
            expiration: draft.expiration.trim().to_string(),
            cvv: draft.cvv.clone(),
            balance,
            active: draft.active,
        };

        let url = endpoint(&self.services.cards, &["admin", "cards", &number, "update"])?;
        debug!(url = %url, "updating card");

        let request = self
            .http
            .authorized(self.http.request(Method::PUT, url))?
            .json(&body);
        self.http.send(request, &format!("card {}", number)).await?;
        info!("card updated");
        Ok(())
    }

    pub async fn delete_card(&self, card_number: &str) -> PaydeskResult<()> {
        let number = crate::validator::normalize_digits(card_number);
        if number.is_empty() {
            return Err(PaydeskError::Validation {
                fields: vec!["card_number"],
            });
        }

        let url = endpoint(&self.services.cards, &["admin", "cards", &number, "delete"])?;
        debug!(url = %url, "deleting card");

        let request = self.http.authorized(self.http.request(Method::DELETE, url))?;
        self.http.send(request, &format!("card {}", number)).await?;
        info!("card deleted");
        Ok(())
    }

    /// Issue a mobile payment token, valid `ttl_days` (server default when `None`).
    pub async fn generate_mobile_token(&self, ttl_days: Option<u32>) -> PaydeskResult<MobileToken> {
        let mut url = endpoint(&self.services.payments, &["api", "mobile-token", "generate"])?;
        if let Some(days) = ttl_days {
            url.query_pairs_mut()
                .append_pair("ttlDays", &days.to_string());
        }
        debug!(url = %url, "generating mobile token");

        let request = self.http.authorized(self.http.request(Method::POST, url))?;
        let response = self.http.send(request, "mobile token").await?;

        response
            .json()
            .await
            .map_err(|e| PaydeskError::InvalidResponse {
                message: format!("failed to parse mobile token: {}", e),
            })
    }

    pub async fn revoke_mobile_token(&self, id: i64) -> PaydeskResult<()> {
        let id = id.to_string();
        let url = endpoint(&self.services.payments, &["api", "mobile-token", "revoke", &id])?;
        debug!(url = %url, "revoking mobile token");

        let request = self.http.authorized(self.http.request(Method::POST, url))?;
        self.http
            .send(request, &format!("mobile token {}", id))
            .await?;
        info!(id = %id, "mobile token revoked");
        Ok(())
    }
}

fn validated_balance(draft: &CardDraft) -> PaydeskResult<f64> {
    let fields = draft.invalid_fields();
    if !fields.is_empty() {
        return Err(PaydeskError::Validation { fields });
    }
    draft.parsed_balance().ok_or(PaydeskError::Validation {
        fields: vec!["balance"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            ApiClient::new(&config),
            Err(PaydeskError::Config { .. })
        ));
    }

    #[test]
    fn test_token_provider_swap() {
        let mut client = ApiClient::new(&ClientConfig::default()).unwrap();
        assert!(!client.is_authenticated());
        client.set_token_provider(TokenProvider::bearer("a.b.c"));
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_validated_balance() {
        let draft = CardDraft {
            card_number: "4111111111111111".into(),
            expiration: "2030-01".into(),
            cvv: "123".into(),
            balance: "10".into(),
            active: true,
        };
        assert_eq!(validated_balance(&draft).unwrap(), 10.0);

        let bad = CardDraft {
            balance: "ten".into(),
            ..draft
        };
        assert!(matches!(
            validated_balance(&bad),
            Err(PaydeskError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_unauthenticated_calls_fail_before_sending() {
        // Unroutable port: any attempt to send would be a network error.
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9");
        let client = ApiClient::new(&config).unwrap();

        assert!(matches!(
            client.list_cards().await,
            Err(PaydeskError::NotAuthenticated)
        ));
        assert!(matches!(
            client.generate_mobile_token(None).await,
            Err(PaydeskError::NotAuthenticated)
        ));
    }
}
