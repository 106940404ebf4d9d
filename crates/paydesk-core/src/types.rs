//! Wire types for the banking backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Response from POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,

    /// Role as reported next to the token. Unrecognised values read as `None`.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,

    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Request body for POST /auth/login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Payment submitted by a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in MAD.
    pub montant: f64,

    /// Card number, digits only.
    pub numero_carte: String,

    /// `YYYY-MM`.
    pub expiration: String,

    pub cvv: String,
}

/// Response from the payment endpoint.
///
/// The bank reports declines in the body, so every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub transaction_id: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

/// How the bank settled a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PaymentOutcome {
    Approved { reference: String },
    Declined { message: String, code: String },
}

impl PaymentResponse {
    pub fn outcome(&self) -> PaymentOutcome {
        let approved = self.success == Some(true) || self.status.as_deref() == Some("SUCCESS");

        if approved {
            let reference = self
                .transaction_id
                .clone()
                .or_else(|| self.id.clone())
                .unwrap_or_else(|| "N/A".to_string());
            PaymentOutcome::Approved { reference }
        } else {
            PaymentOutcome::Declined {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "the transaction was declined by the bank".to_string()),
                code: self
                    .status
                    .clone()
                    .or_else(|| self.code.clone())
                    .unwrap_or_else(|| "ERROR".to_string()),
            }
        }
    }
}

/// Settlement state shown for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOutcome {
    Approved,
    Declined,
    Pending,
}

impl fmt::Display for TransactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Pending => "pending",
        })
    }
}

/// Transaction recorded by the transaction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntity {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    #[serde(default)]
    pub montant: Option<f64>,

    #[serde(default)]
    pub card_number: Option<String>,

    #[serde(default)]
    pub expiration: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub bank_code: Option<String>,

    #[serde(default)]
    pub bank_message: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    /// Older records carry `date` instead of `createdAt`.
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub user_id: Option<i64>,
}

impl TransactionEntity {
    pub fn outcome(&self) -> TransactionOutcome {
        match self.status.as_deref() {
            Some("SUCCESS") => TransactionOutcome::Approved,
            Some("FAILED") => TransactionOutcome::Declined,
            _ => TransactionOutcome::Pending,
        }
    }

    /// `createdAt`, else `date`.
    pub fn timestamp(&self) -> &str {
        self.created_at
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("")
    }
}

/// Payment recorded by the payment service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntity {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    #[serde(default)]
    pub montant: Option<f64>,

    #[serde(default)]
    pub card_last4: Option<String>,

    #[serde(default)]
    pub card_brand: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub user_id: Option<i64>,
}

impl PaymentEntity {
    pub fn timestamp(&self) -> &str {
        self.created_at
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("")
    }
}

/// Card held by the bank core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankCard {
    #[serde(default)]
    pub card_number: String,

    #[serde(default)]
    pub expiration: String,

    #[serde(default)]
    pub cvv: String,

    #[serde(default)]
    pub balance: f64,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl BankCard {
    /// `createdAt`, else `expiration`.
    pub fn timestamp(&self) -> &str {
        self.created_at.as_deref().unwrap_or(&self.expiration)
    }
}

/// Body of POST /admin/cards/create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCreate {
    pub card_number: String,
    pub expiration: String,
    pub cvv: String,
    pub balance: f64,
    pub active: bool,
}

/// Body of PUT /admin/cards/{number}/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub expiration: String,
    pub cvv: String,
    pub balance: f64,
    pub active: bool,
}

/// Response from POST /api/mobile-token/generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileToken {
    pub token: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_request_wire_names() {
        let req = PaymentRequest {
            montant: 120.5,
            numero_carte: "4111111111111111".into(),
            expiration: "2030-01".into(),
            cvv: "123".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "montant": 120.5,
                "numeroCarte": "4111111111111111",
                "expiration": "2030-01",
                "cvv": "123"
            })
        );
    }

    #[test]
    fn test_payment_outcome_approved() {
        let resp: PaymentResponse =
            serde_json::from_value(json!({"success": true, "transactionId": "TX-9"})).unwrap();
        assert_eq!(
            resp.outcome(),
            PaymentOutcome::Approved {
                reference: "TX-9".into()
            }
        );

        let resp: PaymentResponse =
            serde_json::from_value(json!({"status": "SUCCESS", "id": 77})).unwrap();
        assert_eq!(
            resp.outcome(),
            PaymentOutcome::Approved {
                reference: "77".into()
            }
        );

        let resp: PaymentResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(
            resp.outcome(),
            PaymentOutcome::Approved {
                reference: "N/A".into()
            }
        );
    }

    #[test]
    fn test_payment_outcome_declined() {
        let resp: PaymentResponse = serde_json::from_value(json!({
            "success": false,
            "message": "insufficient funds",
            "code": "51"
        }))
        .unwrap();
        assert_eq!(
            resp.outcome(),
            PaymentOutcome::Declined {
                message: "insufficient funds".into(),
                code: "51".into()
            }
        );

        assert_eq!(
            PaymentResponse::default().outcome(),
            PaymentOutcome::Declined {
                message: "the transaction was declined by the bank".into(),
                code: "ERROR".into()
            }
        );
    }

    #[test]
    fn test_transaction_outcome_and_timestamp() {
        let tx: TransactionEntity = serde_json::from_value(json!({
            "id": 3,
            "montant": 10.0,
            "status": "FAILED",
            "date": "2025-12-01 10:22"
        }))
        .unwrap();
        assert_eq!(tx.id.as_deref(), Some("3"));
        assert_eq!(tx.outcome(), TransactionOutcome::Declined);
        assert_eq!(tx.timestamp(), "2025-12-01 10:22");

        let tx = TransactionEntity {
            status: Some("PENDING".into()),
            ..Default::default()
        };
        assert_eq!(tx.outcome(), TransactionOutcome::Pending);
        assert_eq!(tx.timestamp(), "");
    }

    #[test]
    fn test_login_response_role() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "token": "a.b.c",
            "role": "BANK_ADMIN",
            "userId": 1
        }))
        .unwrap();
        assert_eq!(resp.role, Some(Role::BankAdmin));
        assert_eq!(resp.user_id, Some(1));

        let resp: LoginResponse = serde_json::from_value(json!({"token": "a.b.c"})).unwrap();
        assert!(resp.role.is_none());
    }

    #[test]
    fn test_login_response_role_is_lenient() {
        let resp: LoginResponse =
            serde_json::from_value(json!({"token": "a.b.c", "role": "ROLE_MERCHANT"})).unwrap();
        assert_eq!(resp.role, Some(Role::Merchant));

        for role in [json!("USER"), json!(3), json!(null)] {
            let resp: LoginResponse =
                serde_json::from_value(json!({"token": "a.b.c", "role": role})).unwrap();
            assert!(resp.role.is_none());
        }
    }
}
