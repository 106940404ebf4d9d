//! Bearer credential decoding.
//!
//! Credentials are JWTs issued by the auth service. The client never holds the
//! signing key, so only the payload is decoded; the servers verify signatures.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim keys that may carry the numeric user id, in lookup order.
const USER_ID_KEYS: [&str; 3] = ["userId", "id", "user_id"];

/// Role carried by a session claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "MERCHANT")]
    Merchant,
    #[serde(rename = "BANK_ADMIN")]
    BankAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merchant => "MERCHANT",
            Self::BankAdmin => "BANK_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TokenError;

    /// Accepts the bare role name or its `ROLE_`-prefixed authority form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name.strip_prefix("ROLE_").unwrap_or(name) {
            "MERCHANT" => Ok(Self::Merchant),
            "BANK_ADMIN" => Ok(Self::BankAdmin),
            _ => Err(TokenError::UnknownRole {
                role: name.to_string(),
            }),
        }
    }
}

/// Why a credential could not be turned into a claim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("credential is empty")]
    Empty,

    #[error("expected 3 dot-separated segments, found {segments}")]
    Malformed { segments: usize },

    #[error("payload is not base64url: {reason}")]
    Encoding { reason: String },

    #[error("payload is not a JSON object: {reason}")]
    Payload { reason: String },

    #[error("missing role claim")]
    MissingRole,

    #[error("unknown role: {role}")]
    UnknownRole { role: String },

    #[error("credential has expired")]
    Expired,
}

/// Identity decoded from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClaim {
    /// `sub` claim (the username for tokens from the auth service).
    pub subject: Option<String>,

    pub role: Role,

    pub user_id: Option<i64>,

    /// `exp` claim.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Decode `token` against the current time.
pub fn decode_token(token: &str) -> Result<SessionClaim, TokenError> {
    decode_token_at(token, Utc::now())
}

/// Decode `token`, treating an `exp` at or before `now` as expired.
pub fn decode_token_at(token: &str, now: DateTime<Utc>) -> Result<SessionClaim, TokenError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed {
            segments: segments.len(),
        });
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| TokenError::Encoding {
            reason: e.to_string(),
        })?;

    let claims: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload {
            reason: e.to_string(),
        })?;

    let role = claims
        .get("role")
        .and_then(Value::as_str)
        .ok_or(TokenError::MissingRole)?
        .parse::<Role>()?;

    let subject = claims.get("sub").and_then(Value::as_str).map(String::from);

    let user_id = USER_ID_KEYS
        .iter()
        .find_map(|key| claims.get(*key).and_then(numeric))
        .or_else(|| subject.as_deref().and_then(|s| s.parse().ok()));

    let expires_at = match claims.get("exp") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let exp = value.as_f64().ok_or_else(|| TokenError::Payload {
                reason: format!("exp is not a number: {value}"),
            })?;
            // NumericDate may carry a fraction; whole seconds are enough here.
            let at = DateTime::from_timestamp(exp.floor() as i64, 0).ok_or(TokenError::Expired)?;
            if at <= now {
                return Err(TokenError::Expired);
            }
            Some(at)
        }
    };

    Ok(SessionClaim {
        subject,
        role,
        user_id,
        expires_at,
    })
}

fn numeric(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Unsigned token with the given payload, for tests across the crate.
#[cfg(test)]
pub(crate) fn encode_test_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn test_decode_merchant_token() {
        let token = encode_test_token(&json!({
            "sub": "shop42",
            "role": "MERCHANT",
            "userId": 42,
            "exp": 2_000_000_000
        }));

        let claim = decode_token_at(&token, at(1_700_000_000)).unwrap();
        assert_eq!(claim.subject.as_deref(), Some("shop42"));
        assert_eq!(claim.role, Role::Merchant);
        assert_eq!(claim.user_id, Some(42));
        assert_eq!(claim.expires_at, Some(at(2_000_000_000)));
    }

    #[test]
    fn test_decode_accepts_bearer_prefix_and_padding() {
        let token = encode_test_token(&json!({"sub": "root", "role": "BANK_ADMIN"}));
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1].push_str("==");
        let padded = format!("Bearer {}", parts.join("."));

        let claim = decode_token(&padded).unwrap();
        assert_eq!(claim.role, Role::BankAdmin);
        assert_eq!(claim.user_id, None);
        assert_eq!(claim.expires_at, None);
    }

    #[test]
    fn test_user_id_fallbacks() {
        let token = encode_test_token(&json!({"role": "MERCHANT", "user_id": "7"}));
        assert_eq!(decode_token(&token).unwrap().user_id, Some(7));

        let token = encode_test_token(&json!({"role": "MERCHANT", "id": 9}));
        assert_eq!(decode_token(&token).unwrap().user_id, Some(9));

        let token = encode_test_token(&json!({"role": "MERCHANT", "sub": "15"}));
        assert_eq!(decode_token(&token).unwrap().user_id, Some(15));
    }

    #[test]
    fn test_role_authority_prefix() {
        assert_eq!("ROLE_BANK_ADMIN".parse::<Role>().unwrap(), Role::BankAdmin);
        assert!(matches!(
            "AUDITOR".parse::<Role>(),
            Err(TokenError::UnknownRole { .. })
        ));
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(decode_token("   "), Err(TokenError::Empty));
        assert_eq!(
            decode_token("not-a-jwt"),
            Err(TokenError::Malformed { segments: 1 })
        );
        assert!(matches!(
            decode_token("a.!!!.c"),
            Err(TokenError::Encoding { .. })
        ));

        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("hello"));
        assert!(matches!(
            decode_token(&not_json),
            Err(TokenError::Payload { .. })
        ));

        let no_role = encode_test_token(&json!({"sub": "x"}));
        assert_eq!(decode_token(&no_role), Err(TokenError::MissingRole));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = encode_test_token(&json!({"role": "MERCHANT", "exp": 1_000}));
        assert_eq!(
            decode_token_at(&token, at(1_000)),
            Err(TokenError::Expired)
        );
        assert!(decode_token_at(&token, at(999)).is_ok());

        let fractional = encode_test_token(&json!({"role": "MERCHANT", "exp": 1000.5}));
        assert_eq!(
            decode_token_at(&fractional, at(1_000)),
            Err(TokenError::Expired)
        );
        let claim = decode_token_at(&fractional, at(999)).unwrap();
        assert_eq!(claim.expires_at, Some(at(1_000)));

        let text = encode_test_token(&json!({"role": "MERCHANT", "exp": "1000"}));
        assert!(matches!(
            decode_token_at(&text, at(999)),
            Err(TokenError::Payload { .. })
        ));
    }
}
