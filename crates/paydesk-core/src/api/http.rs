//! HTTP layer: URL building, auth header, status mapping.
//!
//! This is the ONLY place for status code handling. api/mod.rs never
//! interprets status codes.

use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::api::auth::TokenProvider;
use crate::error::{PaydeskError, PaydeskResult};
use crate::types::PaymentResponse;

/// HTTP backend for making requests (holds reqwest client and auth).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) token_provider: TokenProvider,
}

/// `base` with `segments` appended, each percent-encoded.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> PaydeskResult<Url> {
    let mut url = Url::parse(base).map_err(|e| PaydeskError::Config {
        message: format!("invalid service URL {:?}: {}", base, e),
    })?;
    url.path_segments_mut()
        .map_err(|()| PaydeskError::Config {
            message: format!("service URL cannot be a base: {}", base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl HttpBackend {
    pub(crate) fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Attach the bearer credential; fails without a session.
    pub(crate) fn authorized(&self, request: RequestBuilder) -> PaydeskResult<RequestBuilder> {
        let token = self
            .token_provider
            .token()
            .ok_or(PaydeskError::NotAuthenticated)?;
        Ok(request.header(AUTHORIZATION, format!("Bearer {}", token)))
    }

    /// Send and map non-success statuses to errors.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> PaydeskResult<Response> {
        let response = self.send_raw(request).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_for_status(response, resource).await)
    }

    /// Send without status mapping; only transport failures are errors.
    async fn send_raw(&self, request: RequestBuilder) -> PaydeskResult<Response> {
        let response = request.send().await?;
        debug!(url = %response.url(), status = response.status().as_u16(), "response");
        Ok(response)
    }

    /// Send a payment and read the bank's answer on any status but
    /// 401, 403 and 404.
    ///
    /// A non-success body that is not a payment answer is an `Api` error.
    pub(crate) async fn send_payment(
        &self,
        request: RequestBuilder,
    ) -> PaydeskResult<PaymentResponse> {
        let response = self.send_raw(request).await?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Err(error_for_status(response, "payment endpoint").await);
        }

        let body = response.text().await.map_err(|e| PaydeskError::Network {
            message: format!("failed to read payment response: {}", e),
        })?;

        match serde_json::from_str::<PaymentResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(PaydeskError::Api {
                status: status.as_u16(),
                message: body.trim().to_string(),
            }),
            Err(e) => Err(PaydeskError::InvalidResponse {
                message: format!("failed to parse payment response: {}", e),
            }),
        }
    }

    /// GET a list endpoint. Anything but a JSON array is an empty list.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        url: Url,
        resource: &str,
    ) -> PaydeskResult<Vec<T>> {
        let request = self.authorized(self.request(reqwest::Method::GET, url))?;
        let response = self.send(request, resource).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| PaydeskError::InvalidResponse {
                message: format!("failed to parse {} list: {}", resource, e),
            })?;

        match body {
            Value::Array(_) => {
                serde_json::from_value(body).map_err(|e| PaydeskError::InvalidResponse {
                    message: format!("unexpected {} record: {}", resource, e),
                })
            }
            other => {
                warn!(resource, kind = json_kind(&other), "list endpoint did not return an array");
                Ok(Vec::new())
            }
        }
    }
}

/// Map a non-success response to an error.
async fn error_for_status(response: Response, resource: &str) -> PaydeskError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = server_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED => PaydeskError::Unauthorized { message },
        StatusCode::FORBIDDEN => PaydeskError::Forbidden { message },
        StatusCode::NOT_FOUND => PaydeskError::NotFound {
            resource: resource.to_string(),
        },
        _ => PaydeskError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// `message` or `error` field of a JSON body, else the trimmed text.
fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(String::from)
            .or_else(|| Some(body.to_string()));
    }

    Some(body.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
