//! Authenticated HTTP transport.
//!
//! Sends JSON requests to `<base>/api/v1/...` and classifies the statuses
//! whose meaning does not depend on the resource (401, 429 and 5xx). Every
//! other response is handed back as a [`Reply`] for the resource client to
//! interpret.

use crate::error::{ClientError, Result, details};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-n8n-api-key";

/// Path segment appended to the configured base URL.
const API_PREFIX: &str = "api/v1";

/// Base delay before the first connection retry; doubled per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub(crate) struct Transport {
    http: HttpClient,
    api_base: String,
    max_retries: u32,
}

impl Transport {
    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key).map_err(|_| {
            ClientError::auth(
                "API key contains characters that are not valid in an HTTP header",
                Map::new(),
            )
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::api(format!("Failed to build HTTP client: {e}"), None, None))?;

        Ok(Self {
            http,
            api_base: format!("{}/{}", base_url.trim_end_matches('/'), API_PREFIX),
            max_retries,
        })
    }

    /// Build a full URL from a path.
    pub(crate) fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.api_base, path)
    }

    pub(crate) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Reply> {
        self.request(Method::GET, path, query, None).await
    }

    pub(crate) async fn post(&self, path: &str, body: Option<&Value>) -> Result<Reply> {
        self.request(Method::POST, path, &[], body).await
    }

    pub(crate) async fn put(&self, path: &str, body: &Value) -> Result<Reply> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub(crate) async fn patch(&self, path: &str, body: &Value) -> Result<Reply> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Reply> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Send a request, retrying connection failures, and classify the response.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Reply> {
        let url = self.url(path);
        let mut attempt: u32 = 0;

        let response = loop {
            let mut builder = self.http.request(method.clone(), &url);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            tracing::debug!(method = %method, url = %url, attempt, "Sending request");

            match builder.send().await {
                Ok(response) => break response,
                Err(e) if e.is_connect() && attempt < self.max_retries => {
                    let delay = RETRY_BASE_DELAY.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(ClientError::api(
                        format!("HTTP request to {url} failed: {e}"),
                        None,
                        None,
                    ));
                }
            }
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                ClientError::api(
                    format!("Failed to read response body: {e}"),
                    Some(status.as_u16()),
                    None,
                )
            })?
            .to_vec();

        tracing::debug!(method = %method, url = %url, status = status.as_u16(), "Received response");

        classify(Reply { status, body }, retry_after)
    }
}

/// Map the resource-independent failure statuses to errors.
fn classify(reply: Reply, retry_after: Option<u64>) -> Result<Reply> {
    match reply.status {
        StatusCode::UNAUTHORIZED => Err(ClientError::auth(
            "Authentication failed. Check your API key.",
            details([("status_code", json!(401))]),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimit {
            message: "Rate limit exceeded".to_string(),
            retry_after,
        }),
        status if status.is_server_error() => Err(ClientError::api(
            format!("Server error: {}", status.as_u16()),
            Some(status.as_u16()),
            reply.body_json(),
        )),
        _ => Ok(reply),
    }
}

/// A received response that still needs resource-specific interpretation.
#[derive(Debug)]
pub(crate) struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode a successful body.
    pub(crate) fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ClientError::api(
                format!("Failed to decode response: {e}"),
                Some(self.status.as_u16()),
                self.body_json(),
            )
        })
    }

    /// The body as JSON, falling back to its text. `None` when empty.
    pub(crate) fn body_json(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        Some(
            serde_json::from_slice(&self.body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned())),
        )
    }

    /// Server-provided error message, if the body has one.
    fn server_message(&self) -> Option<String> {
        match self.body_json()? {
            Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    /// Turn an unexpected status into an [`ClientError::Api`].
    pub(crate) fn into_api_error(self, context: &str) -> ClientError {
        let status = self.status.as_u16();
        let message = match self.server_message() {
            Some(server) => format!("{context}: HTTP {status}: {server}"),
            None => format!("{context}: HTTP {status}"),
        };
        ClientError::api(message, Some(status), self.body_json())
    }

    /// Turn a 400 into a [`ClientError::Validation`] carrying the server detail.
    pub(crate) fn into_validation_error(
        self,
        context: &str,
        mut extra: Map<String, Value>,
    ) -> ClientError {
        let message = match self.server_message() {
            Some(server) => format!("{context}: {server}"),
            None => context.to_string(),
        };
        extra.insert("status_code".into(), json!(self.status.as_u16()));
        extra.insert("response".into(), self.body_json().unwrap_or(Value::Null));
        ClientError::validation(message, extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> Transport {
        Transport::new(base, "key", Duration::from_secs(5), 0).unwrap()
    }

    fn reply(status: u16, body: &str) -> Reply {
        Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_url_building() {
        let t = transport("http://localhost:5678");
        assert_eq!(t.url("workflows"), "http://localhost:5678/api/v1/workflows");
        assert_eq!(t.url("/workflows"), "http://localhost:5678/api/v1/workflows");
    }

    #[test]
    fn test_url_building_with_trailing_slash() {
        let t = transport("http://localhost:5678/");
        assert_eq!(t.url("executions/1"), "http://localhost:5678/api/v1/executions/1");
    }

    #[test]
    fn rejects_api_key_with_newline() {
        let err = Transport::new("http://x", "bad\nkey", Duration::from_secs(1), 0).unwrap_err();
        assert!(matches!(err, ClientError::Auth { .. }));
    }

    #[test]
    fn classify_maps_shared_statuses() {
        assert!(matches!(
            classify(reply(401, ""), None),
            Err(ClientError::Auth { .. })
        ));
        assert!(matches!(
            classify(reply(429, ""), Some(30)),
            Err(ClientError::RateLimit {
                retry_after: Some(30),
                ..
            })
        ));
        match classify(reply(503, r#"{"message":"down"}"#), None) {
            Err(ClientError::Api {
                status, response, ..
            }) => {
                assert_eq!(status, Some(503));
                assert_eq!(response.unwrap()["message"], "down");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(classify(reply(404, ""), None).is_ok());
        assert!(classify(reply(400, ""), None).is_ok());
    }

    #[test]
    fn body_json_falls_back_to_text() {
        assert_eq!(reply(400, "plain").body_json(), Some(json!("plain")));
        assert_eq!(reply(204, "").body_json(), None);
    }

    #[test]
    fn api_error_includes_server_message() {
        let err = reply(409, r#"{"message":"conflict"}"#).into_api_error("Failed to create workflow");
        assert_eq!(err.to_string(), "Failed to create workflow: HTTP 409: conflict");
        assert_eq!(err.status(), Some(409));
    }
}
