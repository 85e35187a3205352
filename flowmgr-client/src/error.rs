//! Error types for the flowmgr client.
//!
//! Every fallible client operation resolves to exactly one [`ClientError`]
//! variant. Transport and decoding failures are folded into these variants
//! before they reach the caller.

use serde_json::{Map, Value, json};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when using the flowmgr client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credentials are missing or were rejected (HTTP 401).
    #[error("{message}")]
    Auth {
        /// Human-readable message.
        message: String,
        /// Structured detail.
        details: Map<String, Value>,
    },

    /// The targeted resource does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        /// Human-readable message.
        message: String,
        /// Identifier of the missing resource.
        resource_id: String,
        /// Structured detail.
        details: Map<String, Value>,
    },

    /// The request payload or a local workflow definition is malformed.
    #[error("{message}")]
    Validation {
        /// Human-readable message.
        message: String,
        /// Structured detail, including the server's validation body when available.
        details: Map<String, Value>,
    },

    /// Any other failed call.
    #[error("{message}")]
    Api {
        /// Human-readable message.
        message: String,
        /// HTTP status code, absent when no response was received.
        status: Option<u16>,
        /// Parsed response body, if any.
        response: Option<Value>,
    },

    /// The server is rate limiting this client (HTTP 429).
    #[error("{message}")]
    RateLimit {
        /// Human-readable message.
        message: String,
        /// Seconds to wait before retrying, when the server said so.
        retry_after: Option<u64>,
    },

    /// A polling operation gave up before the execution finished.
    #[error("{message}")]
    Timeout {
        /// Human-readable message.
        message: String,
        /// The execution that was being observed.
        execution_id: String,
        /// The deadline that was exceeded.
        timeout: Duration,
    },
}

impl ClientError {
    /// Build an authentication error.
    pub fn auth(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self::Auth {
            message: message.into(),
            details,
        }
    }

    /// Build a not-found error for the resource identified by `key = id`.
    pub fn not_found(message: impl Into<String>, key: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut details = Map::new();
        details.insert(key.to_string(), Value::String(id.clone()));
        Self::NotFound {
            message: message.into(),
            resource_id: id,
            details,
        }
    }

    /// Build a validation error.
    pub fn validation(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// Build a generic API error.
    pub fn api(message: impl Into<String>, status: Option<u16>, response: Option<Value>) -> Self {
        Self::Api {
            message: message.into(),
            status,
            response,
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Auth { message, .. }
            | Self::NotFound { message, .. }
            | Self::Validation { message, .. }
            | Self::Api { message, .. }
            | Self::RateLimit { message, .. }
            | Self::Timeout { message, .. } => message,
        }
    }

    /// Structured detail suitable for logging or display.
    pub fn details(&self) -> Map<String, Value> {
        match self {
            Self::Auth { details, .. }
            | Self::NotFound { details, .. }
            | Self::Validation { details, .. } => details.clone(),
            Self::Api {
                status, response, ..
            } => into_map(json!({ "status_code": status, "response": response })),
            Self::RateLimit { retry_after, .. } => into_map(json!({ "retry_after": retry_after })),
            Self::Timeout {
                execution_id,
                timeout,
                ..
            } => into_map(json!({
                "execution_id": execution_id,
                "timeout": timeout.as_secs_f64(),
            })),
        }
    }

    /// HTTP status code associated with this error, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { details, .. } => details
                .get("status_code")
                .and_then(Value::as_u64)
                .map(|s| s as u16),
            Self::NotFound { .. } => Some(404),
            Self::Validation { details, .. } => details
                .get("status_code")
                .and_then(Value::as_u64)
                .map(|s| s as u16),
            Self::Api { status, .. } => *status,
            Self::RateLimit { .. } => Some(429),
            Self::Timeout { .. } => None,
        }
    }
}

/// Build a detail map from `(key, value)` pairs.
pub(crate) fn details<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
