//! Credential operations.

use crate::error::{ClientError, Result};
use crate::transport::Transport;
use crate::types::{Credential, Page};
use reqwest::StatusCode;
use serde_json::Map;
use urlencoding::encode;

/// Credential endpoints, borrowed from a [`Client`](crate::Client).
#[derive(Debug, Clone, Copy)]
pub struct CredentialApi<'a> {
    transport: &'a Transport,
}

impl<'a> CredentialApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// List credentials, optionally only those of one type.
    pub async fn list(&self, credential_type: Option<&str>) -> Result<Vec<Credential>> {
        let query: Vec<(&str, String)> = credential_type
            .map(|t| vec![("type", t.to_string())])
            .unwrap_or_default();
        let reply = self.transport.get("credentials", &query).await?;

        if reply.is_success() {
            Ok(reply.json::<Page<Credential>>()?.data)
        } else {
            Err(reply.into_api_error("Failed to list credentials"))
        }
    }

    /// Get a credential by ID.
    pub async fn get(&self, credential_id: &str) -> Result<Credential> {
        let path = format!("credentials/{}", encode(credential_id));
        let reply = self.transport.get(&path, &[]).await?;

        match reply.status() {
            _ if reply.is_success() => reply.json(),
            StatusCode::NOT_FOUND => Err(not_found(credential_id)),
            _ => Err(reply.into_api_error("Failed to get credential")),
        }
    }

    /// Create a credential.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the server rejects the payload.
    pub async fn create(&self, credential: &Credential) -> Result<Credential> {
        let payload = credential.to_payload();
        let reply = self.transport.post("credentials", Some(&payload)).await?;

        match reply.status() {
            _ if reply.is_success() => {
                let created: Credential = reply.json()?;
                tracing::info!(
                    credential_id = ?created.id,
                    credential_type = %created.credential_type,
                    "Created credential"
                );
                Ok(created)
            }
            StatusCode::BAD_REQUEST => {
                Err(reply.into_validation_error("Invalid credential data", Map::new()))
            }
            _ => Err(reply.into_api_error("Failed to create credential")),
        }
    }

    /// Update a credential with a partial replacement (PATCH).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] on 404, checked before
    /// [`ClientError::Validation`] on 400.
    pub async fn update(&self, credential_id: &str, credential: &Credential) -> Result<Credential> {
        let path = format!("credentials/{}", encode(credential_id));
        let reply = self.transport.patch(&path, &credential.to_payload()).await?;

        match reply.status() {
            _ if reply.is_success() => reply.json(),
            StatusCode::NOT_FOUND => Err(not_found(credential_id)),
            StatusCode::BAD_REQUEST => {
                Err(reply.into_validation_error("Invalid credential data", Map::new()))
            }
            _ => Err(reply.into_api_error("Failed to update credential")),
        }
    }

    /// Delete a credential.
    pub async fn delete(&self, credential_id: &str) -> Result<bool> {
        let path = format!("credentials/{}", encode(credential_id));
        let reply = self.transport.delete(&path).await?;

        match reply.status() {
            _ if reply.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Err(not_found(credential_id)),
            _ => Err(reply.into_api_error("Failed to delete credential")),
        }
    }
}

fn not_found(credential_id: &str) -> ClientError {
    ClientError::not_found(
        format!("Credential {credential_id} not found"),
        "credential_id",
        credential_id,
    )
}
