//! Workflow operations.

use crate::error::{ClientError, Result, details};
use crate::transport::{Reply, Transport};
use crate::types::{Page, Workflow};
use reqwest::StatusCode;
use serde_json::{Value, json};
use urlencoding::encode;

/// Filters for listing workflows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowFilter {
    /// Only active (`true`) or inactive (`false`) workflows.
    pub active: Option<bool>,
    /// Only workflows carrying these tags.
    pub tags: Vec<String>,
}

impl WorkflowFilter {
    /// Restrict to active or inactive workflows.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Restrict to workflows with the given tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(active) = self.active {
            query.push(("active", active.to_string()));
        }
        if !self.tags.is_empty() {
            query.push(("tags", self.tags.join(",")));
        }
        query
    }
}

/// Workflow endpoints, borrowed from a [`Client`](crate::Client).
///
/// # Example
///
/// ```no_run
/// # use flowmgr_client::{Client, ClientConfig, WorkflowFilter};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new(ClientConfig::new("http://localhost:5678", "key"))?;
/// let active = client.workflows().list(&WorkflowFilter::default().active(true)).await?;
/// for workflow in active {
///     println!("{}: {}", workflow.id.unwrap_or_default(), workflow.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WorkflowApi<'a> {
    transport: &'a Transport,
}

impl<'a> WorkflowApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// List workflows in server order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the endpoint is missing, or
    /// [`ClientError::Api`] for any other failure.
    pub async fn list(&self, filter: &WorkflowFilter) -> Result<Vec<Workflow>> {
        let reply = self.transport.get("workflows", &filter.query()).await?;

        match reply.status() {
            _ if reply.is_success() => Ok(reply.json::<Page<Workflow>>()?.data),
            StatusCode::NOT_FOUND => Err(ClientError::not_found(
                "Workflows endpoint not found",
                "url",
                self.transport.url("workflows"),
            )),
            _ => Err(reply.into_api_error("Failed to list workflows")),
        }
    }

    /// Get a workflow by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no workflow has this ID.
    pub async fn get(&self, workflow_id: &str) -> Result<Workflow> {
        let path = format!("workflows/{}", encode(workflow_id));
        let reply = self.transport.get(&path, &[]).await?;

        match reply.status() {
            _ if reply.is_success() => reply.json(),
            StatusCode::NOT_FOUND => Err(not_found(workflow_id)),
            _ => Err(reply.into_api_error("Failed to get workflow")),
        }
    }

    /// Create a workflow. The returned value carries the server-assigned ID.
    ///
    /// Only the fields in [`Workflow::to_payload`] are sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the server rejects the payload.
    pub async fn create(&self, workflow: &Workflow) -> Result<Workflow> {
        let payload = workflow.to_payload();
        let reply = self.transport.post("workflows", Some(&payload)).await?;

        match reply.status() {
            _ if reply.is_success() => {
                let created: Workflow = reply.json()?;
                tracing::info!(workflow_id = ?created.id, name = %created.name, "Created workflow");
                Ok(created)
            }
            StatusCode::BAD_REQUEST => Err(invalid(reply, &payload)),
            _ => Err(reply.into_api_error("Failed to create workflow")),
        }
    }

    /// Decode raw workflow JSON and create it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if the JSON is not a workflow.
    pub async fn create_from_json(&self, workflow: Value) -> Result<Workflow> {
        let workflow = Workflow::from_value(workflow).map_err(|e| {
            ClientError::validation(
                format!("Invalid workflow data: {e}"),
                details([("error", json!(e.to_string()))]),
            )
        })?;
        self.create(&workflow).await
    }

    /// Replace a workflow's definition.
    ///
    /// The whole payload is resubmitted; `active` and `tags` are never sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] on 404, checked before
    /// [`ClientError::Validation`] on 400.
    pub async fn update(&self, workflow_id: &str, workflow: &Workflow) -> Result<Workflow> {
        let payload = workflow.to_payload();
        let path = format!("workflows/{}", encode(workflow_id));
        let reply = self.transport.put(&path, &payload).await?;

        match reply.status() {
            _ if reply.is_success() => reply.json(),
            StatusCode::NOT_FOUND => Err(not_found(workflow_id)),
            StatusCode::BAD_REQUEST => Err(invalid(reply, &payload)),
            _ => Err(reply.into_api_error("Failed to update workflow")),
        }
    }

    /// Delete a workflow.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no workflow has this ID.
    pub async fn delete(&self, workflow_id: &str) -> Result<bool> {
        let path = format!("workflows/{}", encode(workflow_id));
        let reply = self.transport.delete(&path).await?;

        match reply.status() {
            _ if reply.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Err(not_found(workflow_id)),
            _ => Err(reply.into_api_error("Failed to delete workflow")),
        }
    }

    /// Activate a workflow by fetching it and resubmitting it.
    ///
    /// Not atomic: a change made by someone else between the fetch and the
    /// update is overwritten without detection.
    pub async fn activate(&self, workflow_id: &str) -> Result<Workflow> {
        self.set_active(workflow_id, true).await
    }

    /// Deactivate a workflow by fetching it and resubmitting it.
    ///
    /// Not atomic, see [`WorkflowApi::activate`].
    pub async fn deactivate(&self, workflow_id: &str) -> Result<Workflow> {
        self.set_active(workflow_id, false).await
    }

    async fn set_active(&self, workflow_id: &str, active: bool) -> Result<Workflow> {
        let mut workflow = self.get(workflow_id).await?;
        workflow.active = active;
        tracing::debug!(workflow_id = %workflow_id, active, "Resubmitting workflow");
        self.update(workflow_id, &workflow).await
    }
}

fn not_found(workflow_id: &str) -> ClientError {
    ClientError::not_found(
        format!("Workflow {workflow_id} not found"),
        "workflow_id",
        workflow_id,
    )
}

fn invalid(reply: Reply, payload: &Value) -> ClientError {
    reply.into_validation_error(
        "Invalid workflow data",
        details([("payload", payload.clone())]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_encodes_active_and_tags() {
        let filter = WorkflowFilter::default().active(false).tag("prod").tag("billing");
        assert_eq!(
            filter.query(),
            vec![("active", "false".to_string()), ("tags", "prod,billing".to_string())]
        );
        assert!(WorkflowFilter::default().query().is_empty());
    }
}
