//! Execution operations and waiting.

use crate::error::{ClientError, Result};
use crate::poll::{Clock, PollPolicy, WaitOptions, wait_until_finished};
use crate::transport::Transport;
use crate::types::{Execution, ExecutionStatus, Page};
use reqwest::StatusCode;
use serde_json::{Value, json};
use urlencoding::encode;

/// Default page size for listing executions.
pub const DEFAULT_EXECUTION_LIMIT: u32 = 100;

/// Filters for listing executions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFilter {
    /// Only executions of this workflow.
    pub workflow_id: Option<String>,
    /// Only executions in this status.
    pub status: Option<ExecutionStatus>,
    /// Maximum number of executions returned. Always sent.
    pub limit: u32,
}

impl Default for ExecutionFilter {
    fn default() -> Self {
        Self {
            workflow_id: None,
            status: None,
            limit: DEFAULT_EXECUTION_LIMIT,
        }
    }
}

impl ExecutionFilter {
    /// Restrict to one workflow.
    #[must_use]
    pub fn workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = Some(workflow_id.into());
        self
    }

    /// Restrict to one status.
    #[must_use]
    pub fn status(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(workflow_id) = &self.workflow_id {
            query.push(("workflowId", workflow_id.clone()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.to_string()));
        }
        query
    }
}

/// Execution endpoints, borrowed from a [`Client`](crate::Client).
#[derive(Debug, Clone, Copy)]
pub struct ExecutionApi<'a> {
    transport: &'a Transport,
    clock: &'a dyn Clock,
    policy: PollPolicy,
}

impl<'a> ExecutionApi<'a> {
    pub(crate) fn new(transport: &'a Transport, clock: &'a dyn Clock, policy: PollPolicy) -> Self {
        Self {
            transport,
            clock,
            policy,
        }
    }

    /// List executions, newest first as ordered by the server.
    pub async fn list(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>> {
        let reply = self.transport.get("executions", &filter.query()).await?;

        if reply.is_success() {
            Ok(reply.json::<Page<Execution>>()?.data)
        } else {
            Err(reply.into_api_error("Failed to list executions"))
        }
    }

    /// Get an execution by ID.
    ///
    /// # Arguments
    ///
    /// * `execution_id` - Execution to fetch
    /// * `include_data` - Whether the run-time data should be included
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no execution has this ID.
    pub async fn get(&self, execution_id: &str, include_data: bool) -> Result<Execution> {
        let path = format!("executions/{}", encode(execution_id));
        let query = if include_data {
            Vec::new()
        } else {
            vec![("includeData", "false".to_string())]
        };
        let reply = self.transport.get(&path, &query).await?;

        match reply.status() {
            _ if reply.is_success() => reply.json(),
            StatusCode::NOT_FOUND => Err(not_found(execution_id)),
            _ => Err(reply.into_api_error("Failed to get execution")),
        }
    }

    /// Delete an execution.
    pub async fn delete(&self, execution_id: &str) -> Result<bool> {
        let path = format!("executions/{}", encode(execution_id));
        let reply = self.transport.delete(&path).await?;

        match reply.status() {
            _ if reply.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Err(not_found(execution_id)),
            _ => Err(reply.into_api_error("Failed to delete execution")),
        }
    }

    /// Retry an execution. Returns the new execution, whose `retry_of` points
    /// at the original.
    pub async fn retry(&self, execution_id: &str) -> Result<Execution> {
        let path = format!("executions/{}/retry", encode(execution_id));
        let reply = self.transport.post(&path, None).await?;

        match reply.status() {
            _ if reply.is_success() => {
                let execution: Execution = reply.json()?;
                tracing::info!(
                    execution_id = %execution_id,
                    retry_id = %execution.id,
                    "Retried execution"
                );
                Ok(execution)
            }
            StatusCode::NOT_FOUND => Err(not_found(execution_id)),
            _ => Err(reply.into_api_error("Failed to retry execution")),
        }
    }

    /// Start a workflow run.
    ///
    /// The input is sent as `{"data": input}`. A missing input, `null`, or an
    /// empty object sends no body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] naming the workflow if it does not exist.
    pub async fn trigger_workflow(
        &self,
        workflow_id: &str,
        input: Option<Value>,
    ) -> Result<Execution> {
        let path = format!("workflows/{}/execute", encode(workflow_id));
        let body = input
            .filter(|data| !is_empty_input(data))
            .map(|data| json!({ "data": data }));
        let reply = self.transport.post(&path, body.as_ref()).await?;

        match reply.status() {
            _ if reply.is_success() => {
                let execution: Execution = reply.json()?;
                tracing::info!(
                    workflow_id = %workflow_id,
                    execution_id = %execution.id,
                    "Triggered workflow"
                );
                Ok(execution)
            }
            StatusCode::NOT_FOUND => Err(ClientError::not_found(
                format!("Workflow {workflow_id} not found"),
                "workflow_id",
                workflow_id,
            )),
            _ => Err(reply.into_api_error("Failed to trigger workflow")),
        }
    }

    /// Poll an execution until it stops running.
    ///
    /// Uses the client's poll interval and timeout unless `options` overrides
    /// them. Dropping the returned future stops observing; the run itself
    /// continues on the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] if the execution is still running when
    /// the deadline passes. Errors from fetching are returned unchanged.
    pub async fn wait_for_execution(
        &self,
        execution_id: &str,
        options: &WaitOptions,
    ) -> Result<Execution> {
        let policy = self.policy.with_overrides(options);
        wait_until_finished(self.clock, execution_id, policy, || {
            self.get(execution_id, true)
        })
        .await
    }

    /// Trigger a workflow and wait for the resulting execution.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use flowmgr_client::{Client, ClientConfig, WaitOptions};
    /// # use std::time::Duration;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::new(ClientConfig::new("http://localhost:5678", "key"))?;
    /// let execution = client
    ///     .executions()
    ///     .run_and_wait("wf-1", None, &WaitOptions::default().timeout(Duration::from_secs(60)))
    ///     .await?;
    /// println!("{}: {:?}", execution.id, execution.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_and_wait(
        &self,
        workflow_id: &str,
        input: Option<Value>,
        options: &WaitOptions,
    ) -> Result<Execution> {
        let started = self.trigger_workflow(workflow_id, input).await?;
        self.wait_for_execution(&started.id, options).await
    }
}

fn is_empty_input(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn not_found(execution_id: &str) -> ClientError {
    ClientError::not_found(
        format!("Execution {execution_id} not found"),
        "execution_id",
        execution_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_always_sends_limit() {
        assert_eq!(
            ExecutionFilter::default().query(),
            vec![("limit", "100".to_string())]
        );

        let filter = ExecutionFilter::default()
            .workflow("wf-1")
            .status(ExecutionStatus::Error)
            .limit(5);
        assert_eq!(
            filter.query(),
            vec![
                ("limit", "5".to_string()),
                ("workflowId", "wf-1".to_string()),
                ("status", "error".to_string()),
            ]
        );
    }
}
