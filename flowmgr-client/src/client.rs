//! The client facade.

use crate::config::ClientConfig;
use crate::credentials::CredentialApi;
use crate::error::{ClientError, Result, details};
use crate::executions::ExecutionApi;
use crate::poll::{Clock, PollPolicy, SystemClock};
use crate::transport::Transport;
use crate::workflows::{WorkflowApi, WorkflowFilter};
use serde_json::{Map, json};
use std::sync::Arc;

/// A client for a workflow-automation server.
///
/// The client owns its HTTP connection pool. The pool is released when the
/// client is dropped or [closed](Client::close), whichever comes first.
///
/// # Example
///
/// ```no_run
/// use flowmgr_client::{Client, ClientConfig};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new("http://localhost:5678", "my-api-key")
///     .with_timeout(Duration::from_secs(30));
/// let client = Client::new(config)?;
///
/// client.health_check().await?;
/// let workflow = client.workflows().get("wf-1").await?;
/// println!("{} has {} nodes", workflow.name, workflow.nodes.len());
///
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    base_url: String,
    transport: Transport,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl Client {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the API key or base URL is missing,
    /// or [`ClientError::Validation`] if the base URL is not http(s).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_key = config.api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            ClientError::auth(
                "API key is required. Set N8N_API_KEY or pass it explicitly.",
                Map::new(),
            )
        })?;
        let base_url = config.base_url.filter(|u| !u.is_empty()).ok_or_else(|| {
            ClientError::auth(
                "Base URL is required. Set N8N_BASE_URL or pass it explicitly.",
                Map::new(),
            )
        })?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::validation(
                format!("Base URL must start with http:// or https://, got: {base_url}"),
                details([("base_url", json!(base_url))]),
            ));
        }

        let transport = Transport::new(&base_url, &api_key, config.timeout, config.max_retries)?;
        tracing::debug!(base_url = %base_url, "Created client");

        Ok(Self {
            base_url,
            transport,
            clock: Arc::new(SystemClock::new()),
            policy: PollPolicy {
                interval: config.poll_interval,
                timeout: config.poll_timeout,
            },
        })
    }

    /// Create a client from `N8N_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Replace the clock used when waiting on executions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Workflow operations.
    pub fn workflows(&self) -> WorkflowApi<'_> {
        WorkflowApi::new(&self.transport)
    }

    /// Execution operations.
    pub fn executions(&self) -> ExecutionApi<'_> {
        ExecutionApi::new(&self.transport, &*self.clock, self.policy)
    }

    /// Credential operations.
    pub fn credentials(&self) -> CredentialApi<'_> {
        CredentialApi::new(&self.transport)
    }

    /// Check that the server is reachable and accepts the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] describing the underlying failure.
    pub async fn health_check(&self) -> Result<()> {
        match self.workflows().list(&WorkflowFilter::default()).await {
            Ok(_) => Ok(()),
            Err(e) => Err(ClientError::api(
                format!("Health check failed: {e}"),
                e.status(),
                None,
            )),
        }
    }

    /// Release the connection pool now.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        tracing::debug!(base_url = %self.base_url, "Released HTTP connection pool");
    }
}
