//! Typed async client for a workflow-automation server's REST API.
//!
//! This crate maps the server's workflow, execution and credential endpoints
//! onto typed models, folds every failure into one [`ClientError`], and adds
//! a few conveniences on top of plain CRUD: waiting for an execution to
//! finish, loading workflow definitions from (templated) JSON files, and
//! backing up or restoring workflows.
//!
//! # Example
//!
//! ```no_run
//! use flowmgr_client::{Client, ClientConfig, WaitOptions};
//! use flowmgr_client::template::load_workflow_from_file;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("http://localhost:5678", "my-api-key"))?;
//!
//! // Deploy a workflow definition
//! let workflow = load_workflow_from_file("flows/report.json", None)?;
//! let created = client.workflows().create(&workflow).await?;
//! let id = created.id.clone().unwrap_or_default();
//!
//! // Run it and wait for the result
//! let execution = client
//!     .executions()
//!     .run_and_wait(&id, Some(json!({ "day": "monday" })), &WaitOptions::default())
//!     .await?;
//! println!("finished: {}, success: {}", execution.finished, execution.is_successful());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`Client::from_env`] reads `N8N_API_KEY` and `N8N_BASE_URL` (plus the
//! optional settings documented on [`ClientConfig::from_env`]).
//!
//! # Error Handling
//!
//! ```no_run
//! # use flowmgr_client::{Client, ClientError};
//! # async fn example() -> Result<(), ClientError> {
//! # let client = Client::from_env()?;
//! match client.workflows().get("wf-1").await {
//!     Ok(workflow) => println!("Found: {}", workflow.name),
//!     Err(ClientError::NotFound { resource_id, .. }) => println!("No workflow {resource_id}"),
//!     Err(ClientError::RateLimit { retry_after, .. }) => println!("Slow down: {retry_after:?}"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod backup;
mod client;
mod config;
mod credentials;
mod error;
mod executions;
pub mod poll;
pub mod template;
mod transport;
mod types;
mod workflows;

// Re-export the main types
pub use client::Client;
pub use config::{API_KEY_ENV, BASE_URL_ENV, ClientConfig};
pub use credentials::CredentialApi;
pub use error::{ClientError, Result};
pub use executions::{DEFAULT_EXECUTION_LIMIT, ExecutionApi, ExecutionFilter};
pub use poll::{Clock, MockClock, SystemClock, WaitOptions};
pub use transport::API_KEY_HEADER;
pub use types::{
    CREDENTIAL_READ_ONLY_FIELDS, Credential, Execution, ExecutionData, ExecutionMode,
    ExecutionStatus, NODE_READ_ONLY_FIELDS, Node, Page, Settings, Tag, TagObject, Workflow,
};
pub use workflows::{WorkflowApi, WorkflowFilter};
