//! Execution commands - run workflows and inspect their executions.

use super::ConnectionArgs;
use anyhow::{Context, Result};
use flowmgr_client::{Execution, ExecutionFilter, ExecutionStatus, WaitOptions};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Options for the execute command.
#[derive(Debug)]
pub struct ExecuteOptions<'a> {
    /// Workflow to run.
    pub workflow_id: &'a str,
    /// Wait for the execution to finish.
    pub wait: bool,
    /// Wait deadline.
    pub timeout: Duration,
    /// JSON file with input data.
    pub input: Option<&'a Path>,
}

/// Run the execute command.
pub async fn execute(conn: &ConnectionArgs, options: ExecuteOptions<'_>) -> Result<()> {
    let input = options.input.map(read_input).transpose()?;
    let client = conn.connect()?;

    println!("Executing workflow {}...", options.workflow_id);

    if !options.wait {
        let execution = client
            .executions()
            .trigger_workflow(options.workflow_id, input)
            .await?;
        println!("✓ Workflow triggered");
        println!("  Execution ID: {}", execution.id);
        return Ok(());
    }

    let wait = WaitOptions::default().timeout(options.timeout);
    let execution = client
        .executions()
        .run_and_wait(options.workflow_id, input, &wait)
        .await?;

    println!("✓ Execution completed");
    println!("  Execution ID: {}", execution.id);
    println!("  Status:       {}", status_label(&execution));
    println!("  Finished:     {}", execution.finished);
    if execution.is_successful() {
        println!("  Result:       Success ✓");
    } else if execution.is_failed() {
        println!("  Result:       Failed ✗");
    }

    Ok(())
}

/// Run the list-executions command.
pub async fn list(
    conn: &ConnectionArgs,
    workflow_id: Option<&str>,
    status: Option<&str>,
    limit: u32,
) -> Result<()> {
    let client = conn.connect()?;

    let mut filter = ExecutionFilter::default().limit(limit);
    if let Some(workflow_id) = workflow_id {
        filter = filter.workflow(workflow_id);
    }
    if let Some(status) = status {
        filter = filter.status(status.parse::<ExecutionStatus>()?);
    }

    let executions = client.executions().list(&filter).await?;
    if executions.is_empty() {
        println!("No executions found.");
        return Ok(());
    }

    println!("{:<12}  {:<12}  {:<10}  {:<9}  STARTED", "ID", "WORKFLOW", "STATUS", "MODE");
    println!("{:<12}  {:<12}  {:<10}  {:<9}  -------", "--", "--------", "------", "----");
    for execution in &executions {
        println!(
            "{:<12}  {:<12}  {:<10}  {:<9}  {}",
            execution.id,
            execution.workflow_id,
            status_label(execution),
            execution.mode,
            execution
                .started_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    Ok(())
}

/// Run the retry command.
pub async fn retry(conn: &ConnectionArgs, execution_id: &str) -> Result<()> {
    let client = conn.connect()?;
    let execution = client.executions().retry(execution_id).await?;
    println!("✓ Execution {} retried", execution_id);
    println!("  New execution ID: {}", execution.id);
    Ok(())
}

fn read_input(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Input file is not valid JSON: {}", path.display()))
}

fn status_label(execution: &Execution) -> String {
    execution
        .status
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
