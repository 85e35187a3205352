//! Backup, restore and sync of workflow definitions.
//!
//! A backup is a directory of pretty-printed workflow files named by
//! [`backup_file_name`]. Restoring creates a new workflow per file, so the
//! server assigns fresh IDs; nothing is overwritten.

use crate::client::Client;
use crate::error::ClientError;
use crate::template::{backup_file_name, load_workflow_from_file, save_workflow_to_file};
use crate::types::Workflow;
use crate::workflows::WorkflowFilter;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during backup, restore or sync.
#[derive(Debug, Error)]
pub enum BackupError {
    /// A server call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A backup file or directory could not be read or written.
    #[error("failed to access '{path}': {source}", path = path.display())]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Outcome of restoring a backup directory.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Workflows created, as returned by the server.
    pub restored: Vec<Workflow>,
    /// Files that could not be restored, with the reason.
    pub failed: Vec<(PathBuf, BackupError)>,
}

impl RestoreReport {
    /// Number of backup files considered.
    pub fn total(&self) -> usize {
        self.restored.len() + self.failed.len()
    }
}

/// Outcome of a sync between two servers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Names of workflows created on the target.
    pub created: Vec<String>,
    /// Names of workflows updated on the target.
    pub updated: Vec<String>,
}

/// Save every workflow matching `filter` into `dir`.
///
/// Returns the written paths in server order.
///
/// # Errors
///
/// Fails on the first listing or write error.
pub async fn backup_workflows(
    client: &Client,
    dir: &Path,
    filter: &WorkflowFilter,
) -> Result<Vec<PathBuf>, BackupError> {
    fs::create_dir_all(dir).map_err(|source| BackupError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let workflows = client.workflows().list(filter).await?;
    let mut written = Vec::with_capacity(workflows.len());

    for workflow in &workflows {
        let path = dir.join(backup_file_name(workflow));
        save_workflow_to_file(workflow, &path).map_err(|source| BackupError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(workflow_id = ?workflow.id, file = %path.display(), "Backed up workflow");
        written.push(path);
    }

    Ok(written)
}

/// Create a new workflow from every `*.json` file in `dir`.
///
/// Files are processed in path order. A file that fails to load or create is
/// recorded in the report and the rest are still attempted.
///
/// # Errors
///
/// Fails only if `dir` itself cannot be read.
pub async fn restore_workflows(client: &Client, dir: &Path) -> Result<RestoreReport, BackupError> {
    let entries = fs::read_dir(dir).map_err(|source| BackupError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut report = RestoreReport::default();
    for path in files {
        match restore_one(client, &path).await {
            Ok(created) => {
                tracing::info!(
                    file = %path.display(),
                    workflow_id = ?created.id,
                    "Restored workflow"
                );
                report.restored.push(created);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to restore workflow");
                report.failed.push((path, e));
            }
        }
    }

    Ok(report)
}

async fn restore_one(client: &Client, path: &Path) -> Result<Workflow, BackupError> {
    let mut workflow = load_workflow_from_file(path, None)?;
    workflow.id = None;
    Ok(client.workflows().create(&workflow).await?)
}

/// Copy every workflow from `source` to `target`, matching by name.
///
/// Workflows whose name exists on the target are updated in place; the rest
/// are created. Nothing on the target is deleted. Names are assumed unique on
/// the target; with duplicates, the last one listed is updated.
///
/// # Errors
///
/// Stops at the first failed call. Workflows already copied stay copied.
pub async fn sync_workflows(source: &Client, target: &Client) -> Result<SyncReport, BackupError> {
    let source_workflows = source.workflows().list(&WorkflowFilter::default()).await?;
    let target_ids: HashMap<String, String> = target
        .workflows()
        .list(&WorkflowFilter::default())
        .await?
        .into_iter()
        .filter_map(|w| w.id.map(|id| (w.name, id)))
        .collect();

    let mut report = SyncReport::default();
    for mut workflow in source_workflows {
        workflow.id = None;
        match target_ids.get(&workflow.name) {
            Some(id) => {
                target.workflows().update(id, &workflow).await?;
                tracing::info!(name = %workflow.name, workflow_id = %id, "Updated workflow on target");
                report.updated.push(workflow.name);
            }
            None => {
                target.workflows().create(&workflow).await?;
                tracing::info!(name = %workflow.name, "Created workflow on target");
                report.created.push(workflow.name);
            }
        }
    }

    Ok(report)
}
