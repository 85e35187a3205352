//! Backup and restore commands.

use super::ConnectionArgs;
use anyhow::{Context, Result};
use flowmgr_client::WorkflowFilter;
use flowmgr_client::backup::{backup_workflows, restore_workflows};
use std::path::Path;

/// Run the backup command.
pub async fn backup(conn: &ConnectionArgs, output: &Path, active_only: bool) -> Result<()> {
    let client = conn.connect()?;
    let filter = WorkflowFilter {
        // Only narrow the listing when asked; `false` would select inactive ones.
        active: active_only.then_some(true),
        ..WorkflowFilter::default()
    };

    let written = backup_workflows(&client, output, &filter)
        .await
        .with_context(|| format!("Backup to {} failed", output.display()))?;

    if written.is_empty() {
        println!("No workflows to backup.");
        return Ok(());
    }

    for path in &written {
        if let Some(name) = path.file_name() {
            println!("  ✓ {}", name.to_string_lossy());
        }
    }
    println!();
    println!(
        "✓ Successfully backed up {} workflows to {}",
        written.len(),
        output.display()
    );

    Ok(())
}

/// Run the restore command.
pub async fn restore(conn: &ConnectionArgs, input: &Path) -> Result<()> {
    let client = conn.connect()?;
    let report = restore_workflows(&client, input)
        .await
        .with_context(|| format!("Restore from {} failed", input.display()))?;

    for workflow in &report.restored {
        println!(
            "  ✓ {} (new ID: {})",
            workflow.name,
            workflow.id.as_deref().unwrap_or("N/A")
        );
    }
    for (path, error) in &report.failed {
        println!("  ✗ {}: {}", path.display(), error);
    }
    println!();
    println!(
        "Restored {}/{} workflows",
        report.restored.len(),
        report.total()
    );

    Ok(())
}
