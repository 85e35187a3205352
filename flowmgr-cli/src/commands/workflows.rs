//! Workflow commands - list, show, activate and deactivate workflows.

use super::ConnectionArgs;
use anyhow::{Context, Result};
use flowmgr_client::template::save_workflow_to_file;
use flowmgr_client::{Workflow, WorkflowFilter};
use std::path::Path;

/// Run the list-workflows command.
pub async fn list(conn: &ConnectionArgs, active: Option<bool>) -> Result<()> {
    let client = conn.connect()?;
    let filter = WorkflowFilter {
        active,
        ..WorkflowFilter::default()
    };

    tracing::info!(active = ?active, "Listing workflows");
    let workflows = client.workflows().list(&filter).await?;

    if workflows.is_empty() {
        println!("No workflows found.");
        return Ok(());
    }

    println!("Workflows ({} found)", workflows.len());
    println!();
    print!("{}", render_table(&workflows));

    Ok(())
}

/// Run the get-workflow command.
pub async fn get(conn: &ConnectionArgs, workflow_id: &str, output: Option<&Path>) -> Result<()> {
    let client = conn.connect()?;
    let workflow = client.workflows().get(workflow_id).await?;

    match output {
        Some(path) => {
            save_workflow_to_file(&workflow, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Workflow saved to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&workflow)?),
    }

    Ok(())
}

/// Run the activate command.
pub async fn activate(conn: &ConnectionArgs, workflow_id: &str) -> Result<()> {
    let client = conn.connect()?;
    let workflow = client.workflows().activate(workflow_id).await?;
    println!("✓ Workflow '{}' activated", workflow.name);
    Ok(())
}

/// Run the deactivate command.
pub async fn deactivate(conn: &ConnectionArgs, workflow_id: &str) -> Result<()> {
    let client = conn.connect()?;
    let workflow = client.workflows().deactivate(workflow_id).await?;
    println!("✓ Workflow '{}' deactivated", workflow.name);
    Ok(())
}

fn render_table(workflows: &[Workflow]) -> String {
    let id_width = workflows
        .iter()
        .map(|w| w.id.as_deref().unwrap_or("N/A").len())
        .max()
        .unwrap_or(0)
        .max(2);
    let name_width = workflows
        .iter()
        .map(|w| w.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = format!(
        "{:<id_width$}  {:<name_width$}  ACTIVE  NODES\n",
        "ID", "NAME"
    );
    out.push_str(&format!(
        "{:<id_width$}  {:<name_width$}  ------  -----\n",
        "--", "----"
    ));
    for workflow in workflows {
        out.push_str(&format!(
            "{:<id_width$}  {:<name_width$}  {:<6}  {}\n",
            workflow.id.as_deref().unwrap_or("N/A"),
            workflow.name,
            if workflow.active { "✓" } else { "✗" },
            workflow.nodes.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowmgr_client::Node;

    #[test]
    fn table_lists_id_name_active_and_node_count() {
        let mut first = Workflow::new(
            "Billing",
            vec![
                Node::new("Start", "n8n-nodes-base.start", [0.0, 0.0]),
                Node::new("Send", "n8n-nodes-base.emailSend", [200.0, 0.0]),
            ],
        );
        first.id = Some("12".into());
        first.active = true;
        let second = Workflow::new("Draft", Vec::new());

        let table = render_table(&[first, second]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID   NAME"));
        assert!(lines[2].starts_with("12   Billing  ✓"));
        assert!(lines[2].ends_with('2'));
        assert!(lines[3].starts_with("N/A  Draft"));
        assert!(lines[3].ends_with('0'));
    }
}
