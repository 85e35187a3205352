//! Deploy command - create a workflow from a (templated) JSON file.

use super::ConnectionArgs;
use anyhow::{Context, Result};
use flowmgr_client::template::load_workflow_from_file;
use serde_json::{Map, Value};
use std::path::Path;

/// Run the deploy command.
pub async fn run(conn: &ConnectionArgs, file: &Path, vars: &[String], activate: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Workflow file not found: {}", file.display());
    }

    let vars = parse_vars(vars)?;

    tracing::info!(
        file = %file.display(),
        variables = vars.len(),
        activate,
        "Deploying workflow"
    );

    println!("Loading workflow from {}...", file.display());
    let workflow = load_workflow_from_file(file, Some(&vars))
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let client = conn.connect()?;
    let created = client.workflows().create(&workflow).await?;
    let id = created
        .id
        .clone()
        .context("Server did not return an ID for the created workflow")?;

    println!("✓ Workflow deployed successfully");
    println!("  ID:   {}", id);
    println!("  Name: {}", created.name);

    if activate {
        client.workflows().activate(&id).await?;
        println!("✓ Workflow activated");
    }

    Ok(())
}

/// Parse `key=value` pairs into template variables. Keys and values are trimmed.
pub fn parse_vars(vars: &[String]) -> Result<Map<String, Value>> {
    vars.iter()
        .map(|var| {
            let (key, value) = var
                .split_once('=')
                .with_context(|| format!("Invalid variable format: {var} (expected key=value)"))?;
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("Invalid variable format: {var} (empty key)");
            }
            Ok((key.to_string(), Value::String(value.trim().to_string())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_key_value_pairs() {
        let vars = parse_vars(&strings(&["env = prod", "url=http://x?a=b"])).unwrap();
        assert_eq!(vars["env"], "prod");
        assert_eq!(vars["url"], "http://x?a=b");
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_vars(&strings(&["novalue"])).is_err());
        assert!(parse_vars(&strings(&["=value"])).is_err());
    }

    #[test]
    fn empty_list_is_empty_map() {
        assert!(parse_vars(&[]).unwrap().is_empty());
    }
}
