//! Loading workflow definitions from JSON text and templates.
//!
//! Workflow files are plain JSON. When variables are supplied the text is
//! first rendered as a minijinja template, so a file can contain
//! `"name": "{{ env }}-sync"` and be deployed once per environment:
//!
//! ```
//! use flowmgr_client::template::load_workflow_from_str;
//! use serde_json::{Map, json};
//!
//! let text = r#"{"name": "{{ env }}-sync", "nodes": []}"#;
//! let mut vars = Map::new();
//! vars.insert("env".into(), json!("staging"));
//!
//! let workflow = load_workflow_from_str(text, "inline", Some(&vars)).unwrap();
//! assert_eq!(workflow.name, "staging-sync");
//! ```
//!
//! Undefined variables are errors rather than empty strings. Nothing here
//! talks to the server.

use crate::error::{ClientError, Result, details};
use crate::types::Workflow;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde_json::{Map, Value, json};
use std::fs;
use std::io;
use std::path::Path;

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    // Workflow files end in `.json`; values are spliced in verbatim.
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

/// Render a workflow template and parse the result as JSON.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if rendering fails (including an
/// undefined variable) or the rendered text is not valid JSON.
pub fn render_workflow_template(text: &str, vars: &Map<String, Value>) -> Result<Value> {
    let rendered = environment()
        .render_str(text, vars)
        .map_err(|e| render_failed(&e))?;
    parse_rendered(&rendered)
}

/// Build a workflow from already-read text.
///
/// `source` names the text in error details (usually a file path). The text
/// is rendered as a template only when `vars` is present and non-empty.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] with `{file, error}` details on any
/// templating, JSON or shape failure.
pub fn load_workflow_from_str(
    text: &str,
    source: &str,
    vars: Option<&Map<String, Value>>,
) -> Result<Workflow> {
    let with_source = |e: ClientError| match e {
        ClientError::Validation { message, details } => {
            let error = details
                .get("error")
                .cloned()
                .unwrap_or_else(|| json!(message));
            ClientError::validation(message, source_details(source, error))
        }
        other => other,
    };

    let value = match vars.filter(|v| !v.is_empty()) {
        Some(vars) => render_workflow_template(text, vars).map_err(with_source)?,
        None => serde_json::from_str(text).map_err(|e| {
            ClientError::validation(
                format!("Invalid JSON in workflow file: {e}"),
                source_details(source, json!(e.to_string())),
            )
        })?,
    };

    into_workflow(value, source)
}

/// Read and load a workflow file.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] naming the file if it cannot be read
/// or does not hold a valid workflow.
pub fn load_workflow_from_file(
    path: impl AsRef<Path>,
    vars: Option<&Map<String, Value>>,
) -> Result<Workflow> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| {
        ClientError::validation(
            format!("Failed to read workflow file {source}: {e}"),
            source_details(&source, json!(e.to_string())),
        )
    })?;
    tracing::debug!(file = %source, templated = vars.is_some_and(|v| !v.is_empty()), "Loading workflow");
    load_workflow_from_str(&text, &source, vars)
}

/// Load a template from a directory.
///
/// Templates are resolved relative to `dir`, so `{% include %}` and
/// `{% extends %}` can refer to sibling files. The template is always
/// rendered, with no variables if `vars` is `None`.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if the template does not exist, fails
/// to render, or does not produce a valid workflow.
pub fn load_workflow_from_directory(
    dir: impl AsRef<Path>,
    template_name: &str,
    vars: Option<&Map<String, Value>>,
) -> Result<Workflow> {
    let dir = dir.as_ref();
    let mut env = environment();
    env.set_loader(minijinja::path_loader(dir));

    let template = env.get_template(template_name).map_err(|e| match e.kind() {
        ErrorKind::TemplateNotFound => ClientError::validation(
            format!("Template not found: {template_name}"),
            details([
                ("directory", json!(dir.display().to_string())),
                ("template", json!(template_name)),
            ]),
        ),
        _ => template_error(template_name, &e),
    })?;

    let empty = Map::new();
    let rendered = template
        .render(vars.unwrap_or(&empty))
        .map_err(|e| template_error(template_name, &e))?;

    let value = parse_rendered(&rendered).map_err(|e| match e {
        ClientError::Validation { message, .. } => ClientError::validation(
            message.clone(),
            details([("template", json!(template_name)), ("error", json!(message))]),
        ),
        other => other,
    })?;
    into_workflow(value, template_name)
}

/// Write a workflow as pretty-printed JSON, creating parent directories.
pub fn save_workflow_to_file(workflow: &Workflow, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(workflow).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// File name used when backing up a workflow: `{id}_{name}.json`, with every
/// character of the name other than ASCII alphanumerics, `-` and `_` replaced
/// by `_`.
pub fn backup_file_name(workflow: &Workflow) -> String {
    let name: String = workflow
        .name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}.json", workflow.id.as_deref().unwrap_or("new"), name)
}

fn parse_rendered(rendered: &str) -> Result<Value> {
    serde_json::from_str(rendered).map_err(|e| {
        ClientError::validation(
            format!("Invalid JSON after template rendering: {e}"),
            details([("error", json!(e.to_string()))]),
        )
    })
}

fn render_failed(e: &minijinja::Error) -> ClientError {
    ClientError::validation(
        format!("Template rendering failed: {e}"),
        details([("error", json!(e.to_string()))]),
    )
}

fn template_error(template_name: &str, e: &minijinja::Error) -> ClientError {
    ClientError::validation(
        format!("Failed to load template: {e}"),
        details([("template", json!(template_name)), ("error", json!(e.to_string()))]),
    )
}

fn into_workflow(value: Value, source: &str) -> Result<Workflow> {
    Workflow::from_value(value).map_err(|e| {
        ClientError::validation(
            format!("Invalid workflow definition in {source}: {e}"),
            source_details(source, json!(e.to_string())),
        )
    })
}

fn source_details(source: &str, error: Value) -> Map<String, Value> {
    details([("file", json!(source)), ("error", error)])
}
