//! Resource models for workflows, nodes, executions and credentials.
//!
//! Field names follow Rust conventions; the wire names are camelCase.
//! Each model keeps the keys it does not know about in an `extra` map, so a
//! value decoded from the server and encoded again does not lose data.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Node keys assigned or managed by the server, stripped before submission.
pub const NODE_READ_ONLY_FIELDS: [&str; 9] = [
    "id",
    "webhookId",
    "notesInFlow",
    "notes",
    "executeOnce",
    "retryOnFail",
    "maxTries",
    "waitBetweenTries",
    "onError",
];

/// Credential keys that are never sent to the server.
pub const CREDENTIAL_READ_ONLY_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A list response envelope: `{"data": [...], "nextCursor": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Items in server order.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Cursor for the next page, if the server reported one.
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
}

/// A single step inside a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node name, unique within its workflow. Connections refer to nodes by name.
    pub name: String,
    /// Node type identifier (e.g. `n8n-nodes-base.httpRequest`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// `[x, y]` canvas position.
    pub position: [f64; 2],
    /// Node-type specific configuration.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,
    /// Version of the node type.
    #[serde(
        rename = "typeVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub type_version: Option<f64>,
    /// Credential references keyed by credential type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    /// Whether the node is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Create a node with no parameters.
    pub fn new(name: impl Into<String>, node_type: impl Into<String>, position: [f64; 2]) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            position,
            parameters: Map::new(),
            type_version: None,
            credentials: None,
            disabled: None,
            extra: Map::new(),
        }
    }

    /// Set the node parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the node type version.
    #[must_use]
    pub fn with_type_version(mut self, version: f64) -> Self {
        self.type_version = Some(version);
        self
    }

    /// The JSON object submitted to the server for this node.
    ///
    /// Read-only keys in [`NODE_READ_ONLY_FIELDS`] are removed, as is every
    /// key holding `null`.
    pub fn to_payload(&self) -> Value {
        let mut map = to_object(self);
        map.retain(|key, value| !NODE_READ_ONLY_FIELDS.contains(&key.as_str()) && !value.is_null());
        Value::Object(map)
    }
}

/// Workflow-level execution policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether to save execution data on error (`"all"` or `"none"`).
    #[serde(
        rename = "saveDataErrorExecution",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub save_data_error_execution: Option<String>,
    /// Whether to save execution data on success (`"all"` or `"none"`).
    #[serde(
        rename = "saveDataSuccessExecution",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub save_data_success_execution: Option<String>,
    /// Whether manual executions are saved.
    #[serde(
        rename = "saveManualExecutions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub save_manual_executions: Option<bool>,
    /// IANA timezone used by schedule triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Execution timeout in seconds.
    #[serde(
        rename = "executionTimeout",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_timeout: Option<i64>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// True when no setting is present.
    pub fn is_empty(&self) -> bool {
        self.save_data_error_execution.is_none()
            && self.save_data_success_execution.is_none()
            && self.save_manual_executions.is_none()
            && self.timezone.is_none()
            && self.execution_timeout.is_none()
            && self.extra.is_empty()
    }

    fn to_payload(&self) -> Value {
        let mut map = to_object(self);
        map.retain(|_, value| !value.is_null());
        Value::Object(map)
    }
}

/// A workflow tag, sent by the server either as a bare name or as an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    /// Tag given by name only.
    Name(String),
    /// Tag object with server-assigned identity.
    Object(TagObject),
}

/// Tag object as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagObject {
    /// Tag identifier.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Tag name.
    pub name: String,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    /// The tag name.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Object(tag) => &tag.name,
        }
    }
}

/// A workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Server-assigned identifier; absent before creation.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Workflow name.
    pub name: String,
    /// Whether the workflow is active. Managed by the server; never submitted.
    #[serde(default)]
    pub active: bool,
    /// Nodes in definition order.
    pub nodes: Vec<Node>,
    /// Outbound wiring keyed by source node name. Not validated.
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Map<String, Value>,
    /// Execution policy. Defaults to empty settings when not supplied.
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Settings,
    /// Static data persisted with the workflow.
    #[serde(
        rename = "staticData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub static_data: Option<Value>,
    /// Tags attached to the workflow. Read-only for create/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// Creation timestamp.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// Create an unsaved workflow from its nodes.
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            id: None,
            name: name.into(),
            active: false,
            nodes,
            connections: Map::new(),
            settings: Settings::default(),
            static_data: None,
            tags: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Set the connections mapping.
    #[must_use]
    pub fn with_connections(mut self, connections: Map<String, Value>) -> Self {
        self.connections = connections;
        self
    }

    /// Set the workflow settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Decode a workflow from an already-parsed JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// The JSON object submitted on create and update.
    ///
    /// Contains exactly `name`, `nodes`, `connections`, `settings` and, when
    /// present, `staticData`. `settings` is always present, as `{}` when empty.
    pub fn to_payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("name".into(), Value::String(self.name.clone()));
        payload.insert(
            "nodes".into(),
            Value::Array(self.nodes.iter().map(Node::to_payload).collect()),
        );
        payload.insert(
            "connections".into(),
            Value::Object(self.connections.clone()),
        );
        payload.insert("settings".into(), self.settings.to_payload());
        if let Some(static_data) = self.static_data.as_ref().filter(|v| !v.is_null()) {
            payload.insert("staticData".into(), static_data.clone());
        }
        Value::Object(payload)
    }
}

/// Lifecycle status of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionStatus {
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Error,
    /// Currently running.
    Running,
    /// Paused, waiting for a wait node or webhook.
    Waiting,
    /// Canceled before completion.
    Canceled,
    /// The worker crashed.
    Crashed,
    /// Created but not started yet.
    New,
    /// The server reports the status as unknown.
    Unknown,
    /// A status this client does not know about.
    Other(String),
}

impl ExecutionStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Running => "running",
            Self::Waiting => "waiting",
            Self::Canceled => "canceled",
            Self::Crashed => "crashed",
            Self::New => "new",
            Self::Unknown => "unknown",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ExecutionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "running" => Self::Running,
            "waiting" => Self::Waiting,
            "canceled" => Self::Canceled,
            "crashed" => Self::Crashed,
            "new" => Self::New,
            "unknown" => Self::Unknown,
            _ => Self::Other(value),
        }
    }
}

impl From<ExecutionStatus> for String {
    fn from(value: ExecutionStatus) -> Self {
        match value {
            ExecutionStatus::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ExecutionStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_lowercase()))
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How an execution was started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionMode {
    /// Started from the editor.
    Manual,
    /// Started by a trigger node.
    Trigger,
    /// Started by an incoming webhook.
    Webhook,
    /// Started from the server's CLI.
    Cli,
    /// Error workflow run.
    Error,
    /// Retry of an earlier execution.
    Retry,
    /// A mode this client does not know about.
    Other(String),
}

impl ExecutionMode {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => "manual",
            Self::Trigger => "trigger",
            Self::Webhook => "webhook",
            Self::Cli => "cli",
            Self::Error => "error",
            Self::Retry => "retry",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ExecutionMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "manual" => Self::Manual,
            "trigger" => Self::Trigger,
            "webhook" => Self::Webhook,
            "cli" => Self::Cli,
            "error" => Self::Error,
            "retry" => Self::Retry,
            _ => Self::Other(value),
        }
    }
}

impl From<ExecutionMode> for String {
    fn from(value: ExecutionMode) -> Self {
        match value {
            ExecutionMode::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Captured run data of an execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionData {
    /// Data the execution started with.
    #[serde(rename = "startData", default, skip_serializing_if = "Option::is_none")]
    pub start_data: Option<Map<String, Value>>,
    /// Per-node results.
    #[serde(rename = "resultData", default, skip_serializing_if = "Option::is_none")]
    pub result_data: Option<Map<String, Value>>,
    /// Internal execution stack and metadata.
    #[serde(
        rename = "executionData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_data: Option<Map<String, Value>>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One run of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Execution identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Whether the execution has finished.
    pub finished: bool,
    /// How the execution was started.
    pub mode: ExecutionMode,
    /// The execution this one retries.
    #[serde(
        rename = "retryOf",
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_of: Option<String>,
    /// The retry that eventually succeeded.
    #[serde(
        rename = "retrySuccessId",
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_success_id: Option<String>,
    /// Start timestamp.
    #[serde(rename = "startedAt", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Stop timestamp.
    #[serde(rename = "stoppedAt", default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    /// The workflow that was run.
    #[serde(rename = "workflowId", deserialize_with = "string_or_number")]
    pub workflow_id: String,
    /// Snapshot of the workflow at run time.
    #[serde(
        rename = "workflowData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workflow_data: Option<Value>,
    /// Run data, present when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExecutionData>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    /// Whether the execution is parked on a webhook.
    #[serde(
        rename = "waitingForWebhook",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub waiting_for_webhook: Option<bool>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Execution {
    /// Not finished and in a running, waiting or new state.
    pub fn is_running(&self) -> bool {
        !self.finished
            && matches!(
                self.status,
                Some(ExecutionStatus::Running | ExecutionStatus::Waiting | ExecutionStatus::New)
            )
    }

    /// Finished with status `success`.
    pub fn is_successful(&self) -> bool {
        self.finished && self.status == Some(ExecutionStatus::Success)
    }

    /// Finished with status `error` or `crashed`.
    pub fn is_failed(&self) -> bool {
        self.finished
            && matches!(
                self.status,
                Some(ExecutionStatus::Error | ExecutionStatus::Crashed)
            )
    }
}

/// A stored credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Server-assigned identifier; absent before creation.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Credential name.
    pub name: String,
    /// Credential type (e.g. `httpBasicAuth`).
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Secret payload. The server may mask or encrypt it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Node types allowed to use this credential.
    #[serde(rename = "nodesAccess", default, skip_serializing_if = "Option::is_none")]
    pub nodes_access: Option<Vec<Value>>,
    /// Creation timestamp.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// Create an unsaved credential.
    pub fn new(
        name: impl Into<String>,
        credential_type: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            credential_type: credential_type.into(),
            data: Some(data),
            nodes_access: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// The JSON object submitted on create and update: everything except
    /// identity and timestamps, with `null` keys omitted.
    pub fn to_payload(&self) -> Value {
        let mut map = to_object(self);
        map.retain(|key, value| {
            !CREDENTIAL_READ_ONLY_FIELDS.contains(&key.as_str()) && !value.is_null()
        });
        Value::Object(map)
    }
}

fn to_object<T: Serialize>(value: &T) -> Map<String, Value> {
    // Models only hold string keys, so serialization yields an object.
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number identifier, got {other}"
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a string or number identifier, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn execution(finished: bool, status: &str) -> Execution {
        serde_json::from_value(json!({
            "id": "1",
            "finished": finished,
            "mode": "manual",
            "workflowId": "wf",
            "status": status,
        }))
        .unwrap()
    }

    #[test]
    fn workflow_payload_excludes_read_only_keys() {
        let workflow: Workflow = serde_json::from_value(json!({
            "id": "wf-1",
            "name": "Sync",
            "active": true,
            "nodes": [],
            "connections": {},
            "tags": [{"id": "1", "name": "prod"}],
            "createdAt": "2024-01-15T10:00:00.000Z",
            "updatedAt": "2024-01-15T10:05:00.000Z",
            "versionId": "abc",
        }))
        .unwrap();

        let payload = workflow.to_payload();
        let keys: Vec<&str> = payload.as_object().unwrap().keys().map(String::as_str).collect();
        for forbidden in ["active", "tags", "id", "createdAt", "updatedAt", "versionId"] {
            assert!(!keys.contains(&forbidden), "payload leaked {forbidden}");
        }
        assert_eq!(payload["settings"], json!({}));
        assert!(payload.get("staticData").is_none());
    }

    #[test]
    fn workflow_payload_keeps_static_data_and_settings() {
        let mut workflow = Workflow::new("Report", vec![]).with_settings(Settings {
            timezone: Some("Europe/Berlin".into()),
            execution_timeout: Some(120),
            ..Settings::default()
        });
        workflow.static_data = Some(json!({"lastRun": 3}));

        let payload = workflow.to_payload();
        assert_eq!(payload["staticData"]["lastRun"], 3);
        assert_eq!(payload["settings"]["timezone"], "Europe/Berlin");
        assert_eq!(payload["settings"]["executionTimeout"], 120);
        assert_eq!(payload.as_object().unwrap().len(), 5);
    }

    #[test]
    fn settings_default_when_missing_or_null() {
        let missing: Workflow =
            serde_json::from_value(json!({"name": "a", "nodes": []})).unwrap();
        let null: Workflow =
            serde_json::from_value(json!({"name": "a", "nodes": [], "settings": null})).unwrap();
        assert!(missing.settings.is_empty());
        assert!(null.settings.is_empty());
        assert!(!missing.active);
        assert!(missing.connections.is_empty());
    }

    #[test]
    fn node_payload_strips_read_only_and_null_fields() {
        let node: Node = serde_json::from_value(json!({
            "id": "8f1c",
            "name": "Webhook",
            "type": "n8n-nodes-base.webhook",
            "position": [250, 300],
            "parameters": {"path": "hook"},
            "webhookId": "w-1",
            "notesInFlow": true,
            "notes": "entry point",
            "executeOnce": false,
            "retryOnFail": true,
            "maxTries": 3,
            "waitBetweenTries": 1000,
            "onError": "continueRegularOutput",
            "alwaysOutputData": null,
            "color": "#ff0000",
        }))
        .unwrap();

        let payload = node.to_payload();
        let object = payload.as_object().unwrap();
        for key in NODE_READ_ONLY_FIELDS {
            assert!(!object.contains_key(key), "payload kept {key}");
        }
        assert!(!object.contains_key("alwaysOutputData"));
        assert!(!object.contains_key("typeVersion"));
        assert!(!object.contains_key("credentials"));
        assert_eq!(object["color"], "#ff0000");
        assert_eq!(object["parameters"]["path"], "hook");
        assert_eq!(object["position"], json!([250.0, 300.0]));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "name": "Start",
            "type": "n8n-nodes-base.start",
            "position": [0.0, 0.0],
            "parameters": {},
            "customFlag": {"nested": [1, 2]},
        });
        let node: Node = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.extra["customFlag"]["nested"], json!([1, 2]));
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }

    #[test]
    fn execution_predicates_follow_finished_and_status() {
        let running = execution(false, "running");
        assert!(running.is_running());
        assert!(!running.is_successful());
        assert!(!running.is_failed());

        let success = execution(true, "success");
        assert!(!success.is_running());
        assert!(success.is_successful());
        assert!(!success.is_failed());

        let crashed = execution(true, "crashed");
        assert!(!crashed.is_running());
        assert!(!crashed.is_successful());
        assert!(crashed.is_failed());

        let canceled = execution(true, "canceled");
        assert!(!canceled.is_running() && !canceled.is_successful() && !canceled.is_failed());

        assert!(execution(false, "waiting").is_running());
        assert!(execution(false, "new").is_running());
        assert!(!execution(false, "error").is_running());
    }

    #[test]
    fn unrecognized_status_and_mode_are_preserved() {
        let exec: Execution = serde_json::from_value(json!({
            "id": 42,
            "finished": false,
            "mode": "evaluation",
            "workflowId": 7,
            "status": "queued",
        }))
        .unwrap();
        assert_eq!(exec.id, "42");
        assert_eq!(exec.workflow_id, "7");
        assert_eq!(exec.mode, ExecutionMode::Other("evaluation".into()));
        assert_eq!(exec.status, Some(ExecutionStatus::Other("queued".into())));
        assert!(!exec.is_running());

        let encoded = serde_json::to_value(&exec).unwrap();
        assert_eq!(encoded["status"], "queued");
        assert_eq!(encoded["mode"], "evaluation");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("SUCCESS".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Success));
        assert_eq!(ExecutionStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn credential_payload_excludes_identity_and_timestamps() {
        let credential: Credential = serde_json::from_value(json!({
            "id": "c-1",
            "name": "Basic",
            "type": "httpBasicAuth",
            "data": {"user": "u", "password": "p"},
            "nodesAccess": null,
            "createdAt": "2024-01-15T10:00:00Z",
            "updatedAt": "2024-01-15T10:00:00Z",
            "isManaged": false,
        }))
        .unwrap();

        let payload = credential.to_payload();
        let object = payload.as_object().unwrap();
        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("createdAt"));
        assert!(!object.contains_key("updatedAt"));
        assert!(!object.contains_key("nodesAccess"));
        assert_eq!(object["type"], "httpBasicAuth");
        assert_eq!(object["isManaged"], false);
    }

    #[test]
    fn page_unwraps_data_in_order() {
        let page: Page<Workflow> = serde_json::from_value(json!({
            "data": [
                {"id": "b", "name": "second", "nodes": []},
                {"id": "a", "name": "first", "nodes": []},
                {"id": "c", "name": "third", "nodes": []},
            ],
            "nextCursor": "cursor-2",
        }))
        .unwrap();
        let ids: Vec<_> = page.data.iter().filter_map(|w| w.id.as_deref()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
    }

    #[test]
    fn tags_accept_names_and_objects() {
        let workflow: Workflow = serde_json::from_value(json!({
            "name": "a",
            "nodes": [],
            "tags": ["plain", {"id": 3, "name": "object"}],
        }))
        .unwrap();
        let names: Vec<_> = workflow.tags.unwrap().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["plain", "object"]);
    }
}
