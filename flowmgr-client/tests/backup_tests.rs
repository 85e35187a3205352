//! Integration tests for backup, restore and sync.

use flowmgr_client::backup::{BackupError, backup_workflows, restore_workflows, sync_workflows};
use flowmgr_client::{Client, ClientConfig, ClientError, WorkflowFilter};
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::new(ClientConfig::new(server.uri(), "test-key").with_max_retries(0)).unwrap()
}

fn workflow_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "active": true,
        "nodes": [{
            "name": "Start",
            "type": "n8n-nodes-base.start",
            "position": [0, 0],
            "parameters": {}
        }],
        "connections": {},
        "settings": {}
    })
}

#[tokio::test]
async fn test_backup_writes_one_file_per_workflow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .and(query_param("active", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [workflow_json("1", "Billing sync"), workflow_json("2", "a/b")]
        })))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("backups");
    let client = client_for(&mock_server);

    let written = backup_workflows(&client, &out, &WorkflowFilter::default().active(true))
        .await
        .unwrap();

    assert_eq!(written, vec![out.join("1_Billing_sync.json"), out.join("2_a_b.json")]);
    let saved: Value = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(saved["name"], "Billing sync");
    assert_eq!(saved["id"], "1");
}

#[tokio::test]
async fn test_restore_creates_new_workflows_and_reports_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_json("50", "Billing sync")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("1_Billing_sync.json"),
        serde_json::to_string_pretty(&workflow_json("1", "Billing sync")).unwrap(),
    )
    .unwrap();
    fs::write(dir.path().join("2_broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let client = client_for(&mock_server);
    let report = restore_workflows(&client, dir.path()).await.unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.restored.len(), 1);
    assert_eq!(report.restored[0].id.as_deref(), Some("50"));

    let (failed_path, error) = &report.failed[0];
    assert!(failed_path.ends_with("2_broken.json"));
    assert!(matches!(error, BackupError::Client(ClientError::Validation { .. })));

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_restore_missing_directory() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let client = client_for(&mock_server);
    let err = restore_workflows(&client, &dir.path().join("absent"))
        .await
        .unwrap_err();

    assert!(matches!(err, BackupError::Io { .. }));
}

#[tokio::test]
async fn test_sync_creates_or_updates_by_name() {
    let source_server = MockServer::start().await;
    let target_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [workflow_json("1", "Shared"), workflow_json("2", "Only in source")]
        })))
        .mount(&source_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [workflow_json("77", "Shared")]
        })))
        .mount(&target_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/workflows/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_json("77", "Shared")))
        .expect(1)
        .mount(&target_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_json("78", "Only in source")))
        .expect(1)
        .mount(&target_server)
        .await;

    let source = client_for(&source_server);
    let target = client_for(&target_server);
    let report = sync_workflows(&source, &target).await.unwrap();

    assert_eq!(report.updated, vec!["Shared".to_string()]);
    assert_eq!(report.created, vec!["Only in source".to_string()]);
}
