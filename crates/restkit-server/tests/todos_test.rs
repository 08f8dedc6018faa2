//! Tests del servicio de todos: CRUD, cache e invalidacion, choices y
//! paginacion.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use helpers::{TestClient, app_client};

async fn create(client: &TestClient, title: &str) -> Value {
    let response = client.post_json("/todos", &json!({ "title": title })).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

// === CRUD ===

#[tokio::test]
async fn create_and_retrieve_todo() {
    let client = app_client();

    let created = create(&client, "Write docs").await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["priority"], "medium");

    let fetched: Value = client.get("/todos/1").await.json();
    assert_eq!(fetched["title"], "Write docs");
}

#[tokio::test]
async fn blank_title_is_bad_request() {
    let response = app_client()
        .post_json("/todos", &json!({ "title": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("may not be blank"));
}

#[tokio::test]
async fn unknown_todo_is_not_found() {
    let client = app_client();

    for uri in ["/todos/42", "/todos/not-a-number"] {
        let response = client.get(uri).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["detail"], "The requested Todo was not found.");
    }
}

#[tokio::test]
async fn delete_returns_no_content() {
    let client = app_client();
    create(&client, "Temporary").await;

    client
        .delete("/todos/1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    client
        .get("/todos/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// === Cache invalidation ===

#[tokio::test]
async fn update_invalidates_cached_detail() {
    let client = app_client();
    create(&client, "Draft").await;

    // Primer GET llena el cache
    let before: Value = client.get("/todos/1").await.json();
    assert_eq!(before["title"], "Draft");

    client
        .send_json("PATCH", "/todos/1", &json!({ "title": "Final" }))
        .await
        .assert_status(StatusCode::OK);

    let after: Value = client.get("/todos/1").await.json();
    assert_eq!(after["title"], "Final");
}

#[tokio::test]
async fn update_invalidates_detail_read_through_alias() {
    let client = app_client();
    create(&client, "Draft").await;

    let alias: Value = client.get("/todos/01").await.json();
    assert_eq!(alias["title"], "Draft");

    client
        .send_json("PATCH", "/todos/1", &json!({ "title": "Final" }))
        .await
        .assert_status(StatusCode::OK);

    for uri in ["/todos/1", "/todos/01", "/todos/+1"] {
        let after: Value = client.get(uri).await.json();
        assert_eq!(after["title"], "Final", "stale entry behind {}", uri);
    }
}

#[tokio::test]
async fn complete_through_alias_invalidates_summary() {
    let client = app_client();
    create(&client, "Ship release").await;

    let summary: Value = client.get("/todos/1/summary").await.json();
    assert_eq!(summary["status"], "Pending");

    client
        .post("/todos/001/complete")
        .await
        .assert_status(StatusCode::OK);

    let summary: Value = client.get("/todos/01/summary").await.json();
    assert_eq!(summary["status"], "Completed");
}

#[tokio::test]
async fn create_invalidates_cached_lists() {
    let client = app_client();
    create(&client, "First").await;

    let before: Value = client.get("/todos").await.json();
    assert_eq!(before["page"]["total_items"], 1);

    create(&client, "Second").await;

    let after: Value = client.get("/todos").await.json();
    assert_eq!(after["page"]["total_items"], 2);
}

#[tokio::test]
async fn complete_invalidates_stats_and_summary() {
    let client = app_client();
    create(&client, "Ship release").await;

    let stats: Value = client.get("/todos/stats").await.json();
    assert_eq!(stats["by_status"]["pending"], 1);
    let summary: Value = client.get("/todos/1/summary").await.json();
    assert_eq!(summary["status"], "Pending");

    let completed = client.post("/todos/1/complete").await;
    completed.assert_status(StatusCode::OK);
    let completed: Value = completed.json();
    assert_eq!(completed["status"], "completed");
    assert!(completed["completed_at"].is_string());

    let stats: Value = client.get("/todos/stats").await.json();
    assert_eq!(stats["by_status"]["pending"], 0);
    assert_eq!(stats["by_status"]["completed"], 1);
    let summary: Value = client.get("/todos/1/summary").await.json();
    assert_eq!(summary["status"], "Completed");
}

// === Filters and pagination ===

#[tokio::test]
async fn list_filters_by_choice() {
    let client = app_client();
    client
        .post_json("/todos", &json!({ "title": "Urgent", "priority": "critical" }))
        .await;
    create(&client, "Whenever").await;

    let page: Value = client.get("/todos?priority=critical").await.json();
    assert_eq!(page["page"]["total_items"], 1);
    assert_eq!(page["results"][0]["title"], "Urgent");

    let response = client.get("/todos?status=someday").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_is_paginated() {
    let client = app_client();
    for n in 0..3 {
        create(&client, &format!("Task {}", n)).await;
    }

    let page: Value = client.get("/todos?page-size=2").await.json();
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["page"]["total"], 2);
    assert_eq!(page["page"]["next"], "/todos?page=2&page-size=2");

    let last: Value = client.get("/todos?page=last&page-size=2").await.json();
    assert_eq!(last["results"][0]["title"], "Task 2");

    client
        .get("/todos?page=7")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// === Choices ===

#[tokio::test]
async fn choices_lists_priority_and_status() {
    let response = app_client().get("/todos/choices").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["choices"]["priority"]["critical"], "Critical");
    assert_eq!(body["choices"]["status"]["in_progress"], "In Progress");
}
