//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles for the task resource, including the
//! list cache's documented invalidation behaviour.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use task_tracker::{
    broadcast::{ChannelLayer, StatusBroadcast},
    cache::{ListCachePolicy, MemoryCache},
    create_router,
    models::NewTask,
    store::{MemoryTaskStore, TaskStore},
    AppState, Config, TaskService,
};
use tower::ServiceExt;

// == Helper Functions ==

struct TestApp {
    router: Router,
    store: Arc<MemoryTaskStore>,
}

fn create_test_app(page_size: usize) -> TestApp {
    let store = Arc::new(MemoryTaskStore::new());
    let cache = Arc::new(MemoryCache::new(100));
    let service = TaskService::new(
        store.clone(),
        ListCachePolicy::new(cache.clone(), Duration::from_secs(600)),
        StatusBroadcast::new(ChannelLayer::new(16)),
        page_size,
    );
    TestApp {
        router: create_router(AppState::new(service, cache)),
        store,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn seed(app: &TestApp, title: &str) -> u64 {
    app.store
        .create(NewTask::new(title, format!("{title} description")))
        .await
        .unwrap()
        .id
}

// == CRUD ==

#[tokio::test]
async fn test_get_task_list() {
    let app = create_test_app(10);
    seed(&app, "Initial Task").await;

    let (status, json) = send(&app.router, "GET", "/tasks/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["title"], "Initial Task");
    assert_eq!(json["results"][0]["status"], "New");
    assert!(json["next"].is_null());
}

#[tokio::test]
async fn test_create_task() {
    let app = create_test_app(10);
    seed(&app, "Initial Task").await;

    let (status, json) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({
            "title": "New Task",
            "description": "New task description",
            "status": "In progress",
            "priority": "High"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 2);
    assert_eq!(json["status"], "In progress");
    assert_eq!(json["priority"], "High");
    assert_eq!(app.store.get(2).await.unwrap().title, "New Task");
}

#[tokio::test]
async fn test_create_task_validation_error() {
    let app = create_test_app(10);

    let (status, json) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({ "title": "", "priority": "Urgent" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["fields"]["title"][0], "This field may not be blank.");
    assert_eq!(json["fields"]["description"][0], "This field is required.");
    assert_eq!(json["fields"]["priority"][0], "\"Urgent\" is not a valid choice.");
}

#[tokio::test]
async fn test_create_task_wrong_field_types() {
    let app = create_test_app(10);

    let (status, json) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({ "title": 5, "description": "d" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["fields"]["title"][0], "Not a valid string.");

    let (status, json) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({ "title": "t", "description": "d", "priority": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["fields"]["priority"][0], "\"3\" is not a valid choice.");

    assert_eq!(app.store.count(&Default::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_task_malformed_body() {
    let app = create_test_app(10);

    let request = Request::builder()
        .method("POST")
        .uri("/tasks/")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Malformed request body"));

    let request = Request::builder()
        .method("POST")
        .uri("/tasks/")
        .body(Body::from(json!({ "title": "t", "description": "d" }).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_create_task_trims_text_fields() {
    let app = create_test_app(10);

    let (status, json) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({ "title": "  Padded Task  ", "description": " d " })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["title"], "Padded Task");
    assert_eq!(json["description"], "d");
}

#[tokio::test]
async fn test_get_task_detail() {
    let app = create_test_app(10);
    let id = seed(&app, "Initial Task").await;

    let (status, json) = send(&app.router, "GET", &format!("/tasks/{id}/"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id);
    assert_eq!(json["priority"], "Medium");
}

#[tokio::test]
async fn test_update_task() {
    let app = create_test_app(10);
    let id = seed(&app, "Initial Task").await;

    let (status, json) = send(
        &app.router,
        "PUT",
        &format!("/tasks/{id}/"),
        Some(json!({
            "title": "Updated Task",
            "description": "Updated description",
            "status": "Completed",
            "priority": "Medium"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Updated Task");
    let stored = app.store.get(id).await.unwrap();
    assert_eq!(stored.title, "Updated Task");
    assert_eq!(stored.status.as_str(), "Completed");
}

#[tokio::test]
async fn test_full_update_missing_fields() {
    let app = create_test_app(10);
    let id = seed(&app, "Initial Task").await;

    let (status, json) = send(
        &app.router,
        "PUT",
        &format!("/tasks/{id}/"),
        Some(json!({ "status": "Completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["title"].is_array());
}

#[tokio::test]
async fn test_partial_update_task() {
    let app = create_test_app(10);
    let id = seed(&app, "Initial Task").await;

    let (status, json) = send(
        &app.router,
        "PATCH",
        &format!("/tasks/{id}/"),
        Some(json!({ "status": "Completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Completed");
    assert_eq!(json["title"], "Initial Task");
}

#[tokio::test]
async fn test_update_missing_task() {
    let app = create_test_app(10);

    let (status, _) = send(
        &app.router,
        "PATCH",
        "/tasks/77/",
        Some(json!({ "status": "Completed" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_task() {
    let app = create_test_app(10);
    let id = seed(&app, "Initial Task").await;

    let (status, _) = send(&app.router, "DELETE", &format!("/tasks/{id}/"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&app.router, "DELETE", &format!("/tasks/{id}/"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found.");
}

// == List Queries ==

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = create_test_app(10);
    let done = seed(&app, "Done").await;
    seed(&app, "Open").await;
    send(
        &app.router,
        "PATCH",
        &format!("/tasks/{done}/"),
        Some(json!({ "status": "Completed" })),
    )
    .await;

    let (status, json) = send(&app.router, "GET", "/tasks/?status=Completed", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["id"], done);
}

#[tokio::test]
async fn test_list_invalid_filter() {
    let app = create_test_app(10);
    let (status, json) = send(&app.router, "GET", "/tasks/?priority=Urgent", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["priority"].is_array());
}

#[tokio::test]
async fn test_list_pagination_links() {
    let app = create_test_app(2);
    for title in ["a", "b", "c"] {
        seed(&app, title).await;
    }

    let (_, first) = send(&app.router, "GET", "/tasks/", None).await;
    assert_eq!(first["next"], "/tasks/?page=2");
    assert!(first["previous"].is_null());

    let (_, second) = send(&app.router, "GET", "/tasks/?page=2", None).await;
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
    assert_eq!(second["previous"], "/tasks/");

    let (status, json) = send(&app.router, "GET", "/tasks/?page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Invalid page.");
}

// == Cache Behaviour ==

#[tokio::test]
async fn test_cache_list_response() {
    let app = create_test_app(10);
    seed(&app, "Cached Task").await;

    let (status, first) = send(&app.router, "GET", "/tasks/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["results"].as_array().unwrap().len(), 1);

    // Written behind the API's back: nothing invalidates the cached page
    seed(&app, "Another Task").await;

    let (_, second) = send(&app.router, "GET", "/tasks/", None).await;
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cache_key_ignores_parameter_order_and_default_page() {
    let app = create_test_app(10);
    seed(&app, "Cached Task").await;

    send(&app.router, "GET", "/tasks/?status=New&priority=Medium", None).await;
    seed(&app, "Hidden Task").await;

    let (_, json) = send(
        &app.router,
        "GET",
        "/tasks/?page=1&priority=Medium&status=New",
        None,
    )
    .await;
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn test_cache_invalidation_on_create() {
    let app = create_test_app(10);
    seed(&app, "Cached Task").await;
    send(&app.router, "GET", "/tasks/?page=1", None).await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({ "title": "New Task", "description": "New task description" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, json) = send(&app.router, "GET", "/tasks/?page=1", None).await;
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_leaves_cached_list_stale() {
    let app = create_test_app(10);
    let (_, created) = send(
        &app.router,
        "POST",
        "/tasks/",
        Some(json!({ "title": "A", "description": "task A" })),
    )
    .await;
    let id = created["id"].as_u64().unwrap();

    let (_, before) = send(&app.router, "GET", "/tasks/", None).await;
    assert_eq!(before["results"][0]["status"], "New");

    send(
        &app.router,
        "PATCH",
        &format!("/tasks/{id}/"),
        Some(json!({ "status": "Completed" })),
    )
    .await;

    let (_, after) = send(&app.router, "GET", "/tasks/", None).await;
    assert_eq!(after["results"][0]["status"], "New");

    let (_, detail) = send(&app.router, "GET", &format!("/tasks/{id}/"), None).await;
    assert_eq!(detail["status"], "Completed");
}

#[tokio::test]
async fn test_delete_leaves_cached_list_stale() {
    let app = create_test_app(10);
    let id = seed(&app, "Short lived").await;
    send(&app.router, "GET", "/tasks/", None).await;

    send(&app.router, "DELETE", &format!("/tasks/{id}/"), None).await;

    let (_, json) = send(&app.router, "GET", "/tasks/", None).await;
    assert_eq!(json["count"], 1);
}

// == Health ==

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_router(AppState::from_config(&Config::default()));
    let (status, json) = send(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}
