//! API Handlers
//!
//! HTTP request handlers for the task resource.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{StatusCode, Uri},
    Json,
};
use serde_json::Value;

use crate::broadcast::{ChannelLayer, StatusBroadcast};
use crate::cache::{ListCachePolicy, MemoryCache};
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, ListResponse, Task, TaskPayload};
use crate::service::TaskService;
use crate::store::MemoryTaskStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Task operations
    pub service: TaskService,
    /// Response cache behind the list policy, kept for background cleanup
    pub cache: Arc<MemoryCache>,
}

impl AppState {
    pub fn new(service: TaskService, cache: Arc<MemoryCache>) -> Self {
        Self { service, cache }
    }

    /// Wires an in-memory store, cache and channel layer from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
        let list_cache =
            ListCachePolicy::new(cache.clone(), Duration::from_secs(config.cache_ttl));
        let status = StatusBroadcast::new(ChannelLayer::new(config.broadcast_capacity));
        let service = TaskService::new(
            Arc::new(MemoryTaskStore::new()),
            list_cache,
            status,
            config.page_size,
        );
        Self::new(service, cache)
    }
}

/// Request body as it arrives, before any field checks
type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

/// Decodes a task body. Undecodable bodies and wrongly typed fields both
/// come back as a `TaskError`.
fn read_payload(body: JsonBody) -> Result<TaskPayload> {
    let Json(value) = body?;
    TaskPayload::from_json(value)
}

/// Handler for GET /tasks/
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse>> {
    let page = state.service.list_tasks(uri.path(), &params).await?;
    Ok(Json(page))
}

/// Handler for POST /tasks/
pub async fn create_task_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Task>)> {
    let payload = read_payload(body)?;
    let task = state
        .service
        .create_task(uri.path(), &params, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for GET /tasks/:id/
pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Task>> {
    Ok(Json(state.service.get_task(id).await?))
}

/// Handler for PUT /tasks/:id/
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: JsonBody,
) -> Result<Json<Task>> {
    let payload = read_payload(body)?;
    Ok(Json(state.service.update_task(id, payload, false).await?))
}

/// Handler for PATCH /tasks/:id/
pub async fn partial_update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    body: JsonBody,
) -> Result<Json<Task>> {
    let payload = read_payload(body)?;
    Ok(Json(state.service.update_task(id, payload, true).await?))
}

/// Handler for DELETE /tasks/:id/
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.service.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
