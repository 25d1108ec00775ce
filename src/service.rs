//! Task Service
//!
//! Orchestrates the task store, the list cache policy and the status
//! broadcast. Cache and broadcast side effects are best-effort: once the
//! store accepts a write, the operation succeeds.

use std::sync::Arc;

use tracing::{info, warn};

use crate::broadcast::StatusBroadcast;
use crate::cache::ListCachePolicy;
use crate::error::{Result, TaskError};
use crate::models::{ListQuery, ListResponse, Task, TaskFilter, TaskPayload, TaskUpdate};
use crate::store::TaskStore;

/// Cache namespace for task list responses
pub const TASK_CACHE_SCOPE: &str = "tasks";

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    list_cache: ListCachePolicy,
    status: StatusBroadcast,
    page_size: usize,
}

impl TaskService {
    /// `page_size` is clamped to at least 1.
    pub fn new(
        store: Arc<dyn TaskStore>,
        list_cache: ListCachePolicy,
        status: StatusBroadcast,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            list_cache,
            status,
            page_size: page_size.max(1),
        }
    }

    pub fn status_broadcast(&self) -> &StatusBroadcast {
        &self.status
    }

    // == List ==
    /// Lists one page of tasks, served through the list cache.
    ///
    /// `path` and `params` are the request path and raw query pairs; they
    /// form the cache key and the pagination links.
    pub async fn list_tasks(&self, path: &str, params: &[(String, String)]) -> Result<ListResponse> {
        let query = ListQuery::from_pairs(params)?;
        let page_size = self.page_size;

        self.list_cache
            .cached_list(TASK_CACHE_SCOPE, path, params, || async move {
                let (results, count) = self
                    .store
                    .list_page(&query.filter, query.ordering, query.page, page_size)
                    .await?;

                // An empty first page is still a valid page
                let last_page = count.div_ceil(page_size).max(1);
                if query.page > last_page {
                    return Err(TaskError::InvalidPage(query.page.to_string()));
                }

                Ok(ListResponse::for_page(
                    path, params, query.page, page_size, count, results,
                ))
            })
            .await
    }

    // == Create ==
    /// Validates and stores a new task, then clears the cached last page.
    pub async fn create_task(
        &self,
        path: &str,
        params: &[(String, String)],
        payload: TaskPayload,
    ) -> Result<Task> {
        let new_task = payload.into_new_task()?;
        let task = self.store.create(new_task).await?;
        info!("Created task {}", task);

        match self.store.count(&TaskFilter::default()).await {
            Ok(total) => {
                self.list_cache
                    .invalidate_last_page(
                        TASK_CACHE_SCOPE,
                        path,
                        params,
                        total,
                        Some(self.page_size),
                    )
                    .await
            }
            Err(e) => warn!("Skipping list cache invalidation, count failed: {}", e),
        }

        Ok(task)
    }

    // == Retrieve ==
    pub async fn get_task(&self, id: u64) -> Result<Task> {
        self.store.get(id).await
    }

    // == Update ==
    /// Applies a full (`partial == false`) or partial update.
    ///
    /// A full update must supply every required field; a partial one only
    /// validates what it carries. When the stored status changes, a status
    /// notification is published.
    pub async fn update_task(&self, id: u64, payload: TaskPayload, partial: bool) -> Result<Task> {
        let current = self.store.get(id).await?;
        let update = if partial {
            TaskUpdate::Partial(payload.into_partial_update()?)
        } else {
            TaskUpdate::Full(payload.into_full_update()?)
        };

        let store = Arc::clone(&self.store);
        let status = self.status.clone();
        let previous_status = current.status;

        // Detached so the notification still fires if the request is dropped
        // after the write lands.
        let write = tokio::spawn(async move {
            let updated = store.update(id, update.into()).await?;
            if updated.status != previous_status {
                status.notify_status_change(updated.id, updated.status);
            }
            Ok::<_, TaskError>(updated)
        });

        let updated = write
            .await
            .map_err(|e| TaskError::Internal(format!("task update did not complete: {}", e)))??;
        info!("Updated task {}", updated);
        Ok(updated)
    }

    // == Delete ==
    /// Removes a task. The list cache is left untouched.
    pub async fn delete_task(&self, id: u64) -> Result<()> {
        self.store.delete(id).await?;
        info!("Deleted task {}", id);
        Ok(())
    }
}
