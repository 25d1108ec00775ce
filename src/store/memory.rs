//! In-memory task store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, TaskError};
use crate::models::{NewTask, Task, TaskChanges, TaskFilter, TaskOrdering};
use crate::store::TaskStore;

#[derive(Debug, Default)]
struct Tables {
    /// Tasks keyed by id, so iteration is primary-key order
    tasks: BTreeMap<u64, Task>,
    /// Last id handed out; ids are never reused
    last_id: u64,
}

/// Task store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tables: RwLock<Tables>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    filter.status.map_or(true, |s| task.status == s)
        && filter.priority.map_or(true, |p| task.priority == p)
        && filter.created_at.map_or(true, |c| task.created_at == c)
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, new_task: NewTask) -> Result<Task> {
        let mut tables = self.tables.write().await;
        tables.last_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.last_id,
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            priority: new_task.priority,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        debug!("Stored task {}", task);
        Ok(task)
    }

    async fn get(&self, id: u64) -> Result<Task> {
        self.tables
            .read()
            .await
            .tasks
            .get(&id)
            .cloned()
            .ok_or(TaskError::NotFound(id))
    }

    async fn update(&self, id: u64, changes: TaskChanges) -> Result<Task> {
        let mut tables = self.tables.write().await;
        let task = tables.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        changes.apply_to(task, Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.tables
            .write()
            .await
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskError::NotFound(id))
    }

    async fn count(&self, filter: &TaskFilter) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().filter(|t| matches_filter(t, filter)).count())
    }

    async fn list_page(
        &self,
        filter: &TaskFilter,
        ordering: TaskOrdering,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<Task>, usize)> {
        let tables = self.tables.read().await;
        let matching: Vec<&Task> = match ordering {
            TaskOrdering::IdAscending => tables
                .tasks
                .values()
                .filter(|t| matches_filter(t, filter))
                .collect(),
            TaskOrdering::IdDescending => tables
                .tasks
                .values()
                .rev()
                .filter(|t| matches_filter(t, filter))
                .collect(),
        };

        let total = matching.len();
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect();
        Ok((items, total))
    }
}
