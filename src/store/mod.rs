//! Task Store
//!
//! Persistence boundary for task records. The service only talks to the
//! `TaskStore` trait; `MemoryTaskStore` backs the binary and the tests.

mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewTask, Task, TaskChanges, TaskFilter, TaskOrdering};

pub use memory::MemoryTaskStore;

/// Record store for tasks. A single call is atomic with respect to others.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a new task, assigning its id and timestamps.
    async fn create(&self, new_task: NewTask) -> Result<Task>;

    /// Fetches a task, failing with `NotFound` when absent.
    async fn get(&self, id: u64) -> Result<Task>;

    /// Applies `changes` to an existing task and refreshes `updated_at`.
    async fn update(&self, id: u64, changes: TaskChanges) -> Result<Task>;

    /// Removes a task, failing with `NotFound` when absent.
    async fn delete(&self, id: u64) -> Result<()>;

    /// Number of tasks matching `filter`.
    async fn count(&self, filter: &TaskFilter) -> Result<usize>;

    /// One page of matching tasks (1-based `page`) and the total match count.
    async fn list_page(
        &self,
        filter: &TaskFilter,
        ordering: TaskOrdering,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<Task>, usize)>;
}
