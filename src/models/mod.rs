//! Domain records and HTTP DTOs
//!
//! Task records live in `task`; request bodies, list queries and response
//! envelopes live in `requests` and `responses`.

pub mod requests;
pub mod responses;
pub mod task;

// Re-export commonly used types
pub use requests::{
    FullUpdate, ListQuery, PartialUpdate, TaskFilter, TaskOrdering, TaskPayload, TaskUpdate,
};
pub use responses::{HealthResponse, ListResponse};
pub use task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
