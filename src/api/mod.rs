//! API Module
//!
//! HTTP handlers, WebSocket endpoints and routing for the task service.
//!
//! # Endpoints
//! - `GET|POST /tasks/` - List or create tasks
//! - `GET|PUT|PATCH|DELETE /tasks/:id/` - Single task operations
//! - `GET /ws/tasks/status/` - Live status change notifications
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
pub mod socket;

pub use handlers::*;
pub use routes::{create_router, STATUS_SOCKET_PATH};
pub use socket::NOT_FOUND_CLOSE_CODE;
