//! Task Tracker - task CRUD service
//!
//! Serves tasks over HTTP with cached list responses and pushes status
//! changes to WebSocket subscribers.

pub mod api;
pub mod background;
pub mod broadcast;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use api::{create_router, AppState};
pub use background::spawn_cleanup_task;
pub use config::Config;
pub use service::TaskService;
