//! API Routes
//!
//! Configures the Axum router with the task resource, the status socket and
//! the health check.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_task_handler, delete_task_handler, get_task_handler, health_handler,
    list_tasks_handler, partial_update_task_handler, update_task_handler, AppState,
};
use super::socket::{not_found_socket_handler, status_socket_handler};

/// Well-known route of the status broadcast socket
pub const STATUS_SOCKET_PATH: &str = "/ws/tasks/status/";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /tasks/` - List tasks (cached, paginated, filterable)
/// - `POST /tasks/` - Create a task
/// - `GET /tasks/:id/` - Retrieve a task
/// - `PUT /tasks/:id/` - Full update
/// - `PATCH /tasks/:id/` - Partial update
/// - `DELETE /tasks/:id/` - Delete a task
/// - `GET /ws/tasks/status/` - Status change socket
/// - `GET /health` - Health check endpoint
///
/// Socket upgrades on any other path are accepted and closed as not found.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tasks/", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/:id/",
            get(get_task_handler)
                .put(update_task_handler)
                .patch(partial_update_task_handler)
                .delete(delete_task_handler),
        )
        .route(STATUS_SOCKET_PATH, get(status_socket_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_socket_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
