//! Background Tasks Module
//!
//! Long-running tasks spawned alongside the HTTP server.
//!
//! # Tasks
//! - Cache cleanup: purges expired list responses at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
