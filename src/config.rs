//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Number of tasks per list page
    pub page_size: usize,
    /// Lifetime in seconds of a cached list response
    pub cache_ttl: u64,
    /// Maximum number of entries the response cache can hold
    pub cache_max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Events buffered per broadcast topic before slow subscribers lag
    pub broadcast_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PAGE_SIZE` - Tasks per list page (default: 10)
    /// - `CACHE_TTL` - List cache lifetime in seconds (default: 600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `BROADCAST_CAPACITY` - Per-topic event buffer (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            page_size: env_or("PAGE_SIZE", defaults.page_size),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            broadcast_capacity: env_or("BROADCAST_CAPACITY", defaults.broadcast_capacity),
        }
    }
}

fn env_or<T: FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            page_size: 10,
            cache_ttl: 60 * 10,
            cache_max_entries: 1000,
            cleanup_interval: 1,
            broadcast_capacity: 100,
        }
    }
}
