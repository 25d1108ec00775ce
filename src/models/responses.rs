//! Response DTOs for the task API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::encode_query;
use crate::models::Task;

/// Page-number pagination envelope for list responses.
///
/// This is the payload cached by the list cache policy, so it round-trips
/// through `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Total matching tasks across all pages
    pub count: usize,
    /// Link to the next page, if any
    pub next: Option<String>,
    /// Link to the previous page, if any
    pub previous: Option<String>,
    /// Tasks on this page
    pub results: Vec<Task>,
}

impl ListResponse {
    /// Builds the envelope for one page, deriving navigation links from the
    /// request path and its query parameters.
    pub fn for_page(
        path: &str,
        params: &[(String, String)],
        page: usize,
        page_size: usize,
        count: usize,
        results: Vec<Task>,
    ) -> Self {
        let last_page = if page_size == 0 {
            1
        } else {
            count.div_ceil(page_size).max(1)
        };
        let next = (page < last_page).then(|| page_link(path, params, Some(page + 1)));
        let previous = match page {
            0 | 1 => None,
            2 => Some(page_link(path, params, None)),
            n => Some(page_link(path, params, Some(n - 1))),
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

fn page_link(path: &str, params: &[(String, String)], page: Option<usize>) -> String {
    let mut params: Vec<(String, String)> = params
        .iter()
        .filter(|(name, _)| name != "page")
        .cloned()
        .collect();
    if let Some(page) = page {
        params.push(("page".to_string(), page.to_string()));
    }

    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, encode_query(&params))
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
