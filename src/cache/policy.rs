//! List Cache Policy
//!
//! Cache-aside wrapper for paginated list reads. Keys are derived from the
//! resource scope, the request path and the canonicalised query string, so
//! equivalent requests share an entry regardless of parameter order or an
//! omitted `page`.
//!
//! Invalidation is deliberately narrow: after a create only the entry for the
//! current last page is removed. Other pages, other filter or ordering
//! combinations, and anything touched by updates or deletes stay cached until
//! their TTL runs out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::cache::ResponseCache;
use crate::error::Result;

/// Name of the pagination parameter
pub const PAGE_PARAM: &str = "page";

/// Encodes query parameters in canonical order (by name, then value).
pub fn encode_query(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in sorted {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Computes the cache key `"{scope}:{path}?{query}"`, inserting `page=1`
/// when the request does not name a page.
pub fn build_key(scope: &str, path: &str, params: &[(String, String)]) -> String {
    let mut params = params.to_vec();
    if !params.iter().any(|(name, _)| name == PAGE_PARAM) {
        params.push((PAGE_PARAM.to_string(), "1".to_string()));
    }
    format!("{}:{}?{}", scope, path, encode_query(&params))
}

// == List Cache Policy ==
#[derive(Clone)]
pub struct ListCachePolicy {
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
}

impl ListCachePolicy {
    pub fn new(cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Returns the cached response for this request or loads and caches a
    /// fresh one.
    ///
    /// Cache failures never fail the call: a read error is a miss and a
    /// write error is logged. Loader errors are returned and nothing is
    /// cached for them.
    pub async fn cached_list<T, F, Fut>(
        &self,
        scope: &str,
        path: &str,
        params: &[(String, String)],
        loader: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = build_key(scope, path, params);

        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(cached) => {
                    debug!("List cache hit: {}", key);
                    return Ok(cached);
                }
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", key, e),
            },
            Ok(None) => debug!("List cache miss: {}", key),
            Err(e) => warn!("Cache read failed for {}, treating as miss: {}", key, e),
        }

        let fresh = loader().await?;

        match serde_json::to_value(&fresh) {
            Ok(value) => {
                if let Err(e) = self.cache.set(&key, value, self.ttl).await {
                    warn!("Cache write failed for {}: {}", key, e);
                } else {
                    debug!("Cached list response with key: {}", key);
                }
            }
            Err(e) => warn!("Could not serialize list response for {}: {}", key, e),
        }

        Ok(fresh)
    }

    /// Deletes the cached entry for the last page after a create.
    ///
    /// The last page is `ceil(total_items / page_size)`; without a positive
    /// page size the request's own parameters are used unchanged. Only that
    /// single key is removed.
    pub async fn invalidate_last_page(
        &self,
        scope: &str,
        path: &str,
        params: &[(String, String)],
        total_items: usize,
        page_size: Option<usize>,
    ) {
        let mut params = params.to_vec();
        if let Some(size) = page_size.filter(|size| *size > 0) {
            let last_page = total_items.div_ceil(size);
            params.retain(|(name, _)| name != PAGE_PARAM);
            params.push((PAGE_PARAM.to_string(), last_page.to_string()));
        }

        let key = build_key(scope, path, &params);
        debug!("Invalidating cache with key: {}", key);

        if let Err(e) = self.cache.delete(&key).await {
            warn!("Cache delete failed for {}: {}", key, e);
        }
    }
}
