//! Cache Module
//!
//! Response cache backends and the cache-aside policy for list endpoints.

mod backend;
mod entry;
mod lru;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use backend::{MemoryCache, ResponseCache};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use policy::{build_key, encode_query, ListCachePolicy, PAGE_PARAM};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 1024;
