//! Durable store backends and the item/query caches built on top of them.
//!
//! Both caches share one [`KeyValueStore`] handle and keep to their own key
//! namespace (`item-cache:` and `query-cache:`).
//!
//! ```rust
//! use std::sync::Arc;
//! use gifvault_cache::{InMemoryStore, ItemCache, QueryCache};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let items = ItemCache::new(Arc::clone(&store));
//! let queries = QueryCache::new(store);
//! # let _ = (items, queries);
//! ```
//!
//! [`KeyValueStore`]: gifvault_core::KeyValueStore

pub mod item;
pub mod memory;
pub mod query;
pub mod redis;

pub use gifvault_core::{KeyValueStore, StoreError};
pub use item::ItemCache;
pub use memory::InMemoryStore;
pub use query::{normalize_query, QueryCache};
pub use redis::RedisStore;

/// Type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
