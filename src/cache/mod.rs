//! Cache Module
//!
//! Namespaced cache entries on top of the key-value store, with an
//! in-process memo layer.

mod access;
mod entry;
mod memo;


// Re-export public types
pub use access::CacheAccess;
pub use entry::CacheEntry;
pub use memo::{Load, Memoized};

// == Public Constants ==
/// Prefix every gateway-owned key carries in the store
pub const CACHE_KEY_PREFIX: &str = "cache:";
