//! Session-scoped permission entry caching
//!
//! This module holds the per-session entry cache, the builder that decides
//! between eager and lazy caching, and the resulting read-only
//! [`PermissionCache`] consumed by the provider.

mod builder;
mod entries;

pub use builder::{CacheBuilder, PermissionCache};
pub use entries::EntryCache;
