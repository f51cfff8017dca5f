//! # Canopy Permission Entries
//!
//! Caching and resolution layer for per-principal permission entries.
//!
//! ## Features
//!
//! - **Per-session entry cache** remembering full loads, per-path hits and misses
//! - **Adaptive strategy** picking eager, lazy or empty caching from a cheap store probe
//! - **Atomic flush** building the replacement cache aside and swapping it in whole
//! - **Lazy hierarchy walks** yielding entries level by level from a path to the root
//! - **Pluggable backing store** behind a small synchronous trait
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//!
//! use canopy_authz::{EntryProvider, MemoryPermissionStore, ProviderConfig};
//! use canopy_core::{PrivilegeBits, RepoPath};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryPermissionStore::new());
//!     store.put_entry(
//!         "alice",
//!         &RepoPath::new("/content/docs")?,
//!         PrivilegeBits::READ,
//!         true,
//!     );
//!
//!     let principals: BTreeSet<String> = ["alice".to_string()].into();
//!     let provider = EntryProvider::new(store, principals, ProviderConfig::default())?;
//!     println!("cache strategy: {}", provider.cache_strategy());
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod store;
pub mod cache;
pub mod provider;
pub mod iterator;
pub mod error;

// Re-export commonly used types
pub use cache::{CacheBuilder, EntryCache, PermissionCache};
pub use error::{AuthzError, Result};
pub use iterator::{EntryPredicate, HierarchyIterator};
pub use provider::{EntryProvider, ProviderConfig};
pub use store::{MemoryPermissionStore, PermissionStore};
pub use types::{NumEntries, PathState, PermissionEntry, PrincipalEntries, Tree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
