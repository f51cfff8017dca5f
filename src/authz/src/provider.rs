//! Provider tying store, principals and cache strategy together

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheBuilder, PermissionCache};
use crate::error::Result;
use crate::iterator::{EntryPredicate, HierarchyIterator};
use crate::store::PermissionStore;
use crate::types::{NumEntries, PermissionEntry, Tree};

/// Principals at or below this probed size are fully loaded up front
const SMALL_SET_THRESHOLD: u64 = 10;

const DEFAULT_EAGER_CACHE_SIZE: u64 = 250;

/// Tuning options for [`EntryProvider`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Threshold for the eager path map: when the combined probed entry
    /// count of all principals stays below this, everything is merged into
    /// one in-memory map at build time. Also caps the counting probe.
    pub eager_cache_size: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            eager_cache_size: DEFAULT_EAGER_CACHE_SIZE,
        }
    }
}

impl ProviderConfig {
    /// Config with a custom eager cache size
    pub fn with_eager_cache_size(eager_cache_size: u64) -> Self {
        Self { eager_cache_size }
    }
}

/// Everything a rebuild replaces in one piece
struct CacheState {
    existing: BTreeSet<String>,
    cache: Arc<PermissionCache>,
}

/// Permission entry provider for one set of principals
///
/// Built once per authorization session. Construction probes the store for
/// each principal's entry count and picks the cache strategy from the
/// result; read operations then serve from that cache. [`flush`] repeats
/// the probe and installs a completely new cache in one swap, so readers
/// never observe a half-built state and a failed rebuild leaves the old
/// cache serving.
///
/// [`flush`]: EntryProvider::flush
pub struct EntryProvider {
    store: Arc<dyn PermissionStore>,
    principal_names: BTreeSet<String>,
    config: ProviderConfig,
    state: RwLock<CacheState>,
}

impl EntryProvider {
    /// Creates a provider and builds its initial cache
    pub fn new(
        store: Arc<dyn PermissionStore>,
        principal_names: BTreeSet<String>,
        config: ProviderConfig,
    ) -> Result<Self> {
        let state = Self::build_state(&store, &principal_names, &config)?;
        Ok(Self {
            store,
            principal_names,
            config,
            state: RwLock::new(state),
        })
    }

    /// Discards all cached entries and rebuilds the cache from the store
    ///
    /// On failure the previous cache stays installed and keeps serving.
    pub fn flush(&self) -> Result<()> {
        match Self::build_state(&self.store, &self.principal_names, &self.config) {
            Ok(next) => {
                *self.state.write() = next;
                Ok(())
            }
            Err(err) => {
                warn!("cache rebuild failed, keeping previous cache: {}", err);
                Err(err)
            }
        }
    }

    /// Returns the entries defined at the tree's own path, all principals
    pub fn entries_for_tree(&self, tree: &dyn Tree) -> Result<Vec<PermissionEntry>> {
        let cache = self.state.read().cache.clone();
        cache.entries_for_tree(tree)
    }

    /// Returns an iterator walking the hierarchy from the predicate's path
    ///
    /// When none of the principals has any entries the iterator is created
    /// already exhausted and never touches the store.
    pub fn entry_iterator<P: EntryPredicate>(&self, predicate: P) -> HierarchyIterator<P> {
        let state = self.state.read();
        if state.existing.is_empty() {
            return HierarchyIterator::exhausted(state.cache.clone(), predicate);
        }
        HierarchyIterator::new(state.cache.clone(), predicate)
    }

    /// The principals this provider was built for
    pub fn principal_names(&self) -> &BTreeSet<String> {
        &self.principal_names
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Label of the currently installed cache strategy
    pub fn cache_strategy(&self) -> &'static str {
        self.state.read().cache.strategy_name()
    }

    fn build_state(
        store: &Arc<dyn PermissionStore>,
        principal_names: &BTreeSet<String>,
        config: &ProviderConfig,
    ) -> Result<CacheState> {
        let builder = CacheBuilder::new(store.clone());
        let mut existing = BTreeSet::new();
        let mut cnt: u64 = 0;
        for name in principal_names {
            let num = store.num_entries(name, config.eager_cache_size)?;
            if num.is_unbounded() {
                debug!(
                    "principal {} has more than {} access controlled paths",
                    name, config.eager_cache_size
                );
            } else {
                debug!(
                    "principal {} has {} access controlled paths",
                    name, num.size
                );
            }
            if num.size > 0 {
                existing.insert(name.clone());
                if num.size <= SMALL_SET_THRESHOLD {
                    builder.preload(name)?;
                } else {
                    let expected = if num.exact {
                        num.size
                    } else {
                        NumEntries::UNBOUNDED
                    };
                    builder.reserve(name, expected);
                }
            }
            // saturating add keeps the unbounded sentinel sticky
            cnt = cnt.saturating_add(num.size);
        }
        let use_path_map = cnt > 0 && cnt < config.eager_cache_size;
        let cache = builder.build(&existing, use_path_map)?;
        info!(
            "permission cache ready: strategy {}, {} of {} principals with entries",
            cache.strategy_name(),
            existing.len(),
            principal_names.len()
        );
        Ok(CacheState {
            existing,
            cache: Arc::new(cache),
        })
    }
}

impl fmt::Debug for EntryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("EntryProvider")
            .field("principals", &self.principal_names.len())
            .field("existing", &state.existing.len())
            .field("strategy", &state.cache.strategy_name())
            .finish()
    }
}
