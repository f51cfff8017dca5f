//! Strategy selection for the per-session permission cache

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use canopy_core::RepoPath;

use crate::cache::EntryCache;
use crate::error::Result;
use crate::store::PermissionStore;
use crate::types::{PermissionEntry, Tree};

/// Read-only permission cache built once per session
///
/// The variant is chosen by [`CacheBuilder::build`] from what is known about
/// the principal set at construction time. All variants answer the same two
/// queries; after construction none of them writes through to the store
/// except the lazy variant's memoization.
pub enum PermissionCache {
    /// No principal has any entries
    Empty,
    /// All entries of all principals, merged into one per-path map
    PathMap(HashMap<RepoPath, Vec<PermissionEntry>>),
    /// Entries are fetched per (principal, path) on demand and memoized
    Lazy {
        store: Arc<dyn PermissionStore>,
        cache: EntryCache,
        principal_names: BTreeSet<String>,
    },
}

impl PermissionCache {
    /// Returns all entries defined at exactly `path`, in entry order
    ///
    /// The result covers every principal the cache was built for. Paths
    /// without entries yield an empty vector.
    pub fn entries_at(&self, path: &RepoPath) -> Result<Vec<PermissionEntry>> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::PathMap(map) => Ok(map.get(path).cloned().unwrap_or_default()),
            Self::Lazy {
                store,
                cache,
                principal_names,
            } => {
                let mut merged = BTreeSet::new();
                for name in principal_names {
                    cache.load_path(store.as_ref(), &mut merged, name, path)?;
                }
                Ok(merged.into_iter().collect())
            }
        }
    }

    /// Returns the entries defined at the tree's own path
    ///
    /// Trees without an access control child cannot define entries, so the
    /// lookup is skipped for them entirely.
    pub fn entries_for_tree(&self, tree: &dyn Tree) -> Result<Vec<PermissionEntry>> {
        if !tree.has_access_control_child() {
            return Ok(Vec::new());
        }
        self.entries_at(tree.path())
    }

    /// Short label for the active strategy, used in logs
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::PathMap(_) => "eager",
            Self::Lazy { .. } => "lazy",
        }
    }
}

impl fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("PermissionCache::Empty"),
            Self::PathMap(map) => f
                .debug_struct("PermissionCache::PathMap")
                .field("paths", &map.len())
                .finish(),
            Self::Lazy {
                cache,
                principal_names,
                ..
            } => f
                .debug_struct("PermissionCache::Lazy")
                .field("principals", &principal_names.len())
                .field("cached_principals", &cache.principal_count())
                .finish(),
        }
    }
}

/// Builder assembling a [`PermissionCache`] for one session
///
/// The caller first warms the internal [`EntryCache`] through [`preload`]
/// and [`reserve`] while probing the store, then consumes the builder with
/// [`build`]. The warmed cache carries over into the built variant, so
/// nothing loaded during probing is fetched twice.
///
/// [`preload`]: CacheBuilder::preload
/// [`reserve`]: CacheBuilder::reserve
/// [`build`]: CacheBuilder::build
pub struct CacheBuilder {
    store: Arc<dyn PermissionStore>,
    cache: EntryCache,
}

impl fmt::Debug for CacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("cached_principals", &self.cache.principal_count())
            .finish()
    }
}

impl CacheBuilder {
    /// Creates a builder with a fresh, empty entry cache
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self {
            store,
            cache: EntryCache::new(),
        }
    }

    /// Fully loads a principal's entries ahead of the build
    ///
    /// Used for principals whose entry set is known to be small.
    pub fn preload(&self, principal_name: &str) -> Result<()> {
        self.cache.ensure_full(self.store.as_ref(), principal_name)
    }

    /// Registers a principal for lazy loading with a size hint
    pub fn reserve(&self, principal_name: &str, expected_size: u64) {
        self.cache.reserve(principal_name, expected_size);
    }

    /// Consumes the builder and picks the cache variant
    ///
    /// An empty principal set always yields [`PermissionCache::Empty`]. With
    /// `use_path_map` set, every principal is fully loaded and merged into
    /// one eager per-path map; otherwise the warmed cache moves into the
    /// lazy variant as-is.
    pub fn build(
        self,
        principal_names: &BTreeSet<String>,
        use_path_map: bool,
    ) -> Result<PermissionCache> {
        if principal_names.is_empty() {
            return Ok(PermissionCache::Empty);
        }
        if use_path_map {
            let mut merged: HashMap<RepoPath, BTreeSet<PermissionEntry>> = HashMap::new();
            for name in principal_names {
                self.cache
                    .load_into(self.store.as_ref(), name, &mut merged)?;
            }
            debug!(
                "built eager path map with {} paths for {} principals",
                merged.len(),
                principal_names.len()
            );
            let map = merged
                .into_iter()
                .map(|(path, entries)| (path, entries.into_iter().collect()))
                .collect();
            return Ok(PermissionCache::PathMap(map));
        }
        Ok(PermissionCache::Lazy {
            store: self.store,
            cache: self.cache,
            principal_names: principal_names.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::PrivilegeBits;

    use crate::store::MemoryPermissionStore;

    struct TestTree {
        path: RepoPath,
        acl: bool,
    }

    impl Tree for TestTree {
        fn path(&self) -> &RepoPath {
            &self.path
        }

        fn has_access_control_child(&self) -> bool {
            self.acl
        }
    }

    fn path(s: &str) -> RepoPath {
        RepoPath::new(s).unwrap()
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_principal_set_builds_empty_cache() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        let cache = CacheBuilder::new(store).build(&names(&[]), true).unwrap();

        assert_eq!(cache.strategy_name(), "empty");
        assert!(cache.entries_at(&path("/a")).unwrap().is_empty());
    }

    #[test]
    fn test_eager_cache_merges_principals_in_order() {
        let store = Arc::new(MemoryPermissionStore::new());
        let shared = path("/shared");
        store.put_entry("bob", &shared, PrivilegeBits::WRITE, true);
        store.put_entry("alice", &shared, PrivilegeBits::READ, true);
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, false);

        let cache = CacheBuilder::new(store)
            .build(&names(&["alice", "bob"]), true)
            .unwrap();

        assert_eq!(cache.strategy_name(), "eager");
        let at_shared = cache.entries_at(&shared).unwrap();
        assert_eq!(at_shared.len(), 2);
        assert!(at_shared.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(cache.entries_at(&path("/a")).unwrap().len(), 1);
        assert!(cache.entries_at(&path("/missing")).unwrap().is_empty());
    }

    #[test]
    fn test_eager_cache_is_a_snapshot() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        let cache = CacheBuilder::new(store.clone())
            .build(&names(&["alice"]), true)
            .unwrap();

        store.put_entry("alice", &path("/a"), PrivilegeBits::WRITE, true);
        store.put_entry("alice", &path("/b"), PrivilegeBits::READ, true);

        // the eager map was sealed at build time
        assert_eq!(cache.entries_at(&path("/a")).unwrap().len(), 1);
        assert!(cache.entries_at(&path("/b")).unwrap().is_empty());
    }

    #[test]
    fn test_lazy_cache_memoizes_hits() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        let cache = CacheBuilder::new(store.clone())
            .build(&names(&["alice"]), false)
            .unwrap();

        assert_eq!(cache.strategy_name(), "lazy");
        assert_eq!(cache.entries_at(&path("/a")).unwrap().len(), 1);

        store.put_entry("alice", &path("/a"), PrivilegeBits::WRITE, true);

        // the first answer was memoized, the store change is invisible
        assert_eq!(cache.entries_at(&path("/a")).unwrap().len(), 1);
    }

    #[test]
    fn test_lazy_cache_memoizes_absence() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/elsewhere"), PrivilegeBits::READ, true);

        let cache = CacheBuilder::new(store.clone())
            .build(&names(&["alice"]), false)
            .unwrap();

        assert!(cache.entries_at(&path("/a")).unwrap().is_empty());

        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        assert!(cache.entries_at(&path("/a")).unwrap().is_empty());
    }

    #[test]
    fn test_lazy_cache_merges_across_principals() {
        let store = Arc::new(MemoryPermissionStore::new());
        let shared = path("/shared");
        store.put_entry("alice", &shared, PrivilegeBits::READ, true);
        store.put_entry("bob", &shared, PrivilegeBits::WRITE, false);

        let cache = CacheBuilder::new(store)
            .build(&names(&["alice", "bob"]), false)
            .unwrap();

        let merged = cache.entries_at(&shared).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_preload_carries_into_lazy_variant() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        let builder = CacheBuilder::new(store.clone());
        builder.preload("alice").unwrap();

        store.put_entry("alice", &path("/b"), PrivilegeBits::READ, true);

        let cache = builder.build(&names(&["alice"]), false).unwrap();

        // the preloaded container is complete, so /b stays invisible
        assert_eq!(cache.entries_at(&path("/a")).unwrap().len(), 1);
        assert!(cache.entries_at(&path("/b")).unwrap().is_empty());
    }

    #[test]
    fn test_reserve_then_lazy_query() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        let builder = CacheBuilder::new(store);
        builder.reserve("alice", 1);
        let cache = builder.build(&names(&["alice"]), false).unwrap();

        // reserved containers still load on demand
        assert_eq!(cache.entries_at(&path("/a")).unwrap().len(), 1);
    }

    #[test]
    fn test_entries_for_tree_requires_access_control_child() {
        let store = Arc::new(MemoryPermissionStore::new());
        store.put_entry("alice", &path("/a"), PrivilegeBits::READ, true);

        let cache = CacheBuilder::new(store)
            .build(&names(&["alice"]), true)
            .unwrap();

        let bare = TestTree {
            path: path("/a"),
            acl: false,
        };
        let controlled = TestTree {
            path: path("/a"),
            acl: true,
        };

        assert!(cache.entries_for_tree(&bare).unwrap().is_empty());
        assert_eq!(cache.entries_for_tree(&controlled).unwrap().len(), 1);
    }
}
