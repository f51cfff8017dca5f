//! In-memory permission store

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use canopy_core::{PrivilegeBits, RepoPath};

use crate::error::Result;
use crate::store::PermissionStore;
use crate::types::{NumEntries, PermissionEntry, PrincipalEntries};

/// Thread-safe in-memory [`PermissionStore`]
///
/// The reference store implementation, used by tests, benches and
/// examples. Entries are kept per principal in a path-ordered map; within
/// a path they stay sorted by definition precedence, which is the order
/// the caching layer reports them in.
///
/// # Examples
///
/// ```
/// use canopy_authz::{MemoryPermissionStore, PermissionStore};
/// use canopy_core::{PrivilegeBits, RepoPath};
///
/// let store = MemoryPermissionStore::new();
/// let path = RepoPath::new("/content").unwrap();
/// store.put_entry("alice", &path, PrivilegeBits::READ, true);
///
/// let probe = store.num_entries("alice", 250).unwrap();
/// assert_eq!(probe.size, 1);
/// assert!(probe.exact);
/// ```
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    entries: RwLock<HashMap<String, BTreeMap<RepoPath, Vec<PermissionEntry>>>>,
}

impl MemoryPermissionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry for a principal, assigning the next definition index
    ///
    /// The index is the current number of entries at that path, so repeated
    /// calls record entries in definition order.
    pub fn put_entry(
        &self,
        principal_name: &str,
        path: &RepoPath,
        privileges: PrivilegeBits,
        allow: bool,
    ) {
        let mut entries = self.entries.write();
        let bucket = entries
            .entry(principal_name.to_string())
            .or_default()
            .entry(path.clone())
            .or_default();
        let index = bucket.len() as u32;
        bucket.push(PermissionEntry::new(path.clone(), privileges, allow, index));
    }

    /// Inserts a pre-built entry, keeping the path bucket sorted
    pub fn add_entry(&self, principal_name: &str, entry: PermissionEntry) {
        let mut entries = self.entries.write();
        let bucket = entries
            .entry(principal_name.to_string())
            .or_default()
            .entry(entry.path.clone())
            .or_default();
        let at = bucket.binary_search(&entry).unwrap_or_else(|pos| pos);
        bucket.insert(at, entry);
    }

    /// Removes every entry of a principal
    pub fn remove_principal(&self, principal_name: &str) {
        self.entries.write().remove(principal_name);
    }

    /// Number of access-controlled paths recorded for a principal
    pub fn path_count(&self, principal_name: &str) -> usize {
        self.entries
            .read()
            .get(principal_name)
            .map_or(0, |buckets| buckets.len())
    }

    /// Returns whether the store holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn num_entries(&self, principal_name: &str, max_limit: u64) -> Result<NumEntries> {
        let entries = self.entries.read();
        let count = entries
            .get(principal_name)
            .map_or(0, |buckets| buckets.len()) as u64;
        // counting cap: beyond max_limit the store only reports "many"
        if count > max_limit {
            Ok(NumEntries::unbounded())
        } else {
            Ok(NumEntries::exact(count))
        }
    }

    fn load_full(&self, principal_name: &str) -> Result<PrincipalEntries> {
        let entries = self.entries.read();
        let map: HashMap<RepoPath, Vec<PermissionEntry>> = entries
            .get(principal_name)
            .map(|buckets| {
                buckets
                    .iter()
                    .map(|(path, bucket)| (path.clone(), bucket.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(PrincipalEntries::complete(map))
    }

    fn load_path(
        &self,
        principal_name: &str,
        path: &RepoPath,
    ) -> Result<Option<Vec<PermissionEntry>>> {
        let entries = self.entries.read();
        Ok(entries
            .get(principal_name)
            .and_then(|buckets| buckets.get(path))
            .cloned())
    }
}
