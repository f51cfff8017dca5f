//! Per-session cache of principal permission entries

use std::collections::{BTreeSet, HashMap};

use dashmap::DashMap;
use tracing::debug;

use canopy_core::RepoPath;

use crate::error::Result;
use crate::store::PermissionStore;
use crate::types::{NumEntries, PathState, PermissionEntry, PrincipalEntries};

/// Session-scoped cache of the permission entries of principals
///
/// Keyed by principal name, the cache amortizes store reads across the many
/// lookups a session performs: full loads are done at most once per
/// principal, and single-path queries remember both their hits and their
/// misses (tombstones), so no (principal, path) combination is ever read
/// from the store twice.
///
/// Owned by exactly one provider build; never shared across sessions.
#[derive(Debug, Default)]
pub struct EntryCache {
    entries: DashMap<String, PrincipalEntries>,
}

impl EntryCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure the principal's container is fully loaded
    ///
    /// A full load replaces any previously cached partial data, tombstones
    /// included.
    pub(crate) fn ensure_full(
        &self,
        store: &dyn PermissionStore,
        principal_name: &str,
    ) -> Result<()> {
        let needs_load = self
            .entries
            .get(principal_name)
            .map_or(true, |ppe| !ppe.is_fully_loaded());
        if needs_load {
            debug!("loading all entries for principal {}", principal_name);
            let loaded = store.load_full(principal_name)?;
            self.entries.insert(principal_name.to_string(), loaded);
        }
        Ok(())
    }

    /// Returns the principal's complete entry container, loading it if needed
    ///
    /// A second call for the same principal performs zero store I/O until
    /// the principal is flushed.
    pub fn load_full(
        &self,
        store: &dyn PermissionStore,
        principal_name: &str,
    ) -> Result<PrincipalEntries> {
        self.ensure_full(store, principal_name)?;
        Ok(self
            .entries
            .get(principal_name)
            .map(|ppe| ppe.value().clone())
            .unwrap_or_default())
    }

    /// Merges the principal's complete entries into `path_entry_map`
    ///
    /// Ensures the principal is fully loaded first. Entries are unioned into
    /// the per-path ordered sets, so paths fed by several principals end up
    /// deduplicated and sorted.
    pub fn load_into(
        &self,
        store: &dyn PermissionStore,
        principal_name: &str,
        path_entry_map: &mut HashMap<RepoPath, BTreeSet<PermissionEntry>>,
    ) -> Result<()> {
        self.ensure_full(store, principal_name)?;
        if let Some(ppe) = self.entries.get(principal_name) {
            for (path, entries) in ppe.iter_loaded() {
                path_entry_map
                    .entry(path.clone())
                    .or_default()
                    .extend(entries.iter().cloned());
            }
        }
        Ok(())
    }

    /// Collects the principal's entries at one path into `out`
    ///
    /// Serves from memory whenever the container is fully loaded or the path
    /// was queried before (hit or tombstone). Otherwise the store is asked
    /// for exactly this (principal, path); an absent answer is remembered as
    /// a tombstone so the store is never asked again.
    pub fn load_path(
        &self,
        store: &dyn PermissionStore,
        out: &mut BTreeSet<PermissionEntry>,
        principal_name: &str,
        path: &RepoPath,
    ) -> Result<()> {
        {
            let ppe = self.entries.entry(principal_name.to_string()).or_default();
            match ppe.lookup(path) {
                PathState::Loaded(entries) => {
                    out.extend(entries.iter().cloned());
                    return Ok(());
                }
                PathState::Tombstone => return Ok(()),
                PathState::Unknown => {
                    if ppe.is_fully_loaded() {
                        // complete container, absence is authoritative
                        return Ok(());
                    }
                }
            }
        }

        // guard dropped above; the store call must not hold a cache lock
        let loaded = store.load_path(principal_name, path)?;
        let mut ppe = self.entries.entry(principal_name.to_string()).or_default();
        match loaded {
            Some(entries) => {
                out.extend(entries.iter().cloned());
                ppe.put_entries(path.clone(), entries);
            }
            None => {
                debug!(
                    "no entries for principal {} at {}, caching the absence",
                    principal_name, path
                );
                ppe.put_tombstone(path.clone());
            }
        }
        Ok(())
    }

    /// Registers an empty container for a principal served lazily
    ///
    /// The expected size is recorded as an informational hint only. Existing
    /// containers are left untouched.
    pub fn reserve(&self, principal_name: &str, expected_size: u64) {
        if expected_size == NumEntries::UNBOUNDED {
            debug!(
                "reserved entry container for principal {} (size unknown)",
                principal_name
            );
        } else {
            debug!(
                "reserved entry container for principal {} (expected {} paths)",
                principal_name, expected_size
            );
        }
        self.entries
            .entry(principal_name.to_string())
            .or_insert_with(|| PrincipalEntries::with_expected_size(expected_size));
    }

    /// Returns the expected-size hint recorded for a principal
    pub fn expected_size(&self, principal_name: &str) -> Option<u64> {
        self.entries
            .get(principal_name)
            .and_then(|ppe| ppe.expected_size())
    }

    /// Drops the cached containers of the given principals
    ///
    /// Their next access reloads from the store; other principals stay
    /// cached.
    pub fn flush<S: AsRef<str>>(&self, principal_names: &[S]) {
        for name in principal_names {
            self.entries.remove(name.as_ref());
        }
    }

    /// Number of principals with a cached container
    pub fn principal_count(&self) -> usize {
        self.entries.len()
    }
}
