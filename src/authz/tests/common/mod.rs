//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use canopy_authz::{
    AuthzError, EntryPredicate, MemoryPermissionStore, NumEntries, PermissionEntry,
    PermissionStore, PrincipalEntries, Result, Tree,
};
use canopy_core::{PrivilegeBits, RepoPath};

/// Store wrapper counting every trait call
///
/// Wraps a [`MemoryPermissionStore`] and adds what the tests need on top:
/// per-method call counters, per-principal probe overrides (to simulate
/// stores that only report approximate or unbounded counts), and a switch
/// that makes both load methods fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryPermissionStore,
    probe_overrides: RwLock<HashMap<String, NumEntries>>,
    fail_loads: AtomicBool,
    num_entries_calls: AtomicUsize,
    full_load_calls: AtomicUsize,
    path_load_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access to the wrapped store, for seeding and mutation
    pub fn inner(&self) -> &MemoryPermissionStore {
        &self.inner
    }

    /// Seeds one entry, panicking on malformed paths
    pub fn seed(&self, principal_name: &str, path: &str, privileges: PrivilegeBits, allow: bool) {
        self.inner
            .put_entry(principal_name, &repo_path(path), privileges, allow);
    }

    /// Fixes the probe answer for one principal
    pub fn override_probe(&self, principal_name: &str, num: NumEntries) {
        self.probe_overrides
            .write()
            .insert(principal_name.to_string(), num);
    }

    /// Makes every subsequent load call fail
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn num_entries_count(&self) -> usize {
        self.num_entries_calls.load(Ordering::SeqCst)
    }

    pub fn full_load_count(&self) -> usize {
        self.full_load_calls.load(Ordering::SeqCst)
    }

    pub fn path_load_count(&self) -> usize {
        self.path_load_calls.load(Ordering::SeqCst)
    }

    /// Total number of load calls of either kind
    pub fn load_count(&self) -> usize {
        self.full_load_count() + self.path_load_count()
    }
}

impl PermissionStore for CountingStore {
    fn num_entries(&self, principal_name: &str, max_limit: u64) -> Result<NumEntries> {
        self.num_entries_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(num) = self.probe_overrides.read().get(principal_name) {
            return Ok(*num);
        }
        self.inner.num_entries(principal_name, max_limit)
    }

    fn load_full(&self, principal_name: &str) -> Result<PrincipalEntries> {
        self.full_load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AuthzError::store("injected load failure"));
        }
        self.inner.load_full(principal_name)
    }

    fn load_path(
        &self,
        principal_name: &str,
        path: &RepoPath,
    ) -> Result<Option<Vec<PermissionEntry>>> {
        self.path_load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AuthzError::store("injected load failure"));
        }
        self.inner.load_path(principal_name, path)
    }
}

/// Minimal tree handle for `entries_for_tree` calls
pub struct TestTree {
    path: RepoPath,
    acl: bool,
}

impl TestTree {
    /// Tree with an access control child at `path`
    pub fn controlled(path: &str) -> Self {
        Self {
            path: repo_path(path),
            acl: true,
        }
    }

    /// Tree without any access control child
    pub fn bare(path: &str) -> Self {
        Self {
            path: repo_path(path),
            acl: false,
        }
    }
}

impl Tree for TestTree {
    fn path(&self) -> &RepoPath {
        &self.path
    }

    fn has_access_control_child(&self) -> bool {
        self.acl
    }
}

/// Predicate accepting every entry
pub struct WalkAll {
    start: Option<RepoPath>,
}

impl WalkAll {
    pub fn from(path: &str) -> Self {
        Self {
            start: Some(repo_path(path)),
        }
    }

    pub fn from_root() -> Self {
        Self { start: None }
    }
}

impl EntryPredicate for WalkAll {
    fn starting_path(&self) -> Option<&RepoPath> {
        self.start.as_ref()
    }

    fn apply(&self, _entry: &PermissionEntry) -> bool {
        true
    }
}

pub fn repo_path(s: &str) -> RepoPath {
    RepoPath::new(s).expect("test path must be valid")
}

pub fn principals(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}
