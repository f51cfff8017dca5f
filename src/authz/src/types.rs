//! Core types for permission entry resolution
//!
//! Defines the permission entry itself, the per-principal entry container
//! with its three-way path state, and the probe result returned by cheap
//! store size queries.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use canopy_core::{PrivilegeBits, RepoPath};

/// An access-control entry resolved to a specific repository path
///
/// Entries are immutable once produced by the store. The `index` is the
/// definition precedence of the entry among the entries at the same path;
/// evaluators rely on it for first-match-wins style resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Path this entry takes effect at
    pub path: RepoPath,
    /// Privileges granted or denied
    pub privileges: PrivilegeBits,
    /// Whether the privileges are granted (`true`) or denied (`false`)
    pub allow: bool,
    /// Definition precedence among the entries at the same path
    pub index: u32,
}

impl PermissionEntry {
    /// Creates a new permission entry
    pub fn new(path: RepoPath, privileges: PrivilegeBits, allow: bool, index: u32) -> Self {
        Self {
            path,
            privileges,
            allow,
            index,
        }
    }
}

impl Ord for PermissionEntry {
    /// Orders by definition precedence
    ///
    /// The `index` is the primary key. The remaining fields take part only
    /// to keep the order total and consistent with equality, so ordered
    /// sets holding entries from several principals stay deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.privileges.cmp(&other.privileges))
            .then_with(|| self.allow.cmp(&other.allow))
    }
}

impl PartialOrd for PermissionEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a cheap store-side entry count probe
///
/// `size` is the number of access-controlled paths a principal has, or
/// [`NumEntries::UNBOUNDED`] when the store capped the count. An unbounded
/// size must never enter plain arithmetic; accumulate with saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumEntries {
    /// Number of access-controlled paths, or the unbounded sentinel
    pub size: u64,
    /// Whether `size` is an exact count
    pub exact: bool,
}

impl NumEntries {
    /// Sentinel for "more than the store was willing to count"
    pub const UNBOUNDED: u64 = u64::MAX;

    /// An exact count
    pub fn exact(size: u64) -> Self {
        Self { size, exact: true }
    }

    /// An approximate count
    pub fn approximate(size: u64) -> Self {
        Self { size, exact: false }
    }

    /// The unbounded probe result
    pub fn unbounded() -> Self {
        Self {
            size: Self::UNBOUNDED,
            exact: false,
        }
    }

    /// Returns whether the count hit the store-side cap
    pub fn is_unbounded(&self) -> bool {
        self.size == Self::UNBOUNDED
    }
}

/// What a principal's container knows about one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState<'a> {
    /// The path has never been queried
    Unknown,
    /// The path was queried and has no entries
    Tombstone,
    /// Entries loaded for the path, in store-defined order
    Loaded(&'a [PermissionEntry]),
}

/// All permission entries observed so far for one principal
///
/// Maps each known path to its ordered entries. A path mapped to an empty
/// collection is a tombstone: the store was asked and answered "no entries".
/// When `fully_loaded` is set the mapping is complete and the absence of a
/// path is authoritative; otherwise absence only means "not yet queried".
/// Mutated only by cache loads, never by consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrincipalEntries {
    entries: HashMap<RepoPath, Vec<PermissionEntry>>,
    fully_loaded: bool,
    expected_size: Option<u64>,
}

impl PrincipalEntries {
    /// Creates an empty, not fully loaded container
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container carrying an expected-size hint
    ///
    /// The hint is informational only; it does not bound how many paths the
    /// container will eventually hold.
    pub fn with_expected_size(expected_size: u64) -> Self {
        Self {
            entries: HashMap::new(),
            fully_loaded: false,
            expected_size: Some(expected_size),
        }
    }

    /// Creates a fully loaded container from a complete path map
    ///
    /// Buckets must be in store-defined order; they are not re-sorted here.
    pub fn complete(entries: HashMap<RepoPath, Vec<PermissionEntry>>) -> Self {
        Self {
            entries,
            fully_loaded: true,
            expected_size: None,
        }
    }

    /// Returns whether this container holds the principal's complete entry set
    pub fn is_fully_loaded(&self) -> bool {
        self.fully_loaded
    }

    /// Returns the expected-size hint, if one was recorded
    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    /// Looks up what is known about `path`
    pub fn lookup(&self, path: &RepoPath) -> PathState<'_> {
        match self.entries.get(path) {
            None => PathState::Unknown,
            Some(entries) if entries.is_empty() => PathState::Tombstone,
            Some(entries) => PathState::Loaded(entries),
        }
    }

    /// Records loaded entries for a path
    pub fn put_entries(&mut self, path: RepoPath, entries: Vec<PermissionEntry>) {
        self.entries.insert(path, entries);
    }

    /// Records that a path has no entries
    pub fn put_tombstone(&mut self, path: RepoPath) {
        self.entries.insert(path, Vec::new());
    }

    /// Iterates over paths with loaded entries, skipping tombstones
    pub fn iter_loaded(&self) -> impl Iterator<Item = (&RepoPath, &[PermissionEntry])> {
        self.entries
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(path, entries)| (path, entries.as_slice()))
    }

    /// Number of known paths, tombstones included
    pub fn path_count(&self) -> usize {
        self.entries.len()
    }
}

/// Minimal view of a content tree node
///
/// The permission layer only needs the node's path and a cheap structural
/// check telling whether the node carries an access-control child at all.
pub trait Tree {
    /// Path of this node
    fn path(&self) -> &RepoPath;

    /// Whether this node has an access-control child node
    fn has_access_control_child(&self) -> bool;
}
