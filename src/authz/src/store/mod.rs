//! Backing permission store interface
//!
//! The store is the read-only source of truth for permission entries. The
//! caching layer only ever talks to it through [`PermissionStore`]; how a
//! store persists or indexes entries is its own concern.

mod memory;

pub use memory::MemoryPermissionStore;

use canopy_core::RepoPath;

use crate::error::Result;
use crate::types::{NumEntries, PermissionEntry, PrincipalEntries};

/// Read access to the permission entries of principals
///
/// Implementations may be shared across sessions and must be safe for
/// concurrent reads. All methods are blocking; timeout and retry policy
/// belong to the implementation, not to the callers.
pub trait PermissionStore: Send + Sync {
    /// Probes the number of access-controlled paths for a principal
    ///
    /// Must be cheap and must not materialize entries. Implementations may
    /// stop counting at `max_limit` and report [`NumEntries::UNBOUNDED`]
    /// with `exact = false` instead of an expensive precise count.
    fn num_entries(&self, principal_name: &str, max_limit: u64) -> Result<NumEntries>;

    /// Loads all entries of a principal across all paths
    ///
    /// The returned container is fully loaded: the absence of a path in it
    /// is authoritative.
    fn load_full(&self, principal_name: &str) -> Result<PrincipalEntries>;

    /// Loads the entries of a principal at exactly one path
    ///
    /// Returns `None` when the principal has no entries at this path. That
    /// answer is authoritative and callers may cache it.
    fn load_path(&self, principal_name: &str, path: &RepoPath)
        -> Result<Option<Vec<PermissionEntry>>>;
}
