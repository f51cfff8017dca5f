//! Lazy hierarchy traversal over cached permission entries

use std::sync::Arc;

use canopy_core::RepoPath;

use crate::cache::PermissionCache;
use crate::error::Result;
use crate::types::PermissionEntry;

/// Filter and starting point for a hierarchy walk
///
/// Implementations decide which entries a [`HierarchyIterator`] yields and
/// where along the hierarchy it begins.
pub trait EntryPredicate {
    /// Path the walk starts from; `None` starts at the root
    fn starting_path(&self) -> Option<&RepoPath>;

    /// Whether an entry should be yielded
    fn apply(&self, entry: &PermissionEntry) -> bool;
}

/// Iterator over the permission entries along a path's ancestor chain
///
/// Walks from the starting path up to the root, fetching one level from the
/// cache at a time. A level's entries are fully consumed, in entry order,
/// before the walk moves to the parent path. Paths without entries
/// contribute nothing and the walk continues outward.
///
/// A store failure during a lazy fetch is yielded as the next item, an
/// `Err`; the iterator is exhausted afterwards.
pub struct HierarchyIterator<P> {
    cache: Arc<PermissionCache>,
    predicate: P,
    buffer: std::vec::IntoIter<PermissionEntry>,
    next_path: Option<RepoPath>,
}

impl<P: EntryPredicate> HierarchyIterator<P> {
    /// Creates a walk starting at the predicate's path, or the root
    pub fn new(cache: Arc<PermissionCache>, predicate: P) -> Self {
        let start = predicate
            .starting_path()
            .cloned()
            .unwrap_or_else(RepoPath::root);
        Self {
            cache,
            predicate,
            buffer: Vec::new().into_iter(),
            next_path: Some(start),
        }
    }

    /// Creates a walk that is already exhausted
    pub(crate) fn exhausted(cache: Arc<PermissionCache>, predicate: P) -> Self {
        Self {
            cache,
            predicate,
            buffer: Vec::new().into_iter(),
            next_path: None,
        }
    }
}

impl<P: EntryPredicate> Iterator for HierarchyIterator<P> {
    type Item = Result<PermissionEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            for entry in self.buffer.by_ref() {
                if self.predicate.apply(&entry) {
                    return Some(Ok(entry));
                }
            }
            // buffer drained, move one level outward
            let path = self.next_path.take()?;
            match self.cache.entries_at(&path) {
                Ok(entries) => {
                    self.next_path = path.parent();
                    self.buffer = entries.into_iter();
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
