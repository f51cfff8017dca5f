//! Absolute repository paths
//!
//! Provides the `RepoPath` type used to address items in the content tree.
//! Paths are absolute, slash-separated and validated on construction, so
//! every value of this type upholds the path invariants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PathError, PathResult};

/// An absolute path into the hierarchical content tree
///
/// A repository path always starts at the root `/` and contains no empty
/// segments and no trailing slash (except the root path itself):
/// - `/` (the root)
/// - `/content`
/// - `/content/site/page`
///
/// Paths order lexicographically and can be used as map keys.
///
/// # Examples
///
/// ```
/// use canopy_core::RepoPath;
///
/// let path = RepoPath::new("/content/site/page").unwrap();
/// assert_eq!(path.depth(), 3);
/// assert_eq!(path.parent().unwrap().as_str(), "/content/site");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoPath {
    /// Validated path string
    raw: String,
}

impl RepoPath {
    /// Creates a new path from a string slice
    ///
    /// # Arguments
    ///
    /// * `s` - The path string (e.g., "/content/site")
    ///
    /// # Returns
    ///
    /// Returns a `PathResult<Self>` containing the validated path or an error
    pub fn new(s: &str) -> PathResult<Self> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        if !s.starts_with('/') {
            return Err(PathError::Relative(s.to_string()));
        }
        if s.len() > 1 {
            if s.ends_with('/') {
                return Err(PathError::TrailingSlash(s.to_string()));
            }
            if s[1..].split('/').any(|segment| segment.is_empty()) {
                return Err(PathError::EmptySegment(s.to_string()));
            }
        }

        Ok(Self { raw: s.to_string() })
    }

    /// Returns the root path `/`
    pub fn root() -> Self {
        Self {
            raw: "/".to_string(),
        }
    }

    /// Returns whether this is the root path
    pub fn is_root(&self) -> bool {
        self.raw == "/"
    }

    /// Returns the raw path string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the segments of this path
    ///
    /// The root path has no segments.
    pub fn segments(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.raw[1..].split('/').collect()
        }
    }

    /// Returns the depth of this path (number of segments, root is 0)
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.raw.bytes().filter(|b| *b == b'/').count()
        }
    }

    /// Returns the parent path, or `None` for the root
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_core::RepoPath;
    ///
    /// let path = RepoPath::new("/a/b").unwrap();
    /// assert_eq!(path.parent().unwrap().as_str(), "/a");
    /// assert_eq!(path.parent().unwrap().parent().unwrap().as_str(), "/");
    /// assert!(RepoPath::root().parent().is_none());
    /// ```
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.raw.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self {
                raw: self.raw[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Appends to this path
    ///
    /// # Arguments
    ///
    /// * `name` - A segment or relative segment chain (e.g. "a" or "a/b");
    ///   the result is validated
    pub fn join(&self, name: &str) -> PathResult<Self> {
        if self.is_root() {
            Self::new(&format!("/{}", name))
        } else {
            Self::new(&format!("{}/{}", self.raw, name))
        }
    }

    /// Checks if this path is a strict ancestor of another path
    ///
    /// The root is an ancestor of every other path; no path is an
    /// ancestor of itself.
    pub fn is_ancestor_of(&self, other: &RepoPath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other.raw.len() > self.raw.len()
            && other.raw.starts_with(&self.raw)
            && other.raw.as_bytes()[self.raw.len()] == b'/'
    }

    /// Iterates over this path and all of its ancestors up to the root
    ///
    /// Yields `self` first, then each parent in turn, ending with `/`.
    pub fn ancestors(&self) -> impl Iterator<Item = RepoPath> {
        std::iter::successors(Some(self.clone()), |path| path.parent())
    }
}

impl FromStr for RepoPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RepoPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<RepoPath> for String {
    fn from(path: RepoPath) -> String {
        path.raw
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
