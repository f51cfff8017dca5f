//! # Canopy Core
//!
//! Shared value types for the Canopy content repository: validated
//! repository paths and privilege bit sets. Consumed by the authorization
//! crates so they agree on how tree locations and privileges are
//! represented.

pub mod error;
pub mod path;
pub mod privilege;

// Re-export commonly used types
pub use error::{PathError, PathResult};
pub use path::RepoPath;
pub use privilege::PrivilegeBits;
