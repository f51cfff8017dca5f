//! Privilege bit sets
//!
//! A compact bitset representation of the repository privileges an
//! access-control entry grants or denies.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A set of repository privileges packed into a `u64`
///
/// # Examples
///
/// ```
/// use canopy_core::PrivilegeBits;
///
/// let bits = PrivilegeBits::READ.union(PrivilegeBits::SET_PROPERTY);
/// assert!(bits.includes(PrivilegeBits::READ_NODE));
/// assert!(!bits.includes(PrivilegeBits::REMOVE_NODE));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PrivilegeBits(u64);

impl PrivilegeBits {
    /// The empty privilege set
    pub const EMPTY: Self = Self(0);

    /// Read a node
    pub const READ_NODE: Self = Self(1);
    /// Read a property
    pub const READ_PROPERTY: Self = Self(1 << 1);
    /// Add or change a property
    pub const SET_PROPERTY: Self = Self(1 << 2);
    /// Add a child node
    pub const ADD_CHILD: Self = Self(1 << 3);
    /// Remove a child node
    pub const REMOVE_CHILD: Self = Self(1 << 4);
    /// Remove the node itself
    pub const REMOVE_NODE: Self = Self(1 << 5);
    /// Read access-control content
    pub const READ_ACCESS_CONTROL: Self = Self(1 << 6);
    /// Modify access-control content
    pub const MODIFY_ACCESS_CONTROL: Self = Self(1 << 7);

    /// Read nodes and properties
    pub const READ: Self = Self(Self::READ_NODE.0 | Self::READ_PROPERTY.0);
    /// All content modifications
    pub const WRITE: Self = Self(
        Self::SET_PROPERTY.0 | Self::ADD_CHILD.0 | Self::REMOVE_CHILD.0 | Self::REMOVE_NODE.0,
    );
    /// Every defined privilege
    pub const ALL: Self =
        Self(Self::READ.0 | Self::WRITE.0 | Self::READ_ACCESS_CONTROL.0 | Self::MODIFY_ACCESS_CONTROL.0);

    /// Creates a privilege set from raw bits
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bit representation
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Returns whether no privilege is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the union of this set and `other`
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Checks if every privilege in `other` is contained in this set
    pub const fn includes(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks if this set shares at least one privilege with `other`
    pub const fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for PrivilegeBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for PrivilegeBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for PrivilegeBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}
