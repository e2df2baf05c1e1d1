//! Identifiers for declarations in the model arena.

use std::fmt;

/// Handle to a declaration owned by a [`Model`](super::Model).
///
/// Handles are only meaningful for the model that issued them. Declarations
/// refer to each other exclusively through handles, so cyclic graphs
/// (imports, specializations) need no special lifetime handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(u32);

impl DeclId {
    /// Create a handle from an arena index.
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the index into the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
