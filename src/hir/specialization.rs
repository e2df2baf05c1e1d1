//! Specialization store — kinded, cached edges from a type to its supertypes.
//!
//! Edge kinds form a lattice encoded as bit sets: every kind contains the
//! general [`SpecializationKind::SPECIALIZATION`] bit, a redefinition is also a
//! subsetting, and so on. A query for mask `M` returns every edge whose kind
//! contains all bits of `M`, so querying `SUBSETTING` yields subsettings and
//! redefinitions while querying `SPECIALIZATION` yields everything.

use std::cell::RefCell;
use std::sync::Arc;

use bitflags::bitflags;
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smol_str::SmolStr;
use text_size::TextRange;

use super::decl::Visibility;
use super::ids::DeclId;

bitflags! {
    /// Kind of a specialization edge.
    ///
    /// Composite constants include the bits of every kind they refine.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct SpecializationKind: u16 {
        /// General specialization (`specializes`); contained in every kind.
        const SPECIALIZATION = 1 << 0;
        /// Conjugation (`conjugates`).
        const CONJUGATION = (1 << 1) | Self::SPECIALIZATION.bits();
        /// Subclassification between classifiers.
        const SUBCLASSIFICATION = (1 << 2) | Self::SPECIALIZATION.bits();
        /// Subsetting between features (`subsets`).
        const SUBSETTING = (1 << 3) | Self::SPECIALIZATION.bits();
        /// Redefinition (`redefines`), a subsetting that hides the base name.
        const REDEFINITION = (1 << 4) | Self::SUBSETTING.bits();
        /// Reference subsetting (`references`).
        const REFERENCE_SUBSETTING = (1 << 5) | Self::SUBSETTING.bits();
        /// Feature typing (`typed by` / `:`).
        const TYPING = (1 << 6) | Self::SPECIALIZATION.bits();
    }
}

impl SpecializationKind {
    /// Returns true if an edge of this kind matches query `mask`.
    #[inline]
    pub fn matches(self, mask: SpecializationKind) -> bool {
        self.contains(mask)
    }

    /// Returns true for redefinitions, which hide rather than add names.
    #[inline]
    pub fn is_redefinition(self) -> bool {
        self.contains(Self::REDEFINITION)
    }

    /// Keyword used in source for this kind.
    pub fn keyword(self) -> &'static str {
        if self.contains(Self::REDEFINITION) {
            "redefines"
        } else if self.contains(Self::REFERENCE_SUBSETTING) {
            "references"
        } else if self.contains(Self::SUBSETTING) {
            "subsets"
        } else if self.contains(Self::TYPING) {
            "typed by"
        } else if self.contains(Self::CONJUGATION) {
            "conjugates"
        } else {
            "specializes"
        }
    }
}

/// A specialization edge as stored on its source declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Specialization {
    pub target: DeclId,
    pub kind: SpecializationKind,
    /// Added by the classifier bootstrap rather than written in source.
    pub implicit: bool,
    pub visibility: Visibility,
}

// ============================================================================
// STORE
// ============================================================================

/// Per-declaration collection of specialization edges.
///
/// Edges are deduplicated by target: re-adding a target that is already
/// present is a no-op, and the first recorded kind wins. Query results are
/// memoized per mask until the next [`add`](Self::add) or [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct Specializations {
    edges: IndexMap<DeclId, Specialization, FxBuildHasher>,
    cache: RefCell<FxHashMap<SpecializationKind, Arc<[Specialization]>>>,
}

impl Specializations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge to `target`. Returns false if `target` was already present.
    pub fn add(
        &mut self,
        target: DeclId,
        kind: SpecializationKind,
        implicit: bool,
        visibility: Visibility,
    ) -> bool {
        if self.edges.contains_key(&target) {
            return false;
        }

        self.edges.insert(
            target,
            Specialization {
                target,
                kind,
                implicit,
                visibility,
            },
        );
        self.cache.get_mut().clear();
        true
    }

    /// All edges whose kind contains every bit of `mask`, in insertion order.
    pub fn query(&self, mask: SpecializationKind) -> Arc<[Specialization]> {
        if let Some(cached) = self.cache.borrow().get(&mask) {
            return Arc::clone(cached);
        }

        let result: Arc<[Specialization]> = self
            .edges
            .values()
            .filter(|edge| edge.kind.matches(mask))
            .copied()
            .collect();
        self.cache.borrow_mut().insert(mask, Arc::clone(&result));
        result
    }

    /// Drop all edges and cached queries.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.cache.get_mut().clear();
    }

    /// Get the edge to `target`, if any.
    pub fn get(&self, target: DeclId) -> Option<&Specialization> {
        self.edges.get(&target)
    }

    /// Returns true if any explicit edge matches `mask`.
    pub fn has_explicit(&self, mask: SpecializationKind) -> bool {
        self.edges
            .values()
            .any(|edge| !edge.implicit && edge.kind.matches(mask))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specialization> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of memoized query masks (for cache diagnostics).
    pub fn cached_queries(&self) -> usize {
        self.cache.borrow().len()
    }
}

// ============================================================================
// EDGE REQUESTS
// ============================================================================

/// The target of an edge request as bound by the parsing layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// Already bound to a declaration.
    Decl(DeclId),
    /// Textual path still to be looked up by containment; dangling paths are
    /// reported as unresolved references.
    Path(Vec<SmolStr>),
}

impl From<DeclId> for Reference {
    fn from(id: DeclId) -> Self {
        Reference::Decl(id)
    }
}

/// An explicit specialization written in source, applied during linking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeRequest {
    pub target: Reference,
    pub kind: SpecializationKind,
    pub visibility: Visibility,
    pub range: Option<TextRange>,
}

impl EdgeRequest {
    pub fn new(target: impl Into<Reference>, kind: SpecializationKind) -> Self {
        Self {
            target: target.into(),
            kind,
            visibility: Visibility::Public,
            range: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }
}
