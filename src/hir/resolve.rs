//! Name resolution — binding textual references to declarations.
//!
//! Built on [`Model::scope`]: a simple name is looked up in the local scope
//! of the referencing declaration, then in the local scope of each
//! enclosing declaration, then among global names. Each further segment of
//! a qualified name is looked up in the external scope of the previous one.

use tracing::trace;

use crate::base::split_qualified;

use super::ids::DeclId;
use super::model::Model;
use super::scope::{Scope, ScopeMode};

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Result of resolving a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Successfully resolved to a single declaration.
    Found(DeclId),
    /// Resolved to multiple candidates (ambiguous).
    Ambiguous(Vec<DeclId>),
    /// Could not resolve the reference.
    NotFound,
}

impl ResolveResult {
    /// Get the resolved declaration if unambiguous.
    pub fn decl(&self) -> Option<DeclId> {
        match self {
            ResolveResult::Found(d) => Some(*d),
            _ => None,
        }
    }

    /// Check if resolution was successful.
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    /// Check if the reference was ambiguous.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolver for references written inside a model.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    model: &'a Model,
}

impl<'a> Resolver<'a> {
    /// Create a new resolver.
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Resolve `text` (a simple or qualified name) as written in `from`.
    pub fn resolve(&self, from: DeclId, text: &str) -> ResolveResult {
        let Some(segments) = split_qualified(text) else {
            return ResolveResult::NotFound;
        };
        let Some((first, rest)) = segments.split_first() else {
            return ResolveResult::NotFound;
        };

        let mut result = self.resolve_simple(from, first);
        for segment in rest {
            let ResolveResult::Found(current) = result else {
                break;
            };
            let scope = self.model.scope(current, ScopeMode::External);
            result = pick(&scope, segment);
        }

        trace!(from = %from, text, result = ?result, "resolved reference");
        result
    }

    /// Resolve a single name by walking outward from `from`.
    pub fn resolve_simple(&self, from: DeclId, name: &str) -> ResolveResult {
        let mut current = Some(from);
        while let Some(ns) = current {
            let scope = self.model.scope(ns, ScopeMode::Local);
            match pick(&scope, name) {
                ResolveResult::NotFound => current = self.model[ns].owner(),
                found => return found,
            }
        }
        self.resolve_global(name)
    }

    /// Resolve a name among top-level declarations.
    pub fn resolve_global(&self, name: &str) -> ResolveResult {
        let candidates: Vec<DeclId> = self
            .model
            .global_members()
            .filter(|&d| self.model.has_name(d, name))
            .collect();
        match candidates.as_slice() {
            [] => ResolveResult::NotFound,
            [only] => ResolveResult::Found(*only),
            _ => ResolveResult::Ambiguous(candidates),
        }
    }
}

/// Pick the entry for `name` from a scope. Candidates from the same origin
/// tier as the first match are ambiguous; later tiers are shadowed.
fn pick(scope: &Scope, name: &str) -> ResolveResult {
    let mut matches = scope.lookup(name);
    let Some(first) = matches.next() else {
        return ResolveResult::NotFound;
    };

    let mut candidates = vec![first.decl];
    candidates.extend(
        matches
            .filter(|entry| entry.origin == first.origin)
            .map(|entry| entry.decl),
    );

    if candidates.len() == 1 {
        ResolveResult::Found(first.decl)
    } else {
        ResolveResult::Ambiguous(candidates)
    }
}
