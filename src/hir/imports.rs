//! Import directives and their expansion.
//!
//! Four shapes are supported:
//!
//! | Shape                | Syntax      | Contributes                                      |
//! |----------------------|-------------|--------------------------------------------------|
//! | specific             | `A::B::C`   | `A::B::C` only                                   |
//! | wildcard             | `A::B::*`   | `A::B`, then its public members                  |
//! | recursive            | `A::**`     | `A`, then every public descendant, pre-order     |
//! | recursive-exclusive  | `A::*::**`  | as recursive, without `A` itself                 |
//!
//! When a wildcard or recursive import expands a namespace, that namespace's
//! public imports are expanded too (re-export). A per-expansion visited set of
//! namespaces keeps mutually importing namespaces from looping.

use std::fmt;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::TextRange;
use tracing::trace;

use crate::base::{join_segments, split_qualified};

use super::decl::{MemberFilter, Visibility};
use super::error::ModelError;
use super::ids::DeclId;
use super::model::{Model, PathResolution};

/// Shape of an import directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import A::B::C;`
    Specific,
    /// `import A::B::*;`
    Wildcard,
    /// `import A::**;`
    Recursive,
    /// `import A::*::**;`
    RecursiveExclusive,
}

impl ImportKind {
    /// Path suffix that selects this shape.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Specific => "",
            Self::Wildcard => "::*",
            Self::Recursive => "::**",
            Self::RecursiveExclusive => "::*::**",
        }
    }
}

/// An import statement owned by a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDirective {
    /// Target path, without the wildcard suffix.
    path: Vec<SmolStr>,
    kind: ImportKind,
    visibility: Visibility,
    alias: Option<SmolStr>,
    range: Option<TextRange>,
}

impl ImportDirective {
    /// Create a directive from already split segments. Imports are private
    /// unless made public.
    pub fn new<S: Into<SmolStr>>(path: impl IntoIterator<Item = S>, kind: ImportKind) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            kind,
            visibility: Visibility::Private,
            alias: None,
            range: None,
        }
    }

    /// Parse an import path such as `A::B::*` or `'my lib'::**`.
    ///
    /// ```
    /// use syster_model::hir::{ImportDirective, ImportKind};
    ///
    /// let import = ImportDirective::parse("N1::*::**").unwrap();
    /// assert_eq!(import.kind(), ImportKind::RecursiveExclusive);
    /// assert_eq!(import.path(), ["N1"]);
    /// ```
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        if text.trim().is_empty() {
            return Err(ModelError::EmptyPath);
        }
        let mut segments = split_qualified(text).ok_or_else(|| ModelError::malformed(text))?;

        let kind = match segments.last().map(SmolStr::as_str) {
            Some("**") => {
                segments.pop();
                if segments.last().map(SmolStr::as_str) == Some("*") {
                    segments.pop();
                    ImportKind::RecursiveExclusive
                } else {
                    ImportKind::Recursive
                }
            }
            Some("*") => {
                segments.pop();
                ImportKind::Wildcard
            }
            _ => ImportKind::Specific,
        };

        if segments.is_empty() || segments.iter().any(|s| s == "*" || s == "**") {
            return Err(ModelError::malformed(text));
        }
        Ok(Self::new(segments, kind))
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Make the import public, re-exporting what it brings in.
    pub fn public(self) -> Self {
        self.with_visibility(Visibility::Public)
    }

    /// Name the imported declaration differently (specific imports only).
    pub fn with_alias(mut self, alias: impl Into<SmolStr>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn path(&self) -> &[SmolStr] {
        &self.path
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl fmt::Display for ImportDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = join_segments(self.path.iter().map(SmolStr::as_str));
        write!(f, "{}{}", path, self.kind.suffix())
    }
}

// ============================================================================
// EXPANSION
// ============================================================================

/// A declaration brought into scope by an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Imported {
    pub decl: DeclId,
    /// Alias from a specific import, if any.
    pub alias: Option<SmolStr>,
}

/// Resolve the target of `directive` as written in `owner`.
///
/// The target must be publicly visible from `owner`; anything else counts
/// as not found here and is reported during linking.
pub(crate) fn import_target(model: &Model, owner: DeclId, directive: &ImportDirective) -> Option<DeclId> {
    match model.resolve_path(Some(owner), directive.path()) {
        PathResolution::Found(target) => Some(target),
        PathResolution::NotVisible(_) | PathResolution::NotFound => None,
    }
}

/// Expand the import directives of `namespace` in declaration order.
///
/// All of the namespace's own directives take part, whatever their
/// visibility. Recursive imports also follow the public directives of the
/// namespaces they walk; wildcard imports stop at the target's members.
pub fn resolve_imports(model: &Model, namespace: DeclId) -> Vec<Imported> {
    let mut expansion = ImportExpansion {
        model,
        visited: FxHashSet::default(),
        out: Vec::new(),
    };
    expansion.expand_directives(namespace, false);
    expansion.out
}

struct ImportExpansion<'m> {
    model: &'m Model,
    /// Namespaces whose directives are being (or have been) expanded.
    visited: FxHashSet<DeclId>,
    out: Vec<Imported>,
}

impl ImportExpansion<'_> {
    fn expand_directives(&mut self, namespace: DeclId, public_only: bool) {
        if !self.visited.insert(namespace) {
            trace!(namespace = %namespace, "import cycle, skipping re-expansion");
            return;
        }

        let model = self.model;
        for directive in model[namespace].imports() {
            if public_only && !directive.is_public() {
                continue;
            }
            self.expand(namespace, directive);
        }
    }

    fn expand(&mut self, owner: DeclId, directive: &ImportDirective) {
        let Some(target) = import_target(self.model, owner, directive) else {
            trace!(owner = %owner, import = %directive, "import target not resolved");
            return;
        };
        trace!(owner = %owner, import = %directive, target = %target, "expanding import");

        match directive.kind() {
            ImportKind::Specific => self.out.push(Imported {
                decl: target,
                alias: directive.alias.clone(),
            }),
            ImportKind::Wildcard => {
                let model = self.model;
                self.push(target);
                for member in model.direct_members(target, MemberFilter::External) {
                    self.push(member);
                }
            }
            ImportKind::Recursive => {
                self.push(target);
                self.descend(target);
            }
            ImportKind::RecursiveExclusive => self.descend(target),
        }
    }

    /// Pre-order walk over public descendants of `namespace`.
    fn descend(&mut self, namespace: DeclId) {
        let model = self.model;
        for member in model.direct_members(namespace, MemberFilter::External) {
            self.push(member);
            self.descend(member);
        }
        self.expand_directives(namespace, true);
    }

    fn push(&mut self, decl: DeclId) {
        self.out.push(Imported { decl, alias: None });
    }
}
