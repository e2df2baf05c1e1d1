//! Error types for model construction.
//!
//! These are API-misuse errors returned from building operations. Problems
//! in the modeled content itself are reported as
//! [`Diagnostic`](super::Diagnostic)s instead.

use thiserror::Error;

use super::decl::DeclKind;
use super::ids::DeclId;

/// Errors that can occur while building a model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Handle not issued by this model.
    #[error("Unknown declaration: {0}")]
    UnknownDeclaration(DeclId),

    /// Specialization requested on a declaration without a type facet.
    #[error("{kind} {decl} is not a type and cannot specialize")]
    NotAType { decl: DeclId, kind: &'static str },

    /// Feature modifiers on a non-feature declaration.
    #[error("{kind} declarations cannot carry feature modifiers")]
    NotAFeature { kind: &'static str },

    /// Import directive on a declaration that is not a namespace.
    #[error("{kind} {decl} is not a namespace and cannot import")]
    NotANamespace { decl: DeclId, kind: &'static str },

    /// Path with no segments.
    #[error("Empty path")]
    EmptyPath,

    /// Path that could not be split into segments.
    #[error("Malformed path: {0}")]
    MalformedPath(String),
}

impl ModelError {
    pub(crate) fn not_a_type(decl: DeclId, kind: DeclKind) -> Self {
        Self::NotAType {
            decl,
            kind: kind.display(),
        }
    }

    pub(crate) fn not_a_namespace(decl: DeclId, kind: DeclKind) -> Self {
        Self::NotANamespace {
            decl,
            kind: kind.display(),
        }
    }

    /// Create a malformed path error.
    pub fn malformed(path: impl Into<String>) -> Self {
        Self::MalformedPath(path.into())
    }
}
