//! # syster-model
//!
//! Semantic model engine for KerML: specialization graphs, classifier
//! derivation with implicit library supertypes, and scope resolution over
//! imports, inheritance and redefinition.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Library table loading (JSON / YAML)
//!   ↓
//! hir       → Declarations, specializations, classifiers, imports, scopes
//!   ↓
//! base      → Primitives (names, TextRange)
//! ```
//!
//! The engine does not parse text: a front end builds a [`hir::Model`],
//! records import directives and specialization requests, and calls
//! [`hir::Model::link`].

// ============================================================================
// MODULES (dependency order: base → hir → project)
// ============================================================================

/// Foundation types: name quoting and splitting, TextRange
pub mod base;

/// High-level IR: the semantic model engine
pub mod hir;

/// Project configuration: implicit supertype tables from files
#[cfg(feature = "config")]
pub mod project;

// Re-export foundation types
pub use base::{TextRange, TextSize};

// Re-export the engine entry points
pub use hir::{DeclId, DeclKind, DeclarationData, Model, ScopeMode, SpecializationKind};
