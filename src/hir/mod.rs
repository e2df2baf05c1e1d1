//! High-level IR (HIR) — the semantic model engine.
//!
//! This module holds the linked declaration graph and the queries built on
//! it. Declarations live in a [`Model`] arena and refer to each other by
//! [`DeclId`]; specialization and import cycles are ordinary graph cycles
//! handled by per-query visited sets.
//!
//! ## Key Types
//!
//! - [`Model`] — Arena of declarations; construction, linking, reset
//! - [`Declaration`] — A node composed from capability facets
//! - [`Specializations`] — Kinded, cached supertype edges of a type
//! - [`ClassifierBits`] — Derived category membership
//! - [`ImplicitSupertypes`] — Library defaults for declarations without supertypes
//! - [`Scope`] — Ordered visible names of a declaration
//! - [`Resolver`] — Binding textual references through scopes
//!
//! ## Query Layers
//!
//! ```text
//! add / add_import / specialize   ← INPUT: containment tree and edge requests
//!     │
//!     ▼
//! link()                          ← Bind requests, add implicit supertypes
//!     │
//!     ├──► specializations(decl, mask)
//!     ├──► classifier_bits(decl)
//!     ▼
//! scope(decl, mode)               ← Members + imports + inherited - redefined
//!     │
//!     ▼
//! Resolver / check_model          ← Reference binding, diagnostics
//! ```

mod classifier;
mod decl;
mod diagnostics;
mod error;
mod ids;
mod imports;
mod library;
mod model;
mod resolve;
mod scope;
mod specialization;

pub use classifier::{ClassifierBits, ClassifierState};
pub use decl::{
    Capabilities, DeclKind, Declaration, DeclarationData, FeatureFacet, FeatureFlags,
    MemberFilter, RelationshipFacet, TypeFacet, Visibility,
};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, RelatedInfo, SemanticChecker, Severity, check_model, codes,
};
pub use error::ModelError;
pub use ids::DeclId;
pub use imports::{ImportDirective, ImportKind, Imported, resolve_imports};
pub use library::{ImplicitSupertypes, SupertypeRole};
pub use model::{Model, PathResolution};
pub use resolve::{ResolveResult, Resolver};
pub use scope::{Scope, ScopeEntry, ScopeMode, ScopeOrigin, ScopeResolver};
pub use specialization::{
    EdgeRequest, Reference, Specialization, SpecializationKind, Specializations,
};
