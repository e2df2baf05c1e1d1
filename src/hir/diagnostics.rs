//! Diagnostics — Semantic error reporting.
//!
//! Problems in the modeled content are values attached to the offending
//! declaration, never panics. Linking collects unresolved references,
//! invalid imports and missing library supertypes; scope resolution reports
//! ambiguous redefinitions. [`check_model`] gathers both.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use text_size::TextRange;

use super::ids::DeclId;
use super::model::Model;
use super::scope::ScopeMode;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic attached to a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The declaration at fault.
    pub decl: DeclId,
    /// Source range, when the parser supplied one.
    pub range: Option<TextRange>,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Optional related information.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub decl: DeclId,
    pub range: Option<TextRange>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(decl: DeclId, message: impl Into<Arc<str>>) -> Self {
        Self::new(decl, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(decl: DeclId, message: impl Into<Arc<str>>) -> Self {
        Self::new(decl, Severity::Warning, message)
    }

    fn new(decl: DeclId, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            decl,
            range: None,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Set the source range.
    pub fn with_range(mut self, range: Option<TextRange>) -> Self {
        self.range = range;
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Import path that does not resolve.
    pub fn unresolved_import(decl: DeclId, range: Option<TextRange>, import: &str) -> Self {
        Self::error(decl, format!("unresolved import: '{}'", import))
            .with_range(range)
            .with_code(codes::UNDEFINED_REFERENCE)
    }

    /// Import path that resolves to a declaration that is not public.
    pub fn invalid_import(
        decl: DeclId,
        range: Option<TextRange>,
        import: &str,
        hidden: &str,
    ) -> Self {
        Self::error(
            decl,
            format!("invalid import: '{}' is not visible in '{}'", hidden, import),
        )
        .with_range(range)
        .with_code(codes::INVALID_IMPORT)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for semantic errors.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Semantic analysis errors (resolution, redefinition, imports)
/// - **W0001-W0099**: Warnings (library setup)
pub mod codes {
    /// Undefined reference (name or path not found).
    pub const UNDEFINED_REFERENCE: &str = "E0001";
    /// Two redefinitions of the same feature at the same distance.
    pub const INVALID_REDEFINITION: &str = "E0009";
    /// Import target exists but is not visible to importers.
    pub const INVALID_IMPORT: &str = "E0014";

    /// Library declaration for an implicit supertype is missing.
    pub const MISSING_IMPLICIT_SUPERTYPE: &str = "W0004";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add an undefined reference error.
    pub fn unresolved_reference(&mut self, decl: DeclId, range: Option<TextRange>, name: &str) {
        self.add(
            Diagnostic::error(decl, format!("undefined reference: '{}'", name))
                .with_range(range)
                .with_code(codes::UNDEFINED_REFERENCE),
        );
    }

    /// Add an ambiguous redefinition error on `redefiner`.
    pub fn ambiguous_redefinition(
        &mut self,
        redefiner: (DeclId, Option<TextRange>),
        redefined: &str,
        first: (DeclId, Option<TextRange>, &str),
    ) {
        let (decl, range) = redefiner;
        let (first_decl, first_range, first_name) = first;
        self.add(
            Diagnostic::error(
                decl,
                format!(
                    "ambiguous redefinition: '{}' is already redefined by '{}'",
                    redefined, first_name
                ),
            )
            .with_range(range)
            .with_code(codes::INVALID_REDEFINITION)
            .with_related(RelatedInfo {
                decl: first_decl,
                range: first_range,
                message: Arc::from(format!("first redefinition of '{}'", redefined)),
            }),
        );
    }

    /// Add a missing implicit supertype warning.
    pub fn missing_implicit_supertype(&mut self, decl: DeclId, range: Option<TextRange>, path: &str) {
        self.add(
            Diagnostic::warning(
                decl,
                format!("implicit supertype '{}' is not loaded", path),
            )
            .with_range(range)
            .with_code(codes::MISSING_IMPLICIT_SUPERTYPE),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific declaration.
    pub fn diagnostics_for(&self, decl: DeclId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.decl == decl).collect()
    }

    /// Drop the diagnostics attached to `decl`.
    pub fn remove_for(&mut self, decl: DeclId) {
        self.diagnostics.retain(|d| d.decl != decl);
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Runs the model-wide checks over a linked model.
pub struct SemanticChecker<'a> {
    model: &'a Model,
    collector: DiagnosticCollector,
}

impl<'a> SemanticChecker<'a> {
    /// Create a new semantic checker.
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            collector: DiagnosticCollector::new(),
        }
    }

    /// Check every declaration.
    pub fn check_all(&mut self) {
        for diagnostic in self.model.link_diagnostics() {
            self.collector.add(diagnostic.clone());
        }
        for id in self.model.preorder() {
            self.check_decl(id);
        }
    }

    /// Check the scope of a single declaration.
    pub fn check_decl(&mut self, decl: DeclId) {
        let declaration = &self.model[decl];
        let has_edges = declaration
            .as_type()
            .is_some_and(|ty| !ty.specializations().is_empty());
        if declaration.members().is_empty() && declaration.imports().is_empty() && !has_edges {
            return;
        }

        let scope = self.model.scope(decl, ScopeMode::Local);
        for diagnostic in scope.diagnostics() {
            self.collector.add(diagnostic.clone());
        }
    }

    /// Get the collected diagnostics, deduplicated.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut seen = FxHashSet::default();
        self.collector
            .diagnostics
            .into_iter()
            .filter(|d| seen.insert((d.decl, d.code.clone(), d.message.clone())))
            .collect()
    }
}

/// Check a linked model and return its diagnostics.
pub fn check_model(model: &Model) -> Vec<Diagnostic> {
    let mut checker = SemanticChecker::new(model);
    checker.check_all();
    checker.finish()
}
