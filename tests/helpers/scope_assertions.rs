//! Scope and resolution assertion helpers for HIR tests.

use pretty_assertions::assert_eq;
use syster_model::hir::{DeclId, Model, ResolveResult, Resolver, ScopeMode};

/// Qualified names visible from `decl`, in scope order.
pub fn scope_names(model: &Model, decl: DeclId, mode: ScopeMode) -> Vec<String> {
    model
        .scope(decl, mode)
        .qualified_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Assert the exact, ordered scope of `decl`.
pub fn assert_scope(model: &Model, decl: DeclId, mode: ScopeMode, expected: &[&str]) {
    assert_eq!(
        scope_names(model, decl, mode),
        expected,
        "scope of '{}' ({:?})",
        model.qualified_name(decl),
        mode
    );
}

/// Look up a declaration by qualified path, panicking if absent.
pub fn decl(model: &Model, path: &str) -> DeclId {
    model
        .find(path)
        .unwrap_or_else(|| panic!("Expected '{}' to exist", path))
}

/// Resolve `text` from `from` and assert it's found. Returns the declaration.
pub fn assert_resolves(model: &Model, from: DeclId, text: &str) -> DeclId {
    match Resolver::new(model).resolve(from, text) {
        ResolveResult::Found(found) => found,
        ResolveResult::NotFound => panic!(
            "'{}' did not resolve from '{}'",
            text,
            model.qualified_name(from)
        ),
        ResolveResult::Ambiguous(candidates) => panic!(
            "'{}' is ambiguous from '{}': {:?}",
            text,
            model.qualified_name(from),
            candidates
        ),
    }
}

/// Assert `text` does not resolve from `from`.
pub fn assert_not_found(model: &Model, from: DeclId, text: &str) {
    let result = Resolver::new(model).resolve(from, text);
    assert!(
        matches!(result, ResolveResult::NotFound),
        "Expected '{}' not to resolve from '{}', got {:?}",
        text,
        model.qualified_name(from),
        result
    );
}
