//! Diagnostic helpers for HIR tests.

use syster_model::hir::{DeclId, Diagnostic};

/// Codes of `diagnostics`, in order.
pub fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .filter_map(|d| d.code.as_deref())
        .collect()
}

/// Diagnostics carrying `code`.
pub fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(code))
        .collect()
}

/// Assert exactly one diagnostic with `code` is attached to `decl`.
pub fn assert_single(diagnostics: &[Diagnostic], code: &str, decl: DeclId) -> Diagnostic {
    let matching = with_code(diagnostics, code);
    assert_eq!(
        matching.len(),
        1,
        "Expected one {} diagnostic, got: {:?}",
        code,
        diagnostics
    );
    assert_eq!(matching[0].decl, decl, "{} attached to wrong declaration", code);
    matching[0].clone()
}

/// Assert no diagnostic is an error.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(errors.is_empty(), "Unexpected errors: {:?}", errors);
}
