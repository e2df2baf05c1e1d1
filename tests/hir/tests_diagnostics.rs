//! Model-wide semantic diagnostics.

use pretty_assertions::assert_eq;
use smol_str::SmolStr;
use syster_model::hir::{
    DeclKind, DeclarationData, EdgeRequest, ImplicitSupertypes, Reference, SemanticChecker,
    Severity, SpecializationKind, Visibility, check_model, codes,
};
use syster_model::TextRange;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::model_builders::ModelBuilder;

#[test]
fn test_clean_model_has_no_diagnostics() {
    let mut b = ModelBuilder::kerml();
    let p = b.root(DeclKind::Package, "P");
    let vehicle = b.child(p, DeclKind::Structure, "Vehicle");
    b.child(vehicle, DeclKind::Feature, "mass");
    let car = b.child(p, DeclKind::Structure, "Car");
    b.specializes(car, vehicle);
    b.import(p, "Base::*");
    let model = b.link();

    assert!(check_model(&model).is_empty());
}

#[test]
fn test_check_model_includes_link_diagnostics() {
    let mut b = ModelBuilder::with_library(ImplicitSupertypes::kerml());
    let p = b.root(DeclKind::Package, "P");
    let c = b.child(p, DeclKind::Class, "C");
    b.import(p, "Nowhere::*");
    let model = b.link();

    let diagnostics = check_model(&model);
    assert_eq!(codes(&diagnostics), vec!["W0004", "E0001"]);
    assert_eq!(diagnostics[0].decl, c);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[1].decl, p);
}

#[test]
fn test_ambiguous_redefinition_reported_once() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    b.specializes(bb, a);
    let y1 = b.child(bb, DeclKind::Feature, "y1");
    let y2 = b.child(bb, DeclKind::Feature, "y2");
    b.redefines(y1, x);
    b.redefines(y2, x);
    // C sees the same conflict one level further down.
    let c = b.root(DeclKind::Type, "C");
    b.specializes(c, bb);
    b.child(c, DeclKind::Feature, "own");
    let model = b.link();

    let diagnostics = check_model(&model);
    assert_single(&diagnostics, codes::INVALID_REDEFINITION, y2);
}

#[test]
fn test_request_range_is_reported() {
    let mut b = ModelBuilder::new();
    let c = b.root(DeclKind::Class, "C");
    let range = TextRange::new(10.into(), 17.into());
    b.model_mut()
        .request(
            c,
            EdgeRequest::new(
                Reference::Path(vec![SmolStr::new("Missing")]),
                SpecializationKind::SUBCLASSIFICATION,
            )
            .with_range(range),
        )
        .unwrap();
    let model = b.link();

    let diag = assert_single(model.link_diagnostics(), codes::UNDEFINED_REFERENCE, c);
    assert_eq!(diag.range, Some(range));
}

#[test]
fn test_declaration_range_is_the_fallback() {
    let mut b = ModelBuilder::new();
    let range = TextRange::new(0.into(), 40.into());
    let c = b
        .model_mut()
        .add_root(DeclarationData::new(DeclKind::Class).with_name("C").with_range(range));
    b.model_mut()
        .specialize(
            c,
            Reference::Path(vec![SmolStr::new("Missing")]),
            SpecializationKind::SUBCLASSIFICATION,
        )
        .unwrap();
    let model = b.link();

    let diag = assert_single(model.link_diagnostics(), codes::UNDEFINED_REFERENCE, c);
    assert_eq!(diag.range, Some(range));
}

#[test]
fn test_invalid_import_names_hidden_declaration() {
    let mut b = ModelBuilder::new();
    let lib = b.root(DeclKind::Package, "Lib");
    let inner = b.child_vis(lib, DeclKind::Package, "Inner", Visibility::Private);
    b.child(inner, DeclKind::Class, "A");
    let p = b.root(DeclKind::Package, "P");
    b.import(p, "Lib::Inner::A");
    let model = b.link();

    let diag = assert_single(&check_model(&model), codes::INVALID_IMPORT, p);
    assert!(diag.message.contains("Lib::Inner"));
    assert!(diag.is_error());
}

#[test]
fn test_checker_by_declaration() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    b.specializes(bb, a);
    let y1 = b.child(bb, DeclKind::Feature, "y1");
    let y2 = b.child(bb, DeclKind::Feature, "y2");
    b.redefines(y1, x);
    b.redefines(y2, x);
    let model = b.link();

    let mut checker = SemanticChecker::new(&model);
    checker.check_decl(a);
    assert!(checker.finish().is_empty());

    let mut checker = SemanticChecker::new(&model);
    checker.check_decl(bb);
    checker.check_decl(bb);
    assert_eq!(checker.finish().len(), 1);
}
