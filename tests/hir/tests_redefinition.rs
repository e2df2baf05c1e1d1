//! Redefinition hiding and naming tests.

use pretty_assertions::assert_eq;
use syster_model::hir::{DeclKind, DeclarationData, ScopeMode, SpecializationKind, codes};

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::model_builders::ModelBuilder;
use crate::helpers::scope_assertions::*;

#[test]
fn test_redefinition_hides_base_feature() {
    // type A { feature x; }
    // type B specializes A { feature y redefines x; }
    // type C specializes B { feature z redefines y; }
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    b.specializes(bb, a);
    let y = b.child(bb, DeclKind::Feature, "y");
    b.redefines(y, x);
    let c = b.root(DeclKind::Type, "C");
    b.specializes(c, bb);
    let z = b.child(c, DeclKind::Feature, "z");
    b.redefines(z, y);
    let model = b.link();

    assert_scope(&model, bb, ScopeMode::External, &["B::y"]);
    assert_scope(&model, c, ScopeMode::External, &["C::z"]);
    assert_scope(&model, c, ScopeMode::Local, &["C::z", "C", "B", "A"]);
    assert!(model.scope(c, ScopeMode::External).diagnostics().is_empty());
}

#[test]
fn test_redefined_feature_still_reachable_for_classification() {
    let mut b = ModelBuilder::new();
    let s = b.root(DeclKind::Structure, "S");
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    b.typed_by(x, s);
    let bb = b.root(DeclKind::Type, "B");
    b.specializes(bb, a);
    let y = b.child(bb, DeclKind::Feature, "y");
    b.redefines(y, x);
    let model = b.link();

    assert!(!model.scope(bb, ScopeMode::External).contains(x));
    assert!(
        model
            .classifier_bits(y)
            .contains(syster_model::hir::ClassifierBits::STRUCTURE)
    );
    let redefined = model.specializations(y, SpecializationKind::SUBSETTING);
    assert_eq!(redefined.len(), 1);
    assert_eq!(redefined[0].target, x);
}

#[test]
fn test_redefinition_does_not_contribute_members() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    b.child(x, DeclKind::Feature, "inner");
    let bb = b.root(DeclKind::Type, "B");
    let y = b.child(bb, DeclKind::Feature, "y");
    b.redefines(y, x);
    let model = b.link();

    // Redefinition edges are not walked for inherited names.
    assert_scope(&model, y, ScopeMode::Local, &["B::y"]);
}

#[test]
fn test_redefinition_in_unrelated_type_does_not_hide() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let other = b.root(DeclKind::Type, "Other");
    let y = b.child(other, DeclKind::Feature, "y");
    b.redefines(y, x);
    let model = b.link();

    assert_scope(&model, a, ScopeMode::External, &["A::x"]);
}

#[test]
fn test_ambiguous_redefinition_is_reported() {
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

    let scope = model.scope(bb, ScopeMode::External);
    // The base feature stays visible when the redefinition is ambiguous.
    assert_eq!(scope.qualified_names(), vec!["B::y1", "B::y2", "A::x"]);

    let diag = assert_single(scope.diagnostics(), codes::INVALID_REDEFINITION, y2);
    assert!(diag.message.contains("A::x"));
    assert!(diag.message.contains("B::y1"));
    assert_eq!(diag.related.len(), 1);
    assert_eq!(diag.related[0].decl, y1);
}

#[test]
fn test_ambiguity_is_per_distance() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    b.specializes(bb, a);
    let y = b.child(bb, DeclKind::Feature, "y");
    b.redefines(y, x);
    let c = b.root(DeclKind::Type, "C");
    b.specializes(c, bb);
    let z = b.child(c, DeclKind::Feature, "z");
    b.redefines(z, x);
    let model = b.link();

    let scope = model.scope(c, ScopeMode::External);
    // C::z and B::y redefine A::x at different distances: no ambiguity.
    assert!(scope.diagnostics().is_empty());
    assert_eq!(scope.qualified_names(), vec!["C::z", "B::y"]);
}

#[test]
fn test_distance_is_the_shortest_path() {
    // type Z { feature x; }
    // type A specializes Z { feature a1 redefines x; }
    // type L specializes A;
    // type M specializes Z { feature m1 redefines x; }
    // type D specializes L, M, A;
    let mut b = ModelBuilder::new();
    let z = b.root(DeclKind::Type, "Z");
    let x = b.child(z, DeclKind::Feature, "x");
    let a = b.root(DeclKind::Type, "A");
    b.specializes(a, z);
    let a1 = b.child(a, DeclKind::Feature, "a1");
    b.redefines(a1, x);
    let l = b.root(DeclKind::Type, "L");
    b.specializes(l, a);
    let m = b.root(DeclKind::Type, "M");
    b.specializes(m, z);
    let m1 = b.child(m, DeclKind::Feature, "m1");
    b.redefines(m1, x);
    let d = b.root(DeclKind::Type, "D");
    b.specializes(d, l);
    b.specializes(d, m);
    b.specializes(d, a);
    let model = b.link();

    // A is first walked through L, but it is one hop from D like M.
    let scope = model.scope(d, ScopeMode::Local);
    let diag = assert_single(scope.diagnostics(), codes::INVALID_REDEFINITION, m1);
    assert_eq!(diag.related[0].decl, a1);
    assert_eq!(
        scope.qualified_names(),
        vec!["D", "L", "A", "A::a1", "Z", "Z::x", "M", "M::m1"]
    );
}

#[test]
fn test_redefinition_through_multiple_supertypes() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let left = b.root(DeclKind::Type, "Left");
    b.specializes(left, a);
    let lx = b.child(left, DeclKind::Feature, "lx");
    b.redefines(lx, x);
    let right = b.root(DeclKind::Type, "Right");
    b.specializes(right, a);
    let rx = b.child(right, DeclKind::Feature, "rx");
    b.redefines(rx, x);
    let d = b.root(DeclKind::Type, "D");
    b.specializes(d, left);
    b.specializes(d, right);
    let model = b.link();

    let scope = model.scope(d, ScopeMode::External);
    let invalid = with_code(scope.diagnostics(), codes::INVALID_REDEFINITION);
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].decl, rx);
    assert!(scope.contains(x));
}

#[test]
fn test_unnamed_redefinition_takes_base_name() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    b.specializes(bb, a);
    let anon = b.child_with(bb, DeclarationData::new(DeclKind::Feature));
    b.redefines(anon, x);
    let model = b.link();

    assert_eq!(model[anon].name(), Some("x"));
    assert_eq!(&*model.qualified_name(anon), "B::x");
    assert_scope(&model, bb, ScopeMode::External, &["B::x"]);
    assert_eq!(assert_resolves(&model, bb, "B::x"), anon);
}

#[test]
fn test_naming_propagates_through_redefinition_chain() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    let first = b.child_with(bb, DeclarationData::new(DeclKind::Feature));
    let c = b.root(DeclKind::Type, "C");
    // Declared before its base is named.
    let second = b.child_with(c, DeclarationData::new(DeclKind::Feature));
    b.redefines(second, first);
    b.redefines(first, x);
    let model = b.link();

    assert_eq!(model[first].name(), Some("x"));
    assert_eq!(model[second].name(), Some("x"));
}

#[test]
fn test_declared_name_wins_over_naming_feature() {
    let mut b = ModelBuilder::new();
    let a = b.root(DeclKind::Type, "A");
    let x = b.child(a, DeclKind::Feature, "x");
    let bb = b.root(DeclKind::Type, "B");
    let y = b.child(bb, DeclKind::Feature, "y");
    b.redefines(y, x);
    let model = b.link();

    assert_eq!(model[y].name(), Some("y"));
    assert_no_errors(model.link_diagnostics());
}
