//! Library table loading tests.

use std::fs;

use pretty_assertions::assert_eq;
use syster_model::hir::{DeclKind, ImplicitSupertypes, Model, SpecializationKind, SupertypeRole};
use syster_model::project::{LibraryConfigError, LibraryFormat, LibraryLoader};
use tempfile::TempDir;

use crate::helpers::model_builders::{ModelBuilder, mini_stdlib};

#[test]
fn test_json_save_and_load() {
    let temp = TempDir::new().unwrap();
    let loader = LibraryLoader::new(temp.path().join("library.json"));
    assert_eq!(loader.format(), LibraryFormat::Json);

    let table = ImplicitSupertypes::kerml();
    loader.save(&table).unwrap();

    assert_eq!(loader.load().unwrap(), table);
}

#[test]
fn test_yaml_save_and_load() {
    let temp = TempDir::new().unwrap();
    let loader = LibraryLoader::new(temp.path().join("library.yaml"));
    assert_eq!(loader.format(), LibraryFormat::Yaml);

    let table = ImplicitSupertypes::empty()
        .with(DeclKind::Class, SupertypeRole::Base, "Lib::Root")
        .with(DeclKind::Feature, SupertypeRole::Object, "Lib::'all objects'");
    loader.save(&table).unwrap();

    let loaded = loader.load().unwrap();
    assert_eq!(loaded.get(DeclKind::Class, SupertypeRole::Base), Some("Lib::Root"));
    assert_eq!(
        loaded.get(DeclKind::Feature, SupertypeRole::Object),
        Some("Lib::'all objects'")
    );
}

#[test]
fn test_saved_json_is_readable() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library.json");
    let table = ImplicitSupertypes::empty().with(DeclKind::Step, SupertypeRole::Subperformance, "P::subs");
    LibraryLoader::new(&path).save(&table).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"Step\""));
    assert!(text.contains("\"subperformance\""));
    assert!(text.contains("\"P::subs\""));
}

#[test]
fn test_format_override() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library.cfg");
    fs::write(&path, "Type:\n  base: Lib::Anything\n").unwrap();

    let loader = LibraryLoader::new(&path).with_format(LibraryFormat::Yaml);
    let table = loader.load().unwrap();
    assert_eq!(table.get(DeclKind::Type, SupertypeRole::Base), Some("Lib::Anything"));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let err = LibraryLoader::new(&path).load().unwrap_err();
    match err {
        LibraryConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library.yml");
    fs::write(&path, "Feature: [not, a, map]\n").unwrap();

    let err = LibraryLoader::new(&path).load().unwrap_err();
    assert!(matches!(err, LibraryConfigError::Yaml(_)));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let err = LibraryLoader::parse(r#"{ "Gizmo": { "base": "X" } }"#, LibraryFormat::Json)
        .unwrap_err();
    assert!(err.to_string().starts_with("JSON error"));
}

#[test]
fn test_loaded_table_drives_linking() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library.json");
    fs::write(
        &path,
        r#"{ "Class": { "base": "Objects::Object" } }"#,
    )
    .unwrap();
    let table = LibraryLoader::new(&path).load().unwrap();

    let mut b = ModelBuilder::with_library(table);
    mini_stdlib(&mut b);
    let p = b.root(DeclKind::Package, "P");
    let c = b.child(p, DeclKind::Class, "C");
    let model: Model = b.link();

    let edges = model.specializations(c, SpecializationKind::SPECIALIZATION);
    assert_eq!(edges.len(), 1);
    assert_eq!(&*model.qualified_name(edges[0].target), "Objects::Object");
    assert!(edges[0].implicit);
}
