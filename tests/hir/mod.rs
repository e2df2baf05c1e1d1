//! HIR layer tests
//!
//! Tests for the semantic model engine:
//! - Specialization store and edge requests
//! - Classifier bits and implicit supertypes
//! - Import resolution
//! - Scope resolution and redefinition hiding
//! - Cycle handling
//! - Reset and relink
//! - Name resolution
//! - Semantic diagnostics

pub mod tests_diagnostics;
pub mod tests_redefinition;
