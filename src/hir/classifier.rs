//! Classifier derivation — category bits and default supertype selection.
//!
//! The bits of a declaration are the bits its own kind contributes, OR-ed
//! with the bits of every specialization target, transitively. Results are
//! memoized in the declaration's [`TypeFacet`](super::TypeFacet). A query is
//! a single depth-first pass that closes strongly connected components as it
//! leaves them: a nested request for a declaration still in progress yields
//! empty bits, and when the head of a cycle finishes, every member of the
//! cycle is cached with the head's bits.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tracing::trace;

use super::decl::DeclKind;
use super::ids::DeclId;
use super::library::SupertypeRole;
use super::model::Model;
use super::specialization::SpecializationKind;

bitflags! {
    /// Membership in the built-in category roots.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ClassifierBits: u16 {
        const TYPE = 1 << 0;
        const CLASSIFIER = 1 << 1;
        const DATA_TYPE = 1 << 2;
        const CLASS = 1 << 3;
        const STRUCTURE = 1 << 4;
        const BEHAVIOR = 1 << 5;
        const FUNCTION = 1 << 6;
        const ASSOCIATION = 1 << 7;
    }
}

impl ClassifierBits {
    /// Bits contributed by a kind on its own, before walking supertypes.
    pub fn of_kind(kind: DeclKind) -> Self {
        let classifier = Self::TYPE | Self::CLASSIFIER;
        match kind {
            DeclKind::Type => Self::TYPE,
            DeclKind::Classifier => classifier,
            DeclKind::DataType => classifier | Self::DATA_TYPE,
            DeclKind::Class => classifier | Self::CLASS,
            DeclKind::Structure => classifier | Self::CLASS | Self::STRUCTURE,
            DeclKind::Behavior => classifier | Self::CLASS | Self::BEHAVIOR,
            DeclKind::Function => classifier | Self::CLASS | Self::BEHAVIOR | Self::FUNCTION,
            DeclKind::Association => classifier | Self::ASSOCIATION,
            DeclKind::AssociationStructure => {
                classifier | Self::ASSOCIATION | Self::CLASS | Self::STRUCTURE
            }
            DeclKind::Element
            | DeclKind::Namespace
            | DeclKind::Package
            | DeclKind::LibraryPackage
            | DeclKind::Feature
            | DeclKind::Step
            | DeclKind::Expression
            | DeclKind::Connector => Self::empty(),
        }
    }
}

/// Memo state of a declaration's classifier bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassifierState {
    #[default]
    Unknown,
    InProgress,
    Done(ClassifierBits),
}

/// Compute (or fetch) the classifier bits of `decl`.
pub(crate) fn classifier_bits(model: &Model, decl: DeclId) -> ClassifierBits {
    Derivation {
        model,
        index: FxHashMap::default(),
        stack: Vec::new(),
    }
    .visit(decl)
    .0
}

/// One depth-first pass over the specialization graph, grouping cycles into
/// strongly connected components as it goes.
struct Derivation<'m> {
    model: &'m Model,
    /// Visit order of every declaration entered during this pass.
    index: FxHashMap<DeclId, usize>,
    /// Entered declarations whose component is not closed yet.
    stack: Vec<DeclId>,
}

impl Derivation<'_> {
    /// Returns the bits gathered below `decl` and, while its component is
    /// still open, the lowest visit index it reaches.
    fn visit(&mut self, decl: DeclId) -> (ClassifierBits, Option<usize>) {
        let model = self.model;
        let declaration = &model[decl];
        let Some(ty) = declaration.as_type() else {
            return (ClassifierBits::of_kind(declaration.kind()), None);
        };

        match ty.classifier.get() {
            ClassifierState::Done(bits) => return (bits, None),
            ClassifierState::InProgress => {
                trace!(decl = %decl, "classifier re-entered, returning partial result");
                return (ClassifierBits::empty(), self.index.get(&decl).copied());
            }
            ClassifierState::Unknown => {}
        }

        let own_index = self.index.len();
        self.index.insert(decl, own_index);
        self.stack.push(decl);
        ty.classifier.set(ClassifierState::InProgress);

        let mut bits = ClassifierBits::of_kind(declaration.kind());
        let mut low = own_index;
        for edge in ty.specializations.query(SpecializationKind::SPECIALIZATION).iter() {
            let (target_bits, reached) = self.visit(edge.target);
            bits |= target_bits;
            if let Some(reached) = reached {
                low = low.min(reached);
            }
        }

        if low < own_index {
            return (bits, Some(low));
        }

        // `decl` heads its component; every member shares the head's bits.
        while let Some(member) = self.stack.pop() {
            if let Some(member_ty) = model[member].as_type() {
                member_ty.classifier.set(ClassifierState::Done(bits));
            }
            if member == decl {
                break;
            }
        }
        (bits, None)
    }
}

/// Returns true if `decl` has an explicit supertype of its general kind.
///
/// Conjugation counts for every kind; feature typing does not.
pub(crate) fn has_explicit_supertype(model: &Model, decl: DeclId) -> bool {
    let declaration = &model[decl];
    let Some(ty) = declaration.as_type() else {
        return false;
    };
    ty.specializations
        .has_explicit(declaration.kind().general_specialization())
        || ty.specializations.has_explicit(SpecializationKind::CONJUGATION)
}

/// Select the default supertype role for a declaration without an explicit
/// supertype. `None` for declarations that take no implicit supertype.
pub(crate) fn default_role(model: &Model, decl: DeclId) -> Option<SupertypeRole> {
    let declaration = &model[decl];
    let kind = declaration.kind();
    declaration.as_type()?;

    if let Some(relationship) = declaration.as_relationship() {
        return Some(if relationship.is_binary() {
            SupertypeRole::Binary
        } else {
            SupertypeRole::Base
        });
    }

    let Some(feature) = declaration.as_feature() else {
        return Some(SupertypeRole::Base);
    };

    let owner_bits = declaration
        .owner()
        .map(|owner| classifier_bits(model, owner))
        .unwrap_or_default();
    let composite = feature.is_composite();

    match kind {
        DeclKind::Step => {
            let owner_performs = declaration
                .owner()
                .is_some_and(|owner| model[owner].kind().is_performance())
                || owner_bits.contains(ClassifierBits::BEHAVIOR);
            Some(if composite && owner_performs {
                SupertypeRole::Subperformance
            } else {
                SupertypeRole::Base
            })
        }
        DeclKind::Expression => Some(SupertypeRole::Base),
        _ => {
            let bits = classifier_bits(model, decl);
            let role = if bits.contains(ClassifierBits::STRUCTURE) {
                if composite && owner_bits.contains(ClassifierBits::STRUCTURE) {
                    SupertypeRole::Subobject
                } else {
                    SupertypeRole::Object
                }
            } else if bits.contains(ClassifierBits::CLASS) {
                if composite && owner_bits.contains(ClassifierBits::CLASS) {
                    SupertypeRole::Suboccurrence
                } else {
                    SupertypeRole::Occurrence
                }
            } else if bits.contains(ClassifierBits::DATA_TYPE) {
                SupertypeRole::DataValue
            } else {
                SupertypeRole::Base
            };
            Some(role)
        }
    }
}

/// Returns true for end features owned by an association or connector,
/// which also specialize the participant feature.
pub(crate) fn is_participant(model: &Model, decl: DeclId) -> bool {
    let declaration = &model[decl];
    declaration.as_feature().is_some_and(|f| f.is_end())
        && declaration
            .owner()
            .is_some_and(|owner| model[owner].as_relationship().is_some())
}
