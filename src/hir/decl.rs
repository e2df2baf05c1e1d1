//! Declarations — the nodes of the containment tree.
//!
//! A [`Declaration`] is composed from capability facets instead of a class
//! hierarchy: every declaration can own members and import directives, and
//! depending on its [`DeclKind`] it additionally carries a [`TypeFacet`]
//! (specializations, classifier cache), a [`FeatureFacet`] (feature flags,
//! naming feature) and a [`RelationshipFacet`] (end features). A connector is
//! therefore a type, a feature and a relationship at once, with no
//! linearization rules involved.

use std::cell::{Cell, OnceCell};
use std::sync::Arc;

use bitflags::bitflags;
use smol_str::SmolStr;
use text_size::TextRange;
use uuid::Uuid;

use super::classifier::ClassifierState;
use super::ids::DeclId;
use super::imports::ImportDirective;
use super::specialization::{EdgeRequest, SpecializationKind, Specializations};

// ============================================================================
// KINDS
// ============================================================================

/// The structural kind of a declaration.
///
/// Covers the KerML core metaclasses the engine distinguishes; anything
/// else is modeled as a plain [`DeclKind::Element`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKind {
    Element,
    Namespace,
    Package,
    LibraryPackage,
    Type,
    Classifier,
    DataType,
    Class,
    Structure,
    Behavior,
    Function,
    Association,
    AssociationStructure,
    Feature,
    Step,
    Expression,
    Connector,
}

bitflags! {
    /// Capabilities composed into a declaration kind.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Capabilities: u8 {
        /// Owns members and import directives.
        const NAMESPACE = 1 << 0;
        /// Has a specialization store and classifier bits.
        const TYPE = 1 << 1;
        /// Classifies instances (subclassification is its general kind).
        const CLASSIFIER = 1 << 2;
        /// Is a feature (subsetting is its general kind).
        const FEATURE = 1 << 3;
        /// Relates end features.
        const RELATIONSHIP = 1 << 4;
    }
}

impl DeclKind {
    /// All kinds, in declaration order.
    pub const ALL: [DeclKind; 17] = [
        DeclKind::Element,
        DeclKind::Namespace,
        DeclKind::Package,
        DeclKind::LibraryPackage,
        DeclKind::Type,
        DeclKind::Classifier,
        DeclKind::DataType,
        DeclKind::Class,
        DeclKind::Structure,
        DeclKind::Behavior,
        DeclKind::Function,
        DeclKind::Association,
        DeclKind::AssociationStructure,
        DeclKind::Feature,
        DeclKind::Step,
        DeclKind::Expression,
        DeclKind::Connector,
    ];

    /// The capability set composed into this kind.
    pub fn capabilities(self) -> Capabilities {
        use Capabilities as C;
        match self {
            Self::Element => C::empty(),
            Self::Namespace | Self::Package | Self::LibraryPackage => C::NAMESPACE,
            Self::Type => C::NAMESPACE | C::TYPE,
            Self::Classifier
            | Self::DataType
            | Self::Class
            | Self::Structure
            | Self::Behavior
            | Self::Function => C::NAMESPACE | C::TYPE | C::CLASSIFIER,
            Self::Association | Self::AssociationStructure => {
                C::NAMESPACE | C::TYPE | C::CLASSIFIER | C::RELATIONSHIP
            }
            Self::Feature | Self::Step | Self::Expression => C::NAMESPACE | C::TYPE | C::FEATURE,
            Self::Connector => C::NAMESPACE | C::TYPE | C::FEATURE | C::RELATIONSHIP,
        }
    }

    /// Returns true if declarations of this kind carry a specialization store.
    pub fn is_type(self) -> bool {
        self.capabilities().contains(Capabilities::TYPE)
    }

    /// Returns true if this is a feature kind.
    pub fn is_feature(self) -> bool {
        self.capabilities().contains(Capabilities::FEATURE)
    }

    /// Returns true if this is a classifier kind.
    pub fn is_classifier(self) -> bool {
        self.capabilities().contains(Capabilities::CLASSIFIER)
    }

    /// Returns true if this kind relates end features.
    pub fn is_relationship(self) -> bool {
        self.capabilities().contains(Capabilities::RELATIONSHIP)
    }

    /// Returns true for behaviors and steps (kinds that enclose performances).
    pub fn is_performance(self) -> bool {
        matches!(
            self,
            Self::Behavior | Self::Function | Self::Step | Self::Expression
        )
    }

    /// The kind of edge that a plain `specializes` clause on this kind records.
    ///
    /// Explicit edges containing this kind (or a conjugation) count as
    /// "having a supertype" when implicit supertypes are selected.
    pub fn general_specialization(self) -> SpecializationKind {
        if self.is_feature() {
            SpecializationKind::SUBSETTING
        } else if self.is_classifier() {
            SpecializationKind::SUBCLASSIFICATION
        } else {
            SpecializationKind::SPECIALIZATION
        }
    }

    /// Human-readable keyword for this kind.
    pub fn display(self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::LibraryPackage => "library package",
            Self::Type => "type",
            Self::Classifier => "classifier",
            Self::DataType => "datatype",
            Self::Class => "class",
            Self::Structure => "struct",
            Self::Behavior => "behavior",
            Self::Function => "function",
            Self::Association => "assoc",
            Self::AssociationStructure => "assoc struct",
            Self::Feature => "feature",
            Self::Step => "step",
            Self::Expression => "expr",
            Self::Connector => "connector",
        }
    }
}

// ============================================================================
// VISIBILITY
// ============================================================================

/// Visibility of a member, import or specialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Returns true if a member with this visibility passes `filter`.
    pub fn is_visible_at(self, filter: MemberFilter) -> bool {
        match filter {
            MemberFilter::Owner => true,
            MemberFilter::Inherited => self != Visibility::Private,
            MemberFilter::External => self == Visibility::Public,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

/// The visibility floor of a member query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberFilter {
    /// Everything, private included: the declaration's own body or a nested child.
    Owner,
    /// Public and protected: across a specialization edge.
    Inherited,
    /// Public only: importers and references from elsewhere.
    External,
}

// ============================================================================
// FACETS
// ============================================================================

bitflags! {
    /// Modifiers of a feature declaration.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FeatureFlags: u8 {
        const COMPOSITE = 1 << 0;
        const PORTION = 1 << 1;
        const END = 1 << 2;
        const READONLY = 1 << 3;
        const DERIVED = 1 << 4;
    }
}

/// Type capability: specializations and the classifier cache.
#[derive(Debug, Default)]
pub struct TypeFacet {
    pub(crate) specializations: Specializations,
    /// Edge requests from source syntax, re-applied on relink.
    pub(crate) requests: Vec<EdgeRequest>,
    pub(crate) classifier: Cell<ClassifierState>,
    pub(crate) is_abstract: bool,
}

impl TypeFacet {
    pub fn specializations(&self) -> &Specializations {
        &self.specializations
    }

    pub fn requests(&self) -> &[EdgeRequest] {
        &self.requests
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Current memo state of the classifier bits.
    pub fn classifier_state(&self) -> ClassifierState {
        self.classifier.get()
    }
}

/// Feature capability.
#[derive(Debug, Default)]
pub struct FeatureFacet {
    pub(crate) flags: FeatureFlags,
    /// Name taken from the first redefined feature when this one is unnamed.
    pub(crate) naming: Option<SmolStr>,
}

impl FeatureFacet {
    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    pub fn is_composite(&self) -> bool {
        self.flags.contains(FeatureFlags::COMPOSITE)
    }

    pub fn is_end(&self) -> bool {
        self.flags.contains(FeatureFlags::END)
    }
}

/// Relationship capability: the end features in declaration order.
#[derive(Debug, Default)]
pub struct RelationshipFacet {
    pub(crate) ends: Vec<DeclId>,
}

impl RelationshipFacet {
    pub fn ends(&self) -> &[DeclId] {
        &self.ends
    }

    /// A relationship with exactly two ends is binary.
    pub fn is_binary(&self) -> bool {
        self.ends.len() == 2
    }
}

// ============================================================================
// DECLARATION
// ============================================================================

/// A node in the containment tree.
#[derive(Debug)]
pub struct Declaration {
    pub(crate) id: DeclId,
    pub(crate) element_id: Arc<str>,
    pub(crate) kind: DeclKind,
    pub(crate) name: Option<SmolStr>,
    pub(crate) short_name: Option<SmolStr>,
    /// Back-reference only; the arena owns every declaration.
    pub(crate) owner: Option<DeclId>,
    pub(crate) visibility: Visibility,
    pub(crate) range: Option<TextRange>,
    /// Children in declaration order.
    pub(crate) members: Vec<DeclId>,
    pub(crate) imports: Vec<ImportDirective>,
    pub(crate) qualified_name: OnceCell<Arc<str>>,
    pub(crate) ty: Option<TypeFacet>,
    pub(crate) feature: Option<FeatureFacet>,
    pub(crate) relationship: Option<RelationshipFacet>,
}

impl Declaration {
    pub(crate) fn new(id: DeclId, owner: Option<DeclId>, data: DeclarationData) -> Self {
        let caps = data.kind.capabilities();
        Self {
            id,
            element_id: Uuid::new_v4().to_string().into(),
            kind: data.kind,
            name: data.name,
            short_name: data.short_name,
            owner,
            visibility: data.visibility,
            range: data.range,
            members: Vec::new(),
            imports: Vec::new(),
            qualified_name: OnceCell::new(),
            ty: caps.contains(Capabilities::TYPE).then(|| TypeFacet {
                is_abstract: data.is_abstract,
                ..TypeFacet::default()
            }),
            feature: caps.contains(Capabilities::FEATURE).then(|| FeatureFacet {
                flags: data.flags,
                naming: None,
            }),
            relationship: caps
                .contains(Capabilities::RELATIONSHIP)
                .then(RelationshipFacet::default),
        }
    }

    pub fn id(&self) -> DeclId {
        self.id
    }

    /// Interchange identifier (UUID v4), stable for the lifetime of the declaration.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    /// The declared name.
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared name, or the naming feature's name for unnamed redefinitions.
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.feature.as_ref()?.naming.as_deref())
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn owner(&self) -> Option<DeclId> {
        self.owner
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    /// Direct children in declaration order, regardless of visibility.
    pub fn members(&self) -> &[DeclId] {
        &self.members
    }

    pub fn imports(&self) -> &[ImportDirective] {
        &self.imports
    }

    pub fn as_type(&self) -> Option<&TypeFacet> {
        self.ty.as_ref()
    }

    pub fn as_feature(&self) -> Option<&FeatureFacet> {
        self.feature.as_ref()
    }

    pub fn as_relationship(&self) -> Option<&RelationshipFacet> {
        self.relationship.as_ref()
    }
}

/// Builder for the syntactic part of a declaration.
///
/// ```
/// use syster_model::hir::{DeclKind, DeclarationData, Visibility};
///
/// let data = DeclarationData::new(DeclKind::Feature)
///     .with_name("wheels")
///     .with_visibility(Visibility::Protected)
///     .composite();
/// assert_eq!(data.name(), Some("wheels"));
/// ```
#[derive(Clone, Debug)]
pub struct DeclarationData {
    kind: DeclKind,
    name: Option<SmolStr>,
    short_name: Option<SmolStr>,
    visibility: Visibility,
    range: Option<TextRange>,
    flags: FeatureFlags,
    is_abstract: bool,
}

impl DeclarationData {
    pub fn new(kind: DeclKind) -> Self {
        Self {
            kind,
            name: None,
            short_name: None,
            visibility: Visibility::Public,
            range: None,
            flags: FeatureFlags::empty(),
            is_abstract: false,
        }
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    /// Returns true if any feature modifier was set.
    pub fn has_feature_flags(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<SmolStr>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn composite(self) -> Self {
        self.with_flags(FeatureFlags::COMPOSITE)
    }

    pub fn portion(self) -> Self {
        self.with_flags(FeatureFlags::PORTION)
    }

    pub fn end(self) -> Self {
        self.with_flags(FeatureFlags::END)
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}
