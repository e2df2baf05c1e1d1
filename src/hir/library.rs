//! Implicit supertype table.
//!
//! Maps a declaration kind and a [`SupertypeRole`] to the qualified path of
//! the standard-library declaration that such a declaration implicitly
//! specializes. The table is plain data owned by each [`Model`](super::Model),
//! so independent models can use different libraries side by side.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::decl::DeclKind;

/// Which default supertype a declaration takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "camelCase"))]
pub enum SupertypeRole {
    /// Generic default for the kind.
    Base,
    /// Associations and connectors with exactly two ends.
    Binary,
    /// Features typed by a data type.
    DataValue,
    /// Features typed by a class.
    Occurrence,
    /// Composite features of a class, owned by a class or class-typed feature.
    Suboccurrence,
    /// Features typed by a structure.
    Object,
    /// Composite features of a structure, owned by a structure or structure-typed feature.
    Subobject,
    /// End features of associations and connectors.
    Participant,
    /// Composite steps owned by a behavior or step.
    Subperformance,
}

/// Decision table from `(kind, role)` to a library path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct ImplicitSupertypes {
    table: IndexMap<DeclKind, IndexMap<SupertypeRole, SmolStr>>,
}

impl ImplicitSupertypes {
    /// A table without entries: no declaration receives an implicit supertype.
    pub fn empty() -> Self {
        Self {
            table: IndexMap::new(),
        }
    }

    /// The KerML standard-library defaults.
    pub fn kerml() -> Self {
        use DeclKind as K;
        use SupertypeRole as R;

        Self::empty()
            .with(K::Type, R::Base, "Base::Anything")
            .with(K::Classifier, R::Base, "Base::Anything")
            .with(K::DataType, R::Base, "Base::DataValue")
            .with(K::Class, R::Base, "Occurrences::Occurrence")
            .with(K::Structure, R::Base, "Objects::Object")
            .with(K::Behavior, R::Base, "Performances::Performance")
            .with(K::Function, R::Base, "Performances::Evaluation")
            .with(K::Association, R::Base, "Links::Link")
            .with(K::Association, R::Binary, "Links::BinaryLink")
            .with(K::AssociationStructure, R::Base, "Objects::ObjectLink")
            .with(K::AssociationStructure, R::Binary, "Objects::BinaryLinkObject")
            .with(K::Feature, R::Base, "Base::things")
            .with(K::Feature, R::DataValue, "Base::dataValues")
            .with(K::Feature, R::Occurrence, "Occurrences::occurrences")
            .with(K::Feature, R::Suboccurrence, "Occurrences::Occurrence::suboccurrences")
            .with(K::Feature, R::Object, "Objects::objects")
            .with(K::Feature, R::Subobject, "Objects::Object::subobjects")
            .with(K::Feature, R::Participant, "Links::Link::participant")
            .with(K::Step, R::Base, "Performances::performances")
            .with(K::Step, R::Subperformance, "Performances::Performance::subperformances")
            .with(K::Expression, R::Base, "Performances::evaluations")
            .with(K::Connector, R::Base, "Links::links")
            .with(K::Connector, R::Binary, "Links::binaryLinks")
    }

    /// Set (or override) the path for `(kind, role)`.
    pub fn with(mut self, kind: DeclKind, role: SupertypeRole, path: impl Into<SmolStr>) -> Self {
        self.insert(kind, role, path);
        self
    }

    /// Remove the entry for `(kind, role)`.
    pub fn without(mut self, kind: DeclKind, role: SupertypeRole) -> Self {
        self.remove(kind, role);
        self
    }

    pub fn insert(&mut self, kind: DeclKind, role: SupertypeRole, path: impl Into<SmolStr>) {
        self.table.entry(kind).or_default().insert(role, path.into());
    }

    pub fn remove(&mut self, kind: DeclKind, role: SupertypeRole) -> Option<SmolStr> {
        let roles = self.table.get_mut(&kind)?;
        let removed = roles.shift_remove(&role);
        if roles.is_empty() {
            self.table.shift_remove(&kind);
        }
        removed
    }

    /// The exact entry for `(kind, role)`.
    pub fn get(&self, kind: DeclKind, role: SupertypeRole) -> Option<&str> {
        self.table.get(&kind)?.get(&role).map(SmolStr::as_str)
    }

    /// The path for `(kind, role)`, falling back to the kind's base entry.
    ///
    /// The participant role falls back to the feature entry instead, since
    /// connector and step ends are features too.
    pub fn path_for(&self, kind: DeclKind, role: SupertypeRole) -> Option<&str> {
        match (self.get(kind, role), role) {
            (Some(path), _) => Some(path),
            (None, SupertypeRole::Participant) => self.get(DeclKind::Feature, role),
            (None, _) => self.get(kind, SupertypeRole::Base),
        }
    }

    pub fn len(&self) -> usize {
        self.table.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// All entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclKind, SupertypeRole, &str)> {
        self.table.iter().flat_map(|(&kind, roles)| {
            roles
                .iter()
                .map(move |(&role, path)| (kind, role, path.as_str()))
        })
    }
}

impl Default for ImplicitSupertypes {
    fn default() -> Self {
        Self::kerml()
    }
}
