//! The model arena.
//!
//! [`Model`] owns every [`Declaration`] and hands out [`DeclId`] handles.
//! Building a model is a two-phase affair: the parsing layer adds
//! declarations, import directives and explicit edge requests, then calls
//! [`Model::link`] once. Linking binds edge requests to declarations,
//! names unnamed redefinitions and adds implicit library supertypes.
//!
//! ```
//! use syster_model::hir::{DeclKind, DeclarationData, Model, SpecializationKind};
//!
//! let mut model = Model::new();
//! let a = model.add_root(DeclarationData::new(DeclKind::Class).with_name("A"));
//! let b = model.add_root(DeclarationData::new(DeclKind::Class).with_name("B"));
//! model.specialize(b, a, SpecializationKind::SUBCLASSIFICATION)?;
//! model.link();
//!
//! let supertypes = model.specializations(b, SpecializationKind::SPECIALIZATION);
//! assert_eq!(supertypes[0].target, a);
//! # Ok::<(), syster_model::hir::ModelError>(())
//! ```

use std::ops::Index;
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::base::quote_segment;

use super::classifier::{self, ClassifierBits, ClassifierState};
use super::decl::{
    Capabilities, Declaration, DeclarationData, FeatureFlags, MemberFilter, Visibility,
};
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::error::ModelError;
use super::ids::DeclId;
use super::imports::{ImportDirective, import_target};
use super::library::{ImplicitSupertypes, SupertypeRole};
use super::scope::{Scope, ScopeMode, ScopeResolver};
use super::specialization::{EdgeRequest, Reference, Specialization, SpecializationKind};

/// Outcome of looking up a path by containment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathResolution {
    Found(DeclId),
    /// The path exists but a segment is not visible from the lookup site.
    NotVisible(DeclId),
    NotFound,
}

impl PathResolution {
    pub fn found(self) -> Option<DeclId> {
        match self {
            Self::Found(id) => Some(id),
            _ => None,
        }
    }
}

/// Arena of declarations forming one or more containment trees.
#[derive(Debug)]
pub struct Model {
    decls: Vec<Declaration>,
    roots: Vec<DeclId>,
    library: ImplicitSupertypes,
    diagnostics: DiagnosticCollector,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create a model using the KerML implicit supertype table.
    pub fn new() -> Self {
        Self::with_library(ImplicitSupertypes::kerml())
    }

    /// Create a model with its own implicit supertype table.
    pub fn with_library(library: ImplicitSupertypes) -> Self {
        Self {
            decls: Vec::new(),
            roots: Vec::new(),
            library,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn library(&self) -> &ImplicitSupertypes {
        &self.library
    }

    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Add a top-level declaration.
    pub fn add_root(&mut self, data: DeclarationData) -> DeclId {
        let id = DeclId::new(self.decls.len());
        self.decls.push(Declaration::new(id, None, data));
        self.roots.push(id);
        id
    }

    /// Add a declaration as the last member of `owner`.
    ///
    /// End features of associations and connectors are also registered as
    /// the owner's relationship ends.
    pub fn add(&mut self, owner: DeclId, data: DeclarationData) -> Result<DeclId, ModelError> {
        self.check(owner)?;
        if !data.kind().is_feature() && data.has_feature_flags() {
            return Err(ModelError::NotAFeature {
                kind: data.kind().display(),
            });
        }

        let id = DeclId::new(self.decls.len());
        let is_end = data.flags().contains(FeatureFlags::END);
        self.decls.push(Declaration::new(id, Some(owner), data));

        let owner_decl = &mut self.decls[owner.index()];
        owner_decl.members.push(id);
        if is_end {
            if let Some(relationship) = owner_decl.relationship.as_mut() {
                relationship.ends.push(id);
            }
        }
        Ok(id)
    }

    /// Record an explicit specialization of `source`, applied by [`link`](Self::link).
    pub fn specialize(
        &mut self,
        source: DeclId,
        target: impl Into<Reference>,
        kind: SpecializationKind,
    ) -> Result<(), ModelError> {
        self.request(source, EdgeRequest::new(target, kind))
    }

    /// Record an explicit edge request with full detail.
    pub fn request(&mut self, source: DeclId, request: EdgeRequest) -> Result<(), ModelError> {
        self.check(source)?;
        if let Reference::Decl(target) = request.target {
            self.check(target)?;
        }
        let decl = &mut self.decls[source.index()];
        let kind = decl.kind;
        let ty = decl
            .ty
            .as_mut()
            .ok_or_else(|| ModelError::not_a_type(source, kind))?;
        ty.requests.push(request);
        Ok(())
    }

    /// Drop the recorded edge requests of `decl`, typically before re-recording
    /// them from revised source.
    pub fn clear_requests(&mut self, decl: DeclId) -> Result<(), ModelError> {
        self.check(decl)?;
        if let Some(ty) = self.decls[decl.index()].ty.as_mut() {
            ty.requests.clear();
        }
        Ok(())
    }

    /// Append an import directive to `namespace`.
    pub fn add_import(
        &mut self,
        namespace: DeclId,
        directive: ImportDirective,
    ) -> Result<(), ModelError> {
        self.check(namespace)?;
        let decl = &mut self.decls[namespace.index()];
        if !decl.kind.capabilities().contains(Capabilities::NAMESPACE) {
            return Err(ModelError::not_a_namespace(namespace, decl.kind));
        }
        decl.imports.push(directive);
        Ok(())
    }

    /// Rename a declaration. Qualified names below it are recomputed lazily.
    pub fn set_name(&mut self, decl: DeclId, name: Option<SmolStr>) -> Result<(), ModelError> {
        self.check(decl)?;
        self.decls[decl.index()].name = name;
        self.invalidate_qualified_names(decl);
        Ok(())
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.index())
    }

    pub fn contains(&self, id: DeclId) -> bool {
        id.index() < self.decls.len()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Top-level declarations in insertion order.
    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    /// All declarations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    /// All declarations in containment pre-order.
    pub fn preorder(&self) -> Vec<DeclId> {
        let mut order = Vec::with_capacity(self.decls.len());
        let mut stack: Vec<DeclId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].members.iter().rev().copied());
        }
        order
    }

    /// Returns true if `ancestor` is `decl` or one of its owners.
    pub fn is_ancestor(&self, ancestor: DeclId, decl: DeclId) -> bool {
        let mut current = Some(decl);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self[id].owner;
        }
        false
    }

    /// Qualified name of `decl`: owner segments joined with `::`, quoted
    /// where needed. Anonymous declarations contribute no segment.
    pub fn qualified_name(&self, decl: DeclId) -> Arc<str> {
        let declaration = &self[decl];
        declaration
            .qualified_name
            .get_or_init(|| {
                let prefix = declaration.owner.map(|owner| self.qualified_name(owner));
                match (prefix, declaration.name()) {
                    (Some(prefix), Some(name)) if !prefix.is_empty() => {
                        format!("{}::{}", prefix, quote_segment(name)).into()
                    }
                    (_, Some(name)) => Arc::from(quote_segment(name).as_ref()),
                    (Some(prefix), None) => prefix,
                    (None, None) => Arc::from(""),
                }
            })
            .clone()
    }

    fn invalidate_qualified_names(&mut self, decl: DeclId) {
        let mut stack = vec![decl];
        while let Some(id) = stack.pop() {
            let declaration = &mut self.decls[id.index()];
            declaration.qualified_name.take();
            stack.extend(declaration.members.iter().copied());
        }
    }

    /// Direct members of `namespace` passing `filter`, in declaration order.
    pub fn direct_members(
        &self,
        namespace: DeclId,
        filter: MemberFilter,
    ) -> impl Iterator<Item = DeclId> + '_ {
        self[namespace]
            .members
            .iter()
            .copied()
            .filter(move |&member| self[member].visibility.is_visible_at(filter))
    }

    /// Returns true if `decl` answers to `name` (declared, naming or short name).
    pub fn has_name(&self, decl: DeclId, name: &str) -> bool {
        let declaration = &self[decl];
        declaration.name() == Some(name) || declaration.short_name() == Some(name)
    }

    /// Declarations visible without qualification anywhere: named roots and
    /// members of anonymous roots, in insertion order.
    pub fn global_members(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.roots.iter().flat_map(move |&root| {
            let declaration = &self[root];
            if declaration.name().is_some() {
                vec![root]
            } else {
                declaration.members.clone()
            }
        })
    }

    /// Look up `path` by containment.
    ///
    /// The first segment is searched among the owner-level members of `from`
    /// and each enclosing declaration, then among global names. Later
    /// segments must be public members, unless the namespace encloses `from`.
    pub fn resolve_path<S: AsRef<str>>(&self, from: Option<DeclId>, path: &[S]) -> PathResolution {
        let Some((first, rest)) = path.split_first() else {
            return PathResolution::NotFound;
        };

        let Some(mut current) = self.lookup_lexical(from, first.as_ref()) else {
            return PathResolution::NotFound;
        };

        for segment in rest {
            let segment = segment.as_ref();
            let Some(member) = self[current]
                .members
                .iter()
                .copied()
                .find(|&m| self.has_name(m, segment))
            else {
                return PathResolution::NotFound;
            };

            let visible = self[member].visibility == Visibility::Public
                || from.is_some_and(|from| self.is_ancestor(current, from));
            if !visible {
                return PathResolution::NotVisible(member);
            }
            current = member;
        }
        PathResolution::Found(current)
    }

    fn lookup_lexical(&self, from: Option<DeclId>, name: &str) -> Option<DeclId> {
        let mut scope = from;
        while let Some(ns) = scope {
            if let Some(found) = self[ns].members.iter().copied().find(|&m| self.has_name(m, name)) {
                return Some(found);
            }
            scope = self[ns].owner;
        }
        self.global_members().find(|&m| self.has_name(m, name))
    }

    /// Parse and look up a qualified path from the global namespace.
    pub fn find(&self, path: &str) -> Option<DeclId> {
        let segments = crate::base::split_qualified(path)?;
        self.resolve_path::<SmolStr>(None, &segments).found()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    // A handle this model never issued yields an empty result, as with `get`.

    /// Specialization edges of `decl` whose kind contains `mask`, in edge
    /// insertion order. Empty for declarations that are not types.
    pub fn specializations(&self, decl: DeclId, mask: SpecializationKind) -> Arc<[Specialization]> {
        match self.get(decl).and_then(|d| d.ty.as_ref()) {
            Some(ty) => ty.specializations.query(mask),
            None => Arc::from([]),
        }
    }

    /// Category membership of `decl`, memoized until the next reset.
    pub fn classifier_bits(&self, decl: DeclId) -> ClassifierBits {
        if !self.contains(decl) {
            return ClassifierBits::empty();
        }
        classifier::classifier_bits(self, decl)
    }

    /// Names visible from `decl` under `mode`.
    pub fn scope(&self, decl: DeclId, mode: ScopeMode) -> Scope {
        ScopeResolver::new(self, mode).resolve(decl)
    }

    /// Diagnostics produced by the last link (and relinks since).
    pub fn link_diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    // ========================================================================
    // LINKING
    // ========================================================================

    /// Bind every edge request, name unnamed redefinitions, add implicit
    /// supertypes in containment pre-order and validate import targets.
    ///
    /// Derived state from a previous link is discarded first.
    pub fn link(&mut self) {
        self.diagnostics.clear();
        for declaration in &mut self.decls {
            clear_derived(declaration);
            declaration.qualified_name.take();
        }

        let order = self.preorder();
        for &id in &order {
            self.apply_requests(id);
        }
        self.assign_naming_features(&order);
        for &id in &order {
            self.bootstrap(id);
        }
        for &id in &order {
            self.check_imports(id);
        }

        // Bits computed during bootstrap may predate later implicit edges.
        for declaration in &self.decls {
            if let Some(ty) = &declaration.ty {
                ty.classifier.set(ClassifierState::Unknown);
            }
        }

        debug!(
            declarations = self.decls.len(),
            diagnostics = self.diagnostics.diagnostics().len(),
            "model linked"
        );
    }

    /// Clear derived state of `decl`: its specialization store, classifier
    /// cache, naming feature, qualified names and link diagnostics. Identity,
    /// members, imports and edge requests are kept.
    pub fn reset(&mut self, decl: DeclId) -> Result<(), ModelError> {
        self.check(decl)?;
        clear_derived(&mut self.decls[decl.index()]);
        self.invalidate_qualified_names(decl);
        self.diagnostics.remove_for(decl);
        trace!(decl = %decl, "reset");
        Ok(())
    }

    /// Re-derive a single declaration after [`reset`](Self::reset).
    pub fn relink(&mut self, decl: DeclId) -> Result<(), ModelError> {
        self.check(decl)?;
        self.apply_requests(decl);
        self.assign_naming_features(&[decl]);
        self.bootstrap(decl);
        self.check_imports(decl);
        if let Some(ty) = &self[decl].ty {
            ty.classifier.set(ClassifierState::Unknown);
        }
        Ok(())
    }

    fn apply_requests(&mut self, id: DeclId) {
        let Some(ty) = self[id].ty.as_ref() else {
            return;
        };

        let lookup_from = self[id].owner;
        let bound: Vec<(EdgeRequest, Option<DeclId>)> = ty
            .requests
            .iter()
            .map(|request| {
                let target = match &request.target {
                    Reference::Decl(target) => Some(*target),
                    Reference::Path(path) => self.resolve_path(lookup_from, path.as_slice()).found(),
                };
                (request.clone(), target)
            })
            .collect();

        for (request, target) in bound {
            match target {
                Some(target) => {
                    if let Some(ty) = self.decls[id.index()].ty.as_mut() {
                        ty.specializations
                            .add(target, request.kind, false, request.visibility);
                        ty.classifier.set(ClassifierState::Unknown);
                    }
                }
                None => {
                    let text = match &request.target {
                        Reference::Path(path) => {
                            crate::base::join_segments(path.iter().map(SmolStr::as_str))
                        }
                        Reference::Decl(target) => target.to_string(),
                    };
                    warn!(decl = %id, target = %text, "unresolved {}", request.kind.keyword());
                    let range = request.range.or(self[id].range);
                    self.diagnostics.unresolved_reference(id, range, &text);
                }
            }
        }
    }

    /// Unnamed features take the effective name of their first redefined
    /// feature. Repeats until stable so chains of unnamed redefinitions work.
    fn assign_naming_features(&mut self, ids: &[DeclId]) {
        loop {
            let mut changed = false;
            for &id in ids {
                let declaration = &self[id];
                let Some(feature) = &declaration.feature else {
                    continue;
                };
                if declaration.name.is_some() || feature.naming.is_some() {
                    continue;
                }
                let naming = self
                    .specializations(id, SpecializationKind::REDEFINITION)
                    .first()
                    .and_then(|edge| self[edge.target].name().map(SmolStr::from));
                if let Some(name) = naming {
                    if let Some(feature) = self.decls[id.index()].feature.as_mut() {
                        feature.naming = Some(name);
                    }
                    self.invalidate_qualified_names(id);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Add implicit library supertypes to `id`.
    fn bootstrap(&mut self, id: DeclId) {
        let kind = self[id].kind;
        if self[id].ty.is_none() {
            return;
        }

        let mut roles = Vec::with_capacity(2);
        if !classifier::has_explicit_supertype(self, id) {
            roles.extend(classifier::default_role(self, id));
        }
        if classifier::is_participant(self, id) {
            roles.push(SupertypeRole::Participant);
        }

        for role in roles {
            let Some(path) = self.library.path_for(kind, role).map(SmolStr::from) else {
                continue;
            };
            match self.find(&path) {
                Some(target) if target == id => {
                    trace!(decl = %id, path = %path, "library declaration is its own default");
                }
                Some(target) => {
                    let edge_kind = kind.general_specialization();
                    if let Some(ty) = self.decls[id.index()].ty.as_mut() {
                        ty.specializations.add(target, edge_kind, true, Visibility::Public);
                        ty.classifier.set(ClassifierState::Unknown);
                    }
                    trace!(decl = %id, path = %path, "implicit supertype added");
                }
                None => {
                    warn!(decl = %id, path = %path, "implicit supertype not found");
                    let range = self[id].range;
                    self.diagnostics.missing_implicit_supertype(id, range, &path);
                }
            }
        }
    }

    fn check_imports(&mut self, id: DeclId) {
        let problems: Vec<Diagnostic> = self[id]
            .imports
            .iter()
            .filter_map(|directive| {
                if import_target(self, id, directive).is_some() {
                    return None;
                }
                let range = directive.range().or(self[id].range);
                let text = directive.to_string();
                let diagnostic = match self.resolve_path(Some(id), directive.path()) {
                    PathResolution::NotVisible(hidden) => {
                        Diagnostic::invalid_import(id, range, &text, &self.qualified_name(hidden))
                    }
                    _ => Diagnostic::unresolved_import(id, range, &text),
                };
                Some(diagnostic)
            })
            .collect();

        for diagnostic in problems {
            warn!(decl = %id, message = %diagnostic.message, "import problem");
            self.diagnostics.add(diagnostic);
        }
    }

    fn check(&self, id: DeclId) -> Result<(), ModelError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(ModelError::UnknownDeclaration(id))
        }
    }
}

fn clear_derived(declaration: &mut Declaration) {
    if let Some(ty) = declaration.ty.as_mut() {
        ty.specializations.clear();
        ty.classifier.set(ClassifierState::Unknown);
    }
    if let Some(feature) = declaration.feature.as_mut() {
        feature.naming = None;
    }
}

impl Index<DeclId> for Model {
    type Output = Declaration;

    fn index(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }
}
