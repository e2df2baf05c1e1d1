//! Scope resolution — the ordered set of names visible from a declaration.
//!
//! The scope of `D` is assembled in a fixed order:
//!
//! 1. `D`'s own members (all of them in local mode, public ones in external mode)
//! 2. everything `D`'s import directives bring in, directive by directive
//! 3. in local mode, `D`'s own name when `D` is a type
//! 4. inherited members, walking specialization edges depth-first in edge
//!    order; each explicit supertype's name precedes its members in local mode
//!
//! Redefined features are then removed, and the result is deduplicated by
//! declaration identity keeping the first occurrence. Tooling depends on
//! this order, so it is part of the contract.

use std::collections::VecDeque;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use super::decl::{MemberFilter, Visibility};
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::ids::DeclId;
use super::imports::resolve_imports;
use super::model::Model;
use super::specialization::SpecializationKind;

/// Visibility floor of a scope query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeMode {
    /// What code written inside the declaration can see: its private
    /// members and protected members across specialization edges.
    Local,
    /// What importers and references from elsewhere can see: public only.
    External,
}

impl ScopeMode {
    fn own_filter(self) -> MemberFilter {
        match self {
            Self::Local => MemberFilter::Owner,
            Self::External => MemberFilter::External,
        }
    }

    fn inherited_filter(self) -> MemberFilter {
        match self {
            Self::Local => MemberFilter::Inherited,
            Self::External => MemberFilter::External,
        }
    }

    /// Whether an edge with `visibility` at `depth` hops from the queried
    /// declaration is followed.
    fn follows(self, visibility: Visibility, depth: usize) -> bool {
        match (self, depth) {
            (Self::Local, 0) => true,
            (Self::Local, _) => visibility != Visibility::Private,
            (Self::External, _) => visibility == Visibility::Public,
        }
    }
}

/// Where a scope entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeOrigin {
    /// A member of the declaration itself, or its own name.
    Own,
    /// Brought in by an import directive.
    Import,
    /// A supertype or a member of one.
    Inherited,
}

/// A visible name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeEntry {
    /// Name the declaration is visible under (an import alias, if any).
    pub name: SmolStr,
    /// Short name of the declaration, unless it is visible under an alias.
    pub short_name: Option<SmolStr>,
    pub qualified_name: Arc<str>,
    pub decl: DeclId,
    pub origin: ScopeOrigin,
}

/// Result of a scope query.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    entries: Vec<ScopeEntry>,
    diagnostics: Vec<Diagnostic>,
}

impl Scope {
    /// Entries in scope order.
    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Qualified names in scope order.
    pub fn qualified_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| &*e.qualified_name).collect()
    }

    /// Declarations in scope order.
    pub fn decls(&self) -> Vec<DeclId> {
        self.entries.iter().map(|e| e.decl).collect()
    }

    pub fn contains(&self, decl: DeclId) -> bool {
        self.entries.iter().any(|e| e.decl == decl)
    }

    /// Entries visible under `name` or short name `name`, in scope order.
    pub fn lookup<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s ScopeEntry> + 's {
        self.entries
            .iter()
            .filter(move |e| e.name == name || e.short_name.as_deref() == Some(name))
    }

    /// Problems found while computing the scope (ambiguous redefinitions).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// A redefinition reachable from the queried declaration.
#[derive(Clone, Copy, Debug)]
struct Redefinition {
    /// Fewest specialization hops between the queried declaration and the
    /// redefiner's owner.
    distance: usize,
    redefiner: DeclId,
    redefined: DeclId,
}

/// Computes [`Scope`]s over a linked model.
pub struct ScopeResolver<'m> {
    model: &'m Model,
    mode: ScopeMode,
    entries: IndexMap<DeclId, ScopeEntry, FxBuildHasher>,
    redefinitions: Vec<Redefinition>,
    /// Types whose supertypes have been walked in this computation.
    visited: FxHashSet<DeclId>,
    /// Supertypes in traversal order, with the depth they were first reached at.
    reached: Vec<(DeclId, usize)>,
}

impl<'m> ScopeResolver<'m> {
    pub fn new(model: &'m Model, mode: ScopeMode) -> Self {
        Self {
            model,
            mode,
            entries: IndexMap::default(),
            redefinitions: Vec::new(),
            visited: FxHashSet::default(),
            reached: Vec::new(),
        }
    }

    /// Compute the scope of `decl`.
    pub fn resolve(mut self, decl: DeclId) -> Scope {
        let model = self.model;
        if !model.contains(decl) {
            return Scope::default();
        }
        trace!(decl = %decl, mode = ?self.mode, "computing scope");

        // 1. own members
        for member in model.direct_members(decl, self.mode.own_filter()) {
            self.push(member, None, ScopeOrigin::Own);
        }
        self.collect_redefinitions_of(decl, 0);
        self.collect_redefinitions(decl, 0);

        // 2. imports
        for imported in resolve_imports(model, decl) {
            self.push(imported.decl, imported.alias, ScopeOrigin::Import);
        }

        // 3 + 4. self name and inherited members
        if model[decl].as_type().is_some() {
            if self.mode == ScopeMode::Local {
                self.push(decl, None, ScopeOrigin::Own);
            }
            self.visited.insert(decl);
            self.inherit(decl, 0);

            let distances = self.distances(decl);
            for (target, depth) in std::mem::take(&mut self.reached) {
                let distance = distances.get(&target).copied().unwrap_or(depth);
                self.collect_redefinitions(target, distance);
            }
        }

        let diagnostics = self.hide_redefined();

        Scope {
            entries: self.entries.into_values().collect(),
            diagnostics,
        }
    }

    fn inherit(&mut self, ty: DeclId, depth: usize) {
        let model = self.model;
        let edges = model.specializations(ty, SpecializationKind::SPECIALIZATION);
        for edge in edges.iter() {
            if edge.kind.is_redefinition() || !self.mode.follows(edge.visibility, depth) {
                continue;
            }
            if !self.visited.insert(edge.target) {
                trace!(from = %ty, target = %edge.target, "specialization cycle, not re-expanding");
                continue;
            }

            if self.mode == ScopeMode::Local && !edge.implicit {
                self.push(edge.target, None, ScopeOrigin::Inherited);
            }
            for member in model.direct_members(edge.target, self.mode.inherited_filter()) {
                self.push(member, None, ScopeOrigin::Inherited);
            }
            self.reached.push((edge.target, depth + 1));

            self.inherit(edge.target, depth + 1);
        }
    }

    /// Shortest specialization distance from `decl` to each supertype,
    /// following the same edges as [`Self::inherit`].
    fn distances(&self, decl: DeclId) -> FxHashMap<DeclId, usize> {
        let model = self.model;
        let mut distances = FxHashMap::default();
        distances.insert(decl, 0);
        let mut queue = VecDeque::from([decl]);
        while let Some(ty) = queue.pop_front() {
            let depth = distances[&ty];
            let edges = model.specializations(ty, SpecializationKind::SPECIALIZATION);
            for edge in edges.iter() {
                if edge.kind.is_redefinition() || !self.mode.follows(edge.visibility, depth) {
                    continue;
                }
                if let Entry::Vacant(slot) = distances.entry(edge.target) {
                    slot.insert(depth + 1);
                    queue.push_back(edge.target);
                }
            }
        }
        distances
    }

    /// Record redefinitions made by the members of `owner`.
    fn collect_redefinitions(&mut self, owner: DeclId, distance: usize) {
        let model = self.model;
        for &member in model[owner].members() {
            self.collect_redefinitions_of(member, distance);
        }
    }

    /// Record redefinitions made by `feature` itself.
    fn collect_redefinitions_of(&mut self, feature: DeclId, distance: usize) {
        let edges = self
            .model
            .specializations(feature, SpecializationKind::REDEFINITION);
        self.redefinitions
            .extend(edges.iter().map(|edge| Redefinition {
                distance,
                redefiner: feature,
                redefined: edge.target,
            }));
    }

    fn push(&mut self, decl: DeclId, alias: Option<SmolStr>, origin: ScopeOrigin) {
        if self.entries.contains_key(&decl) {
            return;
        }
        let model = self.model;
        let short_name = match alias {
            Some(_) => None,
            None => model[decl].short_name().map(SmolStr::from),
        };
        let declaration = &model[decl];
        let Some(name) = alias.or_else(|| {
            declaration
                .name()
                .or(declaration.short_name())
                .map(SmolStr::from)
        }) else {
            return;
        };
        self.entries.insert(
            decl,
            ScopeEntry {
                name,
                short_name,
                qualified_name: model.qualified_name(decl),
                decl,
                origin,
            },
        );
    }

    /// Remove redefined features. Two different redefiners of the same
    /// feature at the same distance are ambiguous: the feature stays visible
    /// and every redefiner after the first is reported.
    fn hide_redefined(&mut self) -> Vec<Diagnostic> {
        let model = self.model;
        let mut groups: IndexMap<(usize, DeclId), Vec<DeclId>, FxBuildHasher> = IndexMap::default();
        for redefinition in &self.redefinitions {
            let redefiners = groups
                .entry((redefinition.distance, redefinition.redefined))
                .or_default();
            if !redefiners.contains(&redefinition.redefiner) {
                redefiners.push(redefinition.redefiner);
            }
        }

        let mut hidden = FxHashSet::default();
        let mut collector = DiagnosticCollector::new();
        for (&(_, redefined), redefiners) in &groups {
            let [first, rest @ ..] = redefiners.as_slice() else {
                continue;
            };
            if rest.is_empty() {
                hidden.insert(redefined);
                continue;
            }

            let redefined_name = model.qualified_name(redefined);
            let first_name = model.qualified_name(*first);
            for &other in rest {
                trace!(redefined = %redefined, redefiner = %other, "ambiguous redefinition");
                collector.ambiguous_redefinition(
                    (other, model[other].range()),
                    &redefined_name,
                    (*first, model[*first].range(), &first_name),
                );
            }
        }

        for redefined in hidden {
            self.entries.shift_remove(&redefined);
        }
        collector.take()
    }
}
