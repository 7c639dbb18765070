//! Mutable engine state; cloned wholesale to explore a fork.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::model::{ComponentDeclaration, DeclarationId, DeclarationOrigin, TypeRef};
use crate::oracle::TypeOracle;
use crate::plan::DependencyEdge;

use super::frame::{ComponentFrame, ResolutionFrame};

/// A committed component, before interceptors and proxy targets are bound.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedNode {
    pub declaration: Arc<ComponentDeclaration>,
    pub dependencies: Vec<DependencyEdge>,
}

impl ResolvedNode {
    pub fn is_proxy(&self) -> bool {
        is_proxy(&self.declaration)
    }
}

/// Synthetic cycle proxies are only reachable through the cycle that created them.
pub(crate) fn is_proxy(declaration: &ComponentDeclaration) -> bool {
    matches!(declaration.origin, DeclarationOrigin::PromisedProxy { .. })
}

/// Everything a resolution run mutates.
///
/// Branches of a fork each work on an independent clone; declarations are
/// shared through `Arc` and never mutated, so the clone is shallow.
#[derive(Debug, Clone)]
pub(crate) struct ResolutionState {
    pub roots: Vec<Arc<ComponentDeclaration>>,
    pub catalog: Catalog,
    pub resolved: Vec<ResolvedNode>,
    resolved_index: HashMap<DeclarationId, usize>,
    /// Resolved indexes per provided type name, ascending.
    resolved_by_type: HashMap<String, Vec<usize>>,
    pub stack: Vec<ResolutionFrame>,
    /// Proxy index per (claimed type, proxied declaration).
    pub proxies: BTreeMap<(TypeRef, DeclarationId), usize>,
    pub fork_depth: usize,
}

impl ResolutionState {
    pub fn new(catalog: Catalog) -> Self {
        let roots = catalog.roots();
        Self {
            roots,
            catalog,
            resolved: Vec::new(),
            resolved_index: HashMap::new(),
            resolved_by_type: HashMap::new(),
            stack: Vec::new(),
            proxies: BTreeMap::new(),
            fork_depth: 0,
        }
    }

    pub fn index_of(&self, id: DeclarationId) -> Option<usize> {
        self.resolved_index.get(&id).copied()
    }

    pub fn is_resolved(&self, id: DeclarationId) -> bool {
        self.resolved_index.contains_key(&id)
    }

    /// Resolved components that may satisfy a claim on a type named `name`,
    /// in index order.
    pub fn resolved_providing(&self, name: &str) -> impl Iterator<Item = (usize, &ResolvedNode)> {
        self.resolved_by_type
            .get(name)
            .into_iter()
            .flatten()
            .map(|&index| (index, &self.resolved[index]))
    }

    pub fn is_on_stack(&self, id: DeclarationId) -> bool {
        self.stack.iter().any(|frame| match frame {
            ResolutionFrame::Component(f) => f.declaration.id == id,
            ResolutionFrame::Root(_) => false,
        })
    }

    /// Append a resolved component; its index is the current length.
    pub fn commit(&mut self, declaration: Arc<ComponentDeclaration>, dependencies: Vec<DependencyEdge>) -> usize {
        let index = self.resolved.len();
        self.resolved_index.insert(declaration.id, index);
        for name in self.catalog.provided_names(declaration.id) {
            self.resolved_by_type.entry(name.clone()).or_default().push(index);
        }
        self.resolved.push(ResolvedNode {
            declaration,
            dependencies,
        });
        index
    }

    /// Push a frame for `declaration`, then frames for the not yet resolved
    /// interceptors of its type so they resolve first.
    pub fn push_component(&mut self, declaration: Arc<ComponentDeclaration>, oracle: &dyn TypeOracle) {
        let interceptors: Vec<_> = self
            .catalog
            .interceptors()
            .iter()
            .filter(|i| i.id != declaration.id)
            .filter(|i| oracle.is_interceptor_for(&i.ty, &declaration.ty))
            .filter(|i| !self.is_resolved(i.id) && !self.is_on_stack(i.id))
            .cloned()
            .collect();

        self.stack.push(ResolutionFrame::Component(ComponentFrame::new(declaration)));
        for interceptor in interceptors {
            self.stack.push(ResolutionFrame::Component(ComponentFrame::new(interceptor)));
        }
    }

    /// Names of the declarations on the stack, outermost first.
    pub fn chain(&self) -> Vec<String> {
        self.stack
            .iter()
            .filter_map(|frame| match frame {
                ResolutionFrame::Component(f) => Some(f.declaration.to_string()),
                ResolutionFrame::Root(_) => None,
            })
            .collect()
    }
}
