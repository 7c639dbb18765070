//! Explicit continuation state of the resolution loop.

use std::sync::Arc;

use crate::model::{ComponentDeclaration, DependencyClaim};
use crate::plan::DependencyEdge;

/// One entry of the resolution stack.
#[derive(Debug, Clone)]
pub(crate) enum ResolutionFrame {
    /// Index into the root set; expands into a component frame unless resolved.
    Root(usize),
    /// A declaration whose claims are being resolved.
    Component(ComponentFrame),
}

/// A partially resolved declaration.
#[derive(Debug, Clone)]
pub(crate) struct ComponentFrame {
    pub declaration: Arc<ComponentDeclaration>,
    /// Edges of the claims before `cursor`, in claim order.
    pub edges: Vec<DependencyEdge>,
    /// Index of the next claim to resolve.
    pub cursor: usize,
}

impl ComponentFrame {
    pub fn new(declaration: Arc<ComponentDeclaration>) -> Self {
        let capacity = declaration.claims.len();
        Self {
            declaration,
            edges: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// The claim at the cursor, `None` once every claim is resolved.
    pub fn current_claim(&self) -> Option<&DependencyClaim> {
        self.declaration.claims.get(self.cursor)
    }

    /// Record the edge of the current claim and move on.
    pub fn resolve_current(&mut self, edge: DependencyEdge) {
        self.edges.push(edge);
        self.cursor += 1;
    }
}
