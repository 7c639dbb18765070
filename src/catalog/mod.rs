//! Per-round declaration store.
//!
//! A [`Catalog`] assigns identities to [`DeclarationDraft`]s and keeps the
//! registered declarations in three insertion-ordered lists:
//!
//! - **sources**: every directly usable declaration
//! - **interceptors**: the subset of sources whose type intercepts another type
//! - **templates**: declarations that still carry type parameters
//!
//! Sources are also indexed by every type name they can be injected as (see
//! [`TypeOracle::provided_type_names`]), so a lookup only visits declarations
//! that could possibly fit.
//!
//! Declarations are shared through [`Arc`], so cloning a catalog for a
//! resolution fork copies pointers, never declarations.
//!
//! [`manifest`] loads catalogs from TOML files and supplies them round by
//! round through [`ManifestSource`].

pub mod manifest;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::model::{ComponentDeclaration, DeclarationDraft, DeclarationId};
use crate::oracle::TypeOracle;

pub use manifest::{CatalogManifest, ComponentSpec, ExtensionSpec, ManifestExtension, ManifestSource};

/// Declarations discovered for one processing round.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub declarations: Vec<DeclarationDraft>,
}

impl Discovery {
    pub fn new(declarations: Vec<DeclarationDraft>) -> Self {
        Self {
            declarations,
        }
    }
}

/// Registered declarations of one resolution run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sources: Vec<Arc<ComponentDeclaration>>,
    interceptors: Vec<Arc<ComponentDeclaration>>,
    templates: Vec<Arc<ComponentDeclaration>>,
    /// Positions in `sources` per provided type name, ascending.
    by_type: HashMap<String, Vec<usize>>,
    provides: HashMap<DeclarationId, Arc<[String]>>,
    next_id: u32,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an identity to `draft` and file it under the matching lists.
    pub fn register(&mut self, draft: DeclarationDraft, oracle: &dyn TypeOracle) -> Arc<ComponentDeclaration> {
        let id = DeclarationId(self.next_id);
        self.next_id += 1;
        let declaration = Arc::new(draft.into_declaration(id));

        if declaration.is_template() {
            trace!("Registered template {} as {}", declaration, id);
            self.templates.push(Arc::clone(&declaration));
        } else {
            trace!("Registered declaration {} as {}", declaration, id);
            let names: Arc<[String]> = oracle.provided_type_names(&declaration.ty).into_iter().collect();
            for name in names.iter() {
                self.by_type.entry(name.clone()).or_default().push(self.sources.len());
            }
            self.provides.insert(id, names);
            self.sources.push(Arc::clone(&declaration));
            if oracle.intercepted_type(&declaration.ty).is_some() {
                self.interceptors.push(Arc::clone(&declaration));
            }
        }
        declaration
    }

    pub fn sources(&self) -> &[Arc<ComponentDeclaration>] {
        &self.sources
    }

    /// Sources that may satisfy a claim on a type named `name`, in
    /// registration order.
    pub fn sources_providing(&self, name: &str) -> impl Iterator<Item = &Arc<ComponentDeclaration>> {
        self.by_type.get(name).into_iter().flatten().map(|&index| &self.sources[index])
    }

    /// Type names a registered source can be injected as.
    pub fn provided_names(&self, id: DeclarationId) -> &[String] {
        self.provides.get(&id).map(|names| &names[..]).unwrap_or_default()
    }

    pub fn interceptors(&self) -> &[Arc<ComponentDeclaration>] {
        &self.interceptors
    }

    pub fn templates(&self) -> &[Arc<ComponentDeclaration>] {
        &self.templates
    }

    /// Source declarations flagged as roots, in registration order.
    pub fn roots(&self) -> Vec<Arc<ComponentDeclaration>> {
        self.sources.iter().filter(|d| d.root).cloned().collect()
    }

    /// Look a declaration up by identity among sources and templates.
    pub fn get(&self, id: DeclarationId) -> Option<&Arc<ComponentDeclaration>> {
        self.sources.iter().chain(&self.templates).find(|d| d.id == id)
    }

    /// Number of registered declarations, templates included.
    pub fn len(&self) -> usize {
        self.sources.len() + self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
