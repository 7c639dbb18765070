//! Component declarations: candidate producers of graph nodes.
//!
//! A [`DeclarationDraft`] is built by whoever discovers components (a manifest,
//! an extension, the resolver itself). The [`Catalog`](crate::catalog::Catalog)
//! turns drafts into [`ComponentDeclaration`]s by assigning a stable
//! [`DeclarationId`]. Identity, never structural equality, is what the resolver
//! uses for memoization and cycle detection: two structurally equal
//! declarations registered twice are two different candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ClaimKind, DependencyClaim, Substitution, TagSet, TypeRef};
use crate::core::{Result, WiregraphError};

/// Stable identity of a declaration within one processing round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationId(pub u32);

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DeclarationOrigin {
    /// A component class discovered directly.
    Annotated,
    /// A factory method of a module.
    Module {
        module: String,
    },
    /// Supplied by an extension while resolving a claim.
    Extension {
        extension: String,
    },
    /// Synthetic wrapper satisfying an optional-wrapper claim.
    Optional,
    /// Synthetic forwarding proxy breaking a construction cycle.
    PromisedProxy {
        target: TypeRef,
    },
    /// A final type declared on the fly from its constructor.
    DiscoveredFinal,
    /// A template specialized for a concrete claim.
    TemplateInstance {
        template: DeclarationId,
        substitution: Substitution,
    },
}

impl DeclarationOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Annotated => "annotated",
            Self::Module {
                ..
            } => "module",
            Self::Extension {
                ..
            } => "extension",
            Self::Optional => "optional",
            Self::PromisedProxy {
                ..
            } => "promised-proxy",
            Self::DiscoveredFinal => "discovered-final",
            Self::TemplateInstance {
                ..
            } => "template-instance",
        }
    }
}

/// A declaration that has not been registered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationDraft {
    pub name: String,
    pub ty: TypeRef,
    pub tags: TagSet,
    pub claims: Vec<DependencyClaim>,
    pub type_params: Vec<String>,
    pub default: bool,
    pub root: bool,
    pub origin: DeclarationOrigin,
}

impl DeclarationDraft {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: TagSet::empty(),
            claims: Vec::new(),
            type_params: Vec::new(),
            default: false,
            root: false,
            origin: DeclarationOrigin::Annotated,
        }
    }

    #[must_use]
    pub fn tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn claim(mut self, claim: DependencyClaim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Shorthand for a claim of `kind` on an untagged type.
    #[must_use]
    pub fn needs(self, ty: TypeRef, kind: ClaimKind) -> Self {
        self.claim(DependencyClaim::new(ty, TagSet::empty(), kind))
    }

    #[must_use]
    pub fn claims(mut self, claims: impl IntoIterator<Item = DependencyClaim>) -> Self {
        self.claims.extend(claims);
        self
    }

    #[must_use]
    pub fn type_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Mark as a default component that a non-default alternative may shadow.
    #[must_use]
    pub fn default_component(mut self) -> Self {
        self.default = true;
        self
    }

    #[must_use]
    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: DeclarationOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_template(&self) -> bool {
        !self.type_params.is_empty() || self.ty.has_type_vars()
    }

    /// Reject drafts the resolver could never specialize or name.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| WiregraphError::InvalidDeclaration {
            name: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("declaration name is empty".to_string()));
        }

        let exposed = self.ty.clone().bind_params(&self.type_params).type_vars();
        if let Some(unused) = self.type_params.iter().find(|p| !exposed.contains(p)) {
            return Err(invalid(format!("type parameter `{unused}` does not occur in type {}", self.ty)));
        }
        for claim in &self.claims {
            let claim_vars = claim.ty.clone().bind_params(&self.type_params).type_vars();
            if let Some(var) = claim_vars.iter().find(|v| !exposed.contains(v)) {
                return Err(invalid(format!(
                    "claim {claim} uses type variable `{var}` that type {} cannot bind",
                    self.ty
                )));
            }
        }
        Ok(())
    }

    /// Assign an identity, binding type parameters in the exposed type and claims.
    pub fn into_declaration(self, id: DeclarationId) -> ComponentDeclaration {
        let params = self.type_params;
        let ty = self.ty.bind_params(&params);
        let claims = self
            .claims
            .into_iter()
            .map(|claim| DependencyClaim {
                ty: claim.ty.bind_params(&params),
                ..claim
            })
            .collect();
        ComponentDeclaration {
            id,
            name: self.name,
            ty,
            tags: self.tags,
            claims,
            type_params: params,
            default: self.default,
            root: self.root,
            origin: self.origin,
        }
    }
}

/// An immutable, registered component producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDeclaration {
    pub id: DeclarationId,
    pub name: String,
    pub ty: TypeRef,
    pub tags: TagSet,
    pub claims: Vec<DependencyClaim>,
    pub type_params: Vec<String>,
    pub default: bool,
    pub root: bool,
    pub origin: DeclarationOrigin,
}

impl ComponentDeclaration {
    /// Templates carry unresolved type variables and cannot be resolved directly.
    pub fn is_template(&self) -> bool {
        !self.type_params.is_empty() || self.ty.has_type_vars()
    }

    pub const fn is_default(&self) -> bool {
        self.default
    }

    /// Copy of this declaration as a fresh draft, e.g. to specialize a template.
    pub fn to_draft(&self) -> DeclarationDraft {
        DeclarationDraft {
            name: self.name.clone(),
            ty: self.ty.clone(),
            tags: self.tags.clone(),
            claims: self.claims.clone(),
            type_params: self.type_params.clone(),
            default: self.default,
            root: self.root,
            origin: self.origin.clone(),
        }
    }
}

impl fmt::Display for ComponentDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)?;
        if !self.tags.is_empty() {
            write!(f, " tags={}", self.tags)?;
        }
        if self.default {
            write!(f, " (default)")?;
        }
        Ok(())
    }
}
