//! Declaration and claim model consumed by the resolver.
//!
//! - [`TypeRef`] - type expressions, possibly containing template variables
//! - [`TagSet`] - disambiguation labels and the claim matching rule
//! - [`DependencyClaim`] / [`ClaimKind`] - what a consumer needs and in which shape
//! - [`DeclarationDraft`] / [`ComponentDeclaration`] - candidate producers

mod claim;
mod declaration;
mod tags;
mod types;

pub use claim::{ClaimKind, DependencyClaim, HandleKind};
pub use declaration::{ComponentDeclaration, DeclarationDraft, DeclarationId, DeclarationOrigin};
pub use tags::{ANY_TAG, TagSet};
pub use types::{Substitution, TypeRef};
