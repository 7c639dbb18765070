//! Diagnostics attached to unresolved-dependency errors.
//!
//! Hints are best effort and never change resolution. Three sources:
//!
//! 1. declarations of a fitting type whose tags do not match the claim
//! 2. type names similar to the claimed one (Jaro-Winkler similarity)
//! 3. catalog-provided hints for a type, e.g. "plug in the jdbc module"

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::catalog::Catalog;
use crate::config::HintConfig;
use crate::model::{DependencyClaim, TagSet, TypeRef};
use crate::oracle::TypeOracle;

use super::state::is_proxy;

/// A hint shown when a claim on `ty` cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHint {
    /// Claimed type; without type arguments it matches any parameterization.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// When set, the hint only applies to claims carrying all of these tags.
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    pub message: String,
}

impl ModuleHint {
    pub fn new(ty: TypeRef, message: impl Into<String>) -> Self {
        Self {
            ty,
            tags: TagSet::empty(),
            message: message.into(),
        }
    }

    fn applies_to(&self, claim: &DependencyClaim) -> bool {
        let type_matches = if self.ty.args().is_empty() {
            self.ty.name() == claim.ty.name()
        } else {
            self.ty == claim.ty
        };
        type_matches && claim.tags.is_superset_of(&self.tags)
    }
}

/// Collect hints for `claim`.
pub(crate) fn collect_hints(
    config: &HintConfig,
    oracle: &dyn TypeOracle,
    catalog: &Catalog,
    module_hints: &[ModuleHint],
    claim: &DependencyClaim,
) -> Vec<String> {
    if !config.enabled {
        return Vec::new();
    }
    let mut hints = Vec::new();

    for declaration in catalog.sources().iter().filter(|d| !is_proxy(d)) {
        if claim.tags_match(&declaration.tags) {
            continue;
        }
        if oracle.is_assignable(&declaration.ty, &claim.ty) || oracle.is_wrappable(&declaration.ty, &claim.ty) {
            hints.push(format!(
                "Component {} has the requested type but tags {}; the claim requires {}",
                declaration, declaration.tags, claim.tags
            ));
        }
    }

    let target = claim.ty.name();
    let names: BTreeSet<String> = oracle
        .known_type_names()
        .into_iter()
        .chain(catalog.sources().iter().map(|d| d.ty.name().to_string()))
        .chain(catalog.templates().iter().map(|d| d.ty.name().to_string()))
        .filter(|name| name != target)
        .collect();
    let mut scored: Vec<(String, f64)> = names
        .into_iter()
        .map(|name| {
            let score = jaro_winkler(target, &name);
            (name, score)
        })
        .filter(|(_, score)| *score >= config.similarity_threshold)
        .collect();
    // Highest similarity first, ties by name for stable output
    scored.sort_by(|(a, sa), (b, sb)| sb.total_cmp(sa).then_with(|| a.cmp(b)));
    hints.extend(
        scored
            .into_iter()
            .take(config.max_suggestions)
            .map(|(name, _)| format!("Did you mean `{name}`?")),
    );

    hints.extend(module_hints.iter().filter(|h| h.applies_to(claim)).map(|h| h.message.clone()));
    hints
}
