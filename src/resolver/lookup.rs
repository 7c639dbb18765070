//! Candidate lookup for claims among resolved components and catalog declarations.
//!
//! When several candidates match a single claim, ties are broken in this order:
//! a single non-default candidate wins, then a single candidate whose type is
//! exactly the claimed type (directly or once unwrapped). Anything else is
//! an [`WiregraphError::AmbiguousDependency`].
//!
//! Only declarations indexed under the claimed type's name are visited; see
//! [`Catalog::sources_providing`](crate::catalog::Catalog::sources_providing).

use std::sync::Arc;

use crate::core::{Result, WiregraphError};
use crate::model::{ComponentDeclaration, DependencyClaim};
use crate::oracle::TypeOracle;
use crate::plan::TargetRef;

use super::state::{ResolutionState, is_proxy};

/// How a component's type satisfies a claim's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fit {
    Direct,
    Unwrapped,
}

impl Fit {
    pub fn target(self, index: usize) -> TargetRef {
        match self {
            Self::Direct => TargetRef::direct(index),
            Self::Unwrapped => TargetRef::unwrapped(index),
        }
    }
}

/// Whether `declaration` can be injected for `claim`, and how.
pub(crate) fn fit(oracle: &dyn TypeOracle, declaration: &ComponentDeclaration, claim: &DependencyClaim) -> Option<Fit> {
    if !claim.tags_match(&declaration.tags) {
        return None;
    }
    if oracle.is_assignable(&declaration.ty, &claim.ty) {
        Some(Fit::Direct)
    } else if oracle.is_wrappable(&declaration.ty, &claim.ty) {
        Some(Fit::Unwrapped)
    } else {
        None
    }
}

fn is_exact(oracle: &dyn TypeOracle, declaration: &ComponentDeclaration, claim: &DependencyClaim) -> bool {
    declaration.ty == claim.ty || oracle.unwrap(&declaration.ty).is_some_and(|inner| inner == claim.ty)
}

/// Apply the tiebreaks to `candidates`, returning the position of the winner.
fn pick(
    oracle: &dyn TypeOracle,
    candidates: &[&ComponentDeclaration],
    claim: &DependencyClaim,
    requester: &ComponentDeclaration,
) -> Result<Option<usize>> {
    match candidates.len() {
        0 => return Ok(None),
        1 => return Ok(Some(0)),
        _ => {}
    }

    let non_default: Vec<usize> = (0..candidates.len()).filter(|&i| !candidates[i].is_default()).collect();
    if let [only] = non_default.as_slice() {
        return Ok(Some(*only));
    }

    let exact: Vec<usize> = (0..candidates.len()).filter(|&i| is_exact(oracle, candidates[i], claim)).collect();
    if let [only] = exact.as_slice() {
        return Ok(Some(*only));
    }

    Err(ambiguous(claim, requester, candidates.iter().map(ToString::to_string).collect()))
}

pub(crate) fn ambiguous(
    claim: &DependencyClaim,
    requester: &ComponentDeclaration,
    candidates: Vec<String>,
) -> WiregraphError {
    WiregraphError::AmbiguousDependency {
        claim: claim.to_string(),
        requester: requester.to_string(),
        candidates,
    }
}

/// A resolved component satisfying a single claim.
///
/// Returns `None` when the only match is a default component that an
/// unresolved non-default declaration would shadow; the caller then picks
/// that declaration from the catalog.
pub(crate) fn find_resolved(
    oracle: &dyn TypeOracle,
    state: &ResolutionState,
    claim: &DependencyClaim,
    requester: &ComponentDeclaration,
) -> Result<Option<TargetRef>> {
    let matches: Vec<(usize, Fit)> = state
        .resolved_providing(claim.ty.name())
        .filter(|(_, node)| !node.is_proxy())
        .filter_map(|(index, node)| fit(oracle, &node.declaration, claim).map(|f| (index, f)))
        .collect();
    let declarations: Vec<&ComponentDeclaration> =
        matches.iter().map(|(index, _)| state.resolved[*index].declaration.as_ref()).collect();

    let Some(winner) = pick(oracle, &declarations, claim, requester)? else {
        return Ok(None);
    };
    if declarations[winner].is_default() && has_shadowing_declaration(oracle, state, claim) {
        return Ok(None);
    }
    let (index, how) = matches[winner];
    Ok(Some(how.target(index)))
}

fn has_shadowing_declaration(oracle: &dyn TypeOracle, state: &ResolutionState, claim: &DependencyClaim) -> bool {
    state.catalog.sources_providing(claim.ty.name()).any(|d| {
        !d.is_default() && !is_proxy(d) && !state.is_resolved(d.id) && fit(oracle, d, claim).is_some()
    })
}

/// A catalog declaration satisfying a single claim.
pub(crate) fn find_declaration(
    oracle: &dyn TypeOracle,
    state: &ResolutionState,
    claim: &DependencyClaim,
    requester: &ComponentDeclaration,
) -> Result<Option<Arc<ComponentDeclaration>>> {
    let matches: Vec<&Arc<ComponentDeclaration>> = state
        .catalog
        .sources_providing(claim.ty.name())
        .filter(|d| !is_proxy(d) && fit(oracle, d, claim).is_some())
        .collect();
    let declarations: Vec<&ComponentDeclaration> = matches.iter().map(|d| Arc::as_ref(d)).collect();

    Ok(pick(oracle, &declarations, claim, requester)?.map(|winner| Arc::clone(matches[winner])))
}

/// Progress of a collection claim.
#[derive(Debug)]
pub(crate) enum Collection {
    /// This matching declaration must be resolved before the claim can close.
    Pending(Arc<ComponentDeclaration>),
    /// Every matching resolved component, in index order.
    Ready(Vec<TargetRef>),
}

/// Scan the catalog for a collection claim.
///
/// Default declarations are never pulled in by a collection claim; they are
/// included only when something else resolved them.
pub(crate) fn collect_all(oracle: &dyn TypeOracle, state: &ResolutionState, claim: &DependencyClaim) -> Collection {
    let pending = state.catalog.sources_providing(claim.ty.name()).find(|d| {
        !d.is_default() && !is_proxy(d) && !state.is_resolved(d.id) && fit(oracle, d, claim).is_some()
    });
    if let Some(declaration) = pending {
        return Collection::Pending(Arc::clone(declaration));
    }

    Collection::Ready(
        state
            .resolved_providing(claim.ty.name())
            .filter(|(_, node)| !node.is_proxy())
            .filter_map(|(index, node)| fit(oracle, &node.declaration, claim).map(|f| f.target(index)))
            .collect(),
    )
}
