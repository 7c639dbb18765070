//! Cycle detection and promised-proxy synthesis.
//!
//! A cycle shows up as a component frame whose declaration is already on the
//! stack. The claim that led there is the one at the cursor of the frame
//! directly below. When that claim targets an interface, open or abstract
//! type, a proxy of the claimed type is committed in place of the instance;
//! it holds a promise of the original declaration and forwards every call to
//! it once constructed. A cycle through a final type cannot be broken.

use crate::constants::PROXY_NAME_SUFFIX;
use crate::core::{Result, WiregraphError};
use crate::model::{ClaimKind, DeclarationDraft, DeclarationOrigin, DependencyClaim, TagSet};
use crate::plan::{DependencyEdge, TargetRef};

use super::GraphResolver;
use super::frame::{ComponentFrame, ResolutionFrame};
use super::state::ResolutionState;

impl GraphResolver<'_> {
    /// Break the cycle `frame` would close, if any.
    ///
    /// Returns `true` when `frame` was short-circuited: the frame below had its
    /// claim satisfied by a proxy and `frame` must be dropped.
    pub(crate) fn break_cycle(&self, state: &mut ResolutionState, frame: &ComponentFrame) -> Result<bool> {
        let Some(ResolutionFrame::Component(previous)) = state.stack.last() else {
            return Ok(false);
        };
        let Some(claim) = previous.current_claim().cloned() else {
            return Ok(false);
        };
        let declaration = &frame.declaration;
        let Some(start) = state.stack.iter().position(|f| match f {
            ResolutionFrame::Component(f) => f.declaration.id == declaration.id,
            ResolutionFrame::Root(_) => false,
        }) else {
            return Ok(false);
        };

        let mut chain: Vec<String> = state.stack[start..]
            .iter()
            .filter_map(|f| match f {
                ResolutionFrame::Component(f) => Some(f.declaration.to_string()),
                ResolutionFrame::Root(_) => None,
            })
            .collect();
        chain.push(declaration.to_string());

        if !claim.kind.is_single() || !self.oracle.type_kind(&claim.ty).is_substitutable() {
            tracing::debug!("Unbreakable cycle through {}", claim);
            return Err(WiregraphError::CircularDependency {
                claim: claim.to_string(),
                chain,
            });
        }

        let key = (claim.ty.clone(), declaration.id);
        let proxy_index = match state.proxies.get(&key) {
            Some(index) => *index,
            None => {
                let target_claim =
                    DependencyClaim::new(declaration.ty.clone(), declaration.tags.clone(), ClaimKind::PromiseOf);
                let draft = DeclarationDraft::new(format!("{}{}", declaration.name, PROXY_NAME_SUFFIX), claim.ty.clone())
                    .tags(TagSet::of([self.config.proxy_tag.as_str()]))
                    .claim(target_claim.clone())
                    .origin(DeclarationOrigin::PromisedProxy {
                        target: declaration.ty.clone(),
                    });
                let proxy = state.catalog.register(draft, self.oracle);
                let edge = DependencyEdge::ProxyParameter {
                    claim: target_claim,
                    declaration: declaration.id,
                    target: None,
                };
                let index = state.commit(proxy, vec![edge]);
                state.proxies.insert(key, index);
                tracing::debug!("Broke cycle {} with proxy #{}", chain.join(" → "), index);
                index
            }
        };

        if let Some(ResolutionFrame::Component(previous)) = state.stack.last_mut() {
            previous.resolve_current(DependencyEdge::single(claim, TargetRef::direct(proxy_index)));
        }
        Ok(true)
    }
}
