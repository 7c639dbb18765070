//! Dependency graph resolution for wiregraph.
//!
//! This module turns a set of component declarations into a
//! [`ConstructionPlan`]: an ordered list of components in which every
//! construction edge points at a component that comes earlier. It handles
//! tag-based disambiguation, default overrides, template specialization,
//! collection claims, cycle breaking with promised proxies, interceptor
//! binding and extension-driven processing rounds.
//!
//! # Architecture Overview
//!
//! Resolution is an explicit, iterative depth-first traversal. There is no
//! recursion over the dependency graph; deep graphs only grow a `Vec`.
//!
//! ## The stack
//!
//! The [`ResolutionState`](state::ResolutionState) holds a LIFO stack of frames:
//!
//! - **Root frames** reference a root declaration. Popping one pushes a frame
//!   for the declaration unless it is already resolved.
//! - **Component frames** hold a declaration, the edges resolved so far and a
//!   cursor into its claims. Popping one either resolves the claim at the
//!   cursor, pushes itself back under a frame for a missing dependency, or
//!   commits the component once every claim has an edge.
//!
//! Committing appends to the resolved list, so a component's index is also its
//! construction order.
//!
//! ## Single claims
//!
//! A single claim is tried against, in order:
//!
//! 1. **Resolved components**, with non-default and exact-type tiebreaks
//! 2. **Catalog declarations**, pushed as a new frame
//! 3. **Templates**, specialized for the claimed type; several survivors fork
//! 4. **Absence**, for nullable claims
//! 5. **Optional wrappers**, declared on the fly around a nullable inner claim
//! 6. **Final types** with a public constructor, declared on the fly
//! 7. **Extensions**, which may add a declaration or request a new round
//!
//! When none applies the claim fails with
//! [`WiregraphError::UnresolvedDependency`], carrying the resolution chain and
//! hints from [`hints`].
//!
//! ## Collection claims
//!
//! A collection claim first pulls in every unresolved, non-default matching
//! declaration one at a time, then closes over the matching resolved
//! components in index order. Zero matches yield an empty collection.
//!
//! ## Forks
//!
//! When several templates match a claim equally well, each candidate is tried
//! on a clone of the state. A branch succeeds as soon as it commits a
//! component that satisfies the claim. Exactly one success is adopted;
//! several are an ambiguity; none reports the first branch's unresolved error
//! with the others attached as suppressed.
//!
//! ## Rounds
//!
//! An extension answering [`ExtensionResult::RequiresNewRound`] aborts the
//! round with a [`RestartRequest`]; [`RoundDriver`] then rediscovers
//! declarations and resolves again from scratch.
//!
//! # Example
//!
//! ```rust,no_run
//! use wiregraph::catalog::Discovery;
//! use wiregraph::model::{ClaimKind, DeclarationDraft, TypeRef};
//! use wiregraph::oracle::TypeUniverse;
//! use wiregraph::resolver::GraphResolver;
//!
//! # fn main() -> wiregraph::core::Result<()> {
//! let universe = TypeUniverse::new();
//! let resolver = GraphResolver::new(&universe);
//! let plan = resolver.resolve_declarations(vec![
//!     DeclarationDraft::new("app", TypeRef::named("App")).needs(TypeRef::named("Db"), ClaimKind::Required).root(),
//!     DeclarationDraft::new("db", TypeRef::named("Db")),
//! ])?;
//! assert_eq!(plan.order(), vec!["db", "app"]);
//! # Ok(())
//! # }
//! ```

mod cycle;
mod frame;
pub mod hints;
mod interceptors;
mod lookup;
pub mod rounds;
mod state;
mod template;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Discovery};
use crate::config::ResolverConfig;
use crate::core::{Result, WiregraphError};
use crate::extension::{Extension, ExtensionContext, ExtensionResult, Extensions};
use crate::model::{
    ClaimKind, ComponentDeclaration, DeclarationDraft, DeclarationId, DeclarationOrigin, DependencyClaim,
};
use crate::oracle::TypeOracle;
use crate::plan::{ConstructionPlan, DependencyEdge, ResolvedComponent};

use frame::{ComponentFrame, ResolutionFrame};
use lookup::Collection;
use state::ResolutionState;

pub use hints::ModuleHint;
pub use rounds::{DeclarationSource, RoundDriver};
pub use template::match_structure;

/// Why a round stopped before producing a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartRequest {
    /// The claim an extension promised to satisfy in a later round.
    pub claim: DependencyClaim,
    /// Display form of the declaration that made the claim.
    pub requester: String,
    pub extension: String,
    /// Zero-based round that was abandoned.
    pub round: u32,
}

/// Result of a single resolution round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(ConstructionPlan),
    RestartRequired(RestartRequest),
}

impl ResolutionOutcome {
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The plan, or [`WiregraphError::RoundRestartRequired`] for callers that
    /// do not drive rounds.
    pub fn into_plan(self) -> Result<ConstructionPlan> {
        match self {
            Self::Resolved(plan) => Ok(plan),
            Self::RestartRequired(request) => Err(WiregraphError::RoundRestartRequired {
                claim: request.claim.to_string(),
                requester: request.requester,
                extension: request.extension,
            }),
        }
    }
}

/// How a stack run ended.
enum RunOutcome {
    /// The stack drained.
    Finished,
    /// A committed component satisfies the claim a fork branch was run for.
    Satisfied,
    Restart(RestartRequest),
}

/// What to do with the claim at a frame's cursor.
enum Resolution {
    Edge(DependencyEdge),
    Push(Arc<ComponentDeclaration>),
    /// The catalog changed; look again on the next pop.
    Retry,
    Fork(Vec<DeclarationDraft>),
    Restart(RestartRequest),
}

/// The resolution engine.
///
/// A resolver is immutable once built and can resolve any number of rounds;
/// each call to [`resolve`](Self::resolve) starts from a fresh state.
pub struct GraphResolver<'a> {
    oracle: &'a dyn TypeOracle,
    extensions: Extensions,
    hints: Vec<ModuleHint>,
    config: ResolverConfig,
}

impl<'a> GraphResolver<'a> {
    pub fn new(oracle: &'a dyn TypeOracle) -> Self {
        Self {
            oracle,
            extensions: Extensions::new(),
            hints: Vec::new(),
            config: ResolverConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: Box<dyn Extension>) -> Self {
        self.extensions.register(extension);
        self
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: Vec<ModuleHint>) -> Self {
        self.hints = hints;
        self
    }

    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Resolve one round of declarations.
    ///
    /// Returns [`ResolutionOutcome::RestartRequired`] when an extension needs
    /// another round; every other failure is an error.
    pub fn resolve(&self, discovery: &Discovery, round: u32) -> Result<ResolutionOutcome> {
        let mut catalog = Catalog::new();
        for draft in &discovery.declarations {
            draft.validate()?;
            catalog.register(draft.clone(), self.oracle);
        }

        let mut state = ResolutionState::new(catalog);
        if state.roots.is_empty() {
            return Err(WiregraphError::NoRootComponents);
        }
        tracing::debug!(
            "Resolving {} root(s) over {} declaration(s) in round {}",
            state.roots.len(),
            state.catalog.len(),
            round + 1
        );

        // Reversed so roots resolve in declaration order
        for index in (0..state.roots.len()).rev() {
            state.stack.push(ResolutionFrame::Root(index));
        }

        match self.run(&mut state, None, round)? {
            RunOutcome::Restart(request) => Ok(ResolutionOutcome::RestartRequired(request)),
            RunOutcome::Finished | RunOutcome::Satisfied => Ok(ResolutionOutcome::Resolved(self.finish(state, round))),
        }
    }

    /// Resolve a fixed declaration set in a single round.
    pub fn resolve_declarations(&self, declarations: Vec<DeclarationDraft>) -> Result<ConstructionPlan> {
        self.resolve(&Discovery::new(declarations), 0)?.into_plan()
    }

    /// Drain the stack.
    ///
    /// With `for_claim` set (inside a fork branch), stop as soon as a committed
    /// component satisfies that claim.
    fn run(&self, state: &mut ResolutionState, for_claim: Option<&DependencyClaim>, round: u32) -> Result<RunOutcome> {
        while let Some(frame) = state.stack.pop() {
            let frame = match frame {
                ResolutionFrame::Root(index) => {
                    let declaration = Arc::clone(&state.roots[index]);
                    if !state.is_resolved(declaration.id) {
                        tracing::trace!("Expanding root {}", declaration);
                        state.push_component(declaration, self.oracle);
                    }
                    continue;
                }
                ResolutionFrame::Component(frame) => frame,
            };

            if self.break_cycle(state, &frame)? {
                continue;
            }

            let Some(claim) = frame.current_claim().cloned() else {
                let index = state.commit(Arc::clone(&frame.declaration), frame.edges);
                let committed = &state.resolved[index].declaration;
                tracing::trace!("Committed #{} {}", index, committed);
                if for_claim.is_some_and(|claim| lookup::fit(self.oracle, committed, claim).is_some()) {
                    return Ok(RunOutcome::Satisfied);
                }
                continue;
            };

            if let Some(request) = self.advance(state, frame, claim, round)? {
                return Ok(RunOutcome::Restart(request));
            }
        }
        Ok(RunOutcome::Finished)
    }

    /// Make progress on the claim at the cursor of `frame`.
    fn advance(
        &self,
        state: &mut ResolutionState,
        mut frame: ComponentFrame,
        claim: DependencyClaim,
        round: u32,
    ) -> Result<Option<RestartRequest>> {
        if claim.kind.is_all() {
            match lookup::collect_all(self.oracle, state, &claim) {
                Collection::Pending(declaration) => {
                    state.stack.push(ResolutionFrame::Component(frame));
                    state.push_component(declaration, self.oracle);
                }
                Collection::Ready(targets) => {
                    tracing::trace!("Collected {} component(s) for {}", targets.len(), claim);
                    frame.resolve_current(DependencyEdge::AllOf {
                        claim,
                        targets,
                    });
                    state.stack.push(ResolutionFrame::Component(frame));
                }
            }
            return Ok(None);
        }

        if claim.kind == ClaimKind::TypeRef {
            frame.resolve_current(DependencyEdge::TypeToken {
                claim,
            });
            state.stack.push(ResolutionFrame::Component(frame));
            return Ok(None);
        }

        let requester = Arc::clone(&frame.declaration);
        match self.resolve_single(state, &requester, &claim, round)? {
            Resolution::Edge(edge) => {
                frame.resolve_current(edge);
                state.stack.push(ResolutionFrame::Component(frame));
            }
            Resolution::Push(declaration) => {
                state.stack.push(ResolutionFrame::Component(frame));
                state.push_component(declaration, self.oracle);
            }
            Resolution::Retry => {
                state.stack.push(ResolutionFrame::Component(frame));
            }
            Resolution::Fork(candidates) => {
                state.stack.push(ResolutionFrame::Component(frame));
                return self.fork(state, &claim, &requester, candidates, round);
            }
            Resolution::Restart(request) => return Ok(Some(request)),
        }
        Ok(None)
    }

    fn resolve_single(
        &self,
        state: &mut ResolutionState,
        requester: &ComponentDeclaration,
        claim: &DependencyClaim,
        round: u32,
    ) -> Result<Resolution> {
        if let Some(target) = lookup::find_resolved(self.oracle, state, claim, requester)? {
            return Ok(Resolution::Edge(DependencyEdge::single(claim.clone(), target)));
        }

        if let Some(declaration) = lookup::find_declaration(self.oracle, state, claim, requester)? {
            // Reached when a resolved default deferred to this declaration's
            // competitors but the tiebreak still picked a resolved one
            let resolved = state.index_of(declaration.id).zip(lookup::fit(self.oracle, &declaration, claim));
            if let Some((index, how)) = resolved {
                return Ok(Resolution::Edge(DependencyEdge::single(claim.clone(), how.target(index))));
            }
            return Ok(Resolution::Push(declaration));
        }

        let mut candidates = template::candidates(self.oracle, state.catalog.templates().iter().map(|t| &**t), claim);
        match candidates.len() {
            0 => {}
            1 => {
                let instance = state.catalog.register(candidates.remove(0), self.oracle);
                tracing::debug!("Specialized {} for {}", instance, claim);
                return Ok(Resolution::Push(instance));
            }
            _ => return Ok(Resolution::Fork(candidates)),
        }

        if claim.kind.is_nullable() {
            return Ok(Resolution::Edge(DependencyEdge::Absent {
                claim: claim.clone(),
            }));
        }

        if let Some(inner) = self.oracle.optional_inner(&claim.ty) {
            let draft = DeclarationDraft::new(format!("optional<{inner}>"), claim.ty.clone())
                .tags(claim.tags.clone())
                .claim(DependencyClaim::new(inner, claim.tags.clone(), ClaimKind::Nullable))
                .origin(DeclarationOrigin::Optional);
            return Ok(Resolution::Push(state.catalog.register(draft, self.oracle)));
        }

        if let Some(constructor) = self.oracle.auto_constructor(&claim.ty) {
            if claim.tags_match(&constructor.tags) {
                let draft = DeclarationDraft::new(claim.ty.to_string(), claim.ty.clone())
                    .tags(constructor.tags)
                    .claims(constructor.claims)
                    .origin(DeclarationOrigin::DiscoveredFinal);
                let declaration = state.catalog.register(draft, self.oracle);
                tracing::debug!("Auto-declared final type {}", declaration);
                return Ok(Resolution::Push(declaration));
            }
        }

        let ctx = ExtensionContext {
            oracle: self.oracle,
            requester,
            round,
        };
        if let Some(answer) = self.extensions.find(claim, &ctx)? {
            match answer.result {
                ExtensionResult::Declaration(draft) => {
                    let draft = draft.origin(DeclarationOrigin::Extension {
                        extension: answer.extension.clone(),
                    });
                    self.check_extension_declaration(&draft, claim, &answer.extension)?;
                    let declaration = state.catalog.register(draft, self.oracle);
                    tracing::debug!("Extension '{}' declared {} for {}", answer.extension, declaration, claim);
                    return Ok(Resolution::Retry);
                }
                ExtensionResult::RequiresNewRound => {
                    return Ok(Resolution::Restart(RestartRequest {
                        claim: claim.clone(),
                        requester: requester.to_string(),
                        extension: answer.extension,
                        round,
                    }));
                }
                ExtensionResult::NoOpinion => {}
            }
        }

        let hints = hints::collect_hints(&self.config.hints, self.oracle, &state.catalog, &self.hints, claim);
        let mut chain = state.chain();
        chain.push(requester.to_string());
        tracing::debug!("Unresolved {} requested by {}", claim, requester);
        Err(WiregraphError::UnresolvedDependency {
            claim: claim.to_string(),
            requester: requester.to_string(),
            hints,
            chain,
            suppressed: Vec::new(),
        })
    }

    /// An extension's declaration must be able to satisfy the claim it answered,
    /// otherwise the retry would ask the same extension forever.
    fn check_extension_declaration(&self, draft: &DeclarationDraft, claim: &DependencyClaim, extension: &str) -> Result<()> {
        draft.validate()?;
        let candidate = draft.clone().into_declaration(DeclarationId(u32::MAX));
        let satisfies = if candidate.is_template() {
            claim.tags_match(&candidate.tags) && template::unify(self.oracle, &candidate, &claim.ty).is_some()
        } else {
            lookup::fit(self.oracle, &candidate, claim).is_some()
        };
        if satisfies {
            Ok(())
        } else {
            Err(WiregraphError::InvalidDeclaration {
                name: draft.name.clone(),
                reason: format!("extension '{extension}' returned a declaration that does not satisfy {claim}"),
            })
        }
    }

    /// Try every template candidate on its own copy of the state.
    fn fork(
        &self,
        state: &mut ResolutionState,
        claim: &DependencyClaim,
        requester: &ComponentDeclaration,
        candidates: Vec<DeclarationDraft>,
        round: u32,
    ) -> Result<Option<RestartRequest>> {
        let depth = state.fork_depth;
        if depth >= self.config.max_fork_depth {
            return Err(WiregraphError::ResolutionLimitExceeded {
                claim: claim.to_string(),
                limit: self.config.max_fork_depth,
            });
        }
        tracing::debug!("Forking {} way(s) for {} at depth {}", candidates.len(), claim, depth + 1);

        let mut successes: Vec<(String, ResolutionState)> = Vec::new();
        let mut failures: Vec<WiregraphError> = Vec::new();

        for candidate in candidates {
            let mut branch = state.clone();
            branch.fork_depth = depth + 1;
            let instance = branch.catalog.register(candidate, self.oracle);
            let label = instance.to_string();
            branch.push_component(instance, self.oracle);

            match self.run(&mut branch, Some(claim), round) {
                Ok(RunOutcome::Satisfied | RunOutcome::Finished) => {
                    tracing::trace!("Fork branch {} succeeded", label);
                    successes.push((label, branch));
                }
                Ok(RunOutcome::Restart(request)) => return Ok(Some(request)),
                Err(e) if e.is_unresolved() => {
                    tracing::trace!("Fork branch {} failed: {}", label, e);
                    failures.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        match successes.len() {
            1 => {
                if let Some((label, mut branch)) = successes.pop() {
                    tracing::debug!("Adopted fork branch {}", label);
                    branch.fork_depth = depth;
                    *state = branch;
                }
                Ok(None)
            }
            0 => {
                let mut failures = failures.into_iter();
                match failures.next() {
                    Some(first) => Err(first.with_suppressed(failures.collect())),
                    None => Err(WiregraphError::UnresolvedDependency {
                        claim: claim.to_string(),
                        requester: requester.to_string(),
                        hints: Vec::new(),
                        chain: state.chain(),
                        suppressed: Vec::new(),
                    }),
                }
            }
            _ => Err(lookup::ambiguous(
                claim,
                requester,
                successes.into_iter().map(|(label, _)| label).collect(),
            )),
        }
    }

    /// Bind interceptors and proxy targets, then emit the plan.
    fn finish(&self, state: ResolutionState, round: u32) -> ConstructionPlan {
        let interceptors = interceptors::bind_interceptors(self.oracle, &state.resolved);
        let components = state
            .resolved
            .iter()
            .zip(interceptors)
            .enumerate()
            .map(|(index, (node, interceptors))| {
                let dependencies = node
                    .dependencies
                    .iter()
                    .cloned()
                    .map(|edge| match edge {
                        DependencyEdge::ProxyParameter {
                            claim,
                            declaration,
                            ..
                        } => DependencyEdge::ProxyParameter {
                            claim,
                            declaration,
                            target: state.index_of(declaration),
                        },
                        other => other,
                    })
                    .collect();
                let declaration = &node.declaration;
                ResolvedComponent {
                    index,
                    name: declaration.name.clone(),
                    origin: declaration.origin.clone(),
                    ty: declaration.ty.clone(),
                    tags: declaration.tags.clone(),
                    root: declaration.root,
                    dependencies,
                    interceptors,
                }
            })
            .collect();

        ConstructionPlan {
            components,
            rounds: round + 1,
        }
    }
}
