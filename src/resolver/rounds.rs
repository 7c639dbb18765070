//! Multi-round driver.
//!
//! A round is one discovery plus one resolution. When an extension answers
//! that a claim needs new artifacts, resolution stops with a
//! [`RestartRequest`]; the driver hands it to the [`DeclarationSource`], which
//! is expected to make the awaited declarations visible in the next
//! discovery, and starts over from scratch.

use crate::catalog::Discovery;
use crate::core::{Result, WiregraphError};
use crate::plan::ConstructionPlan;

use super::{GraphResolver, ResolutionOutcome, RestartRequest};

/// Supplies declarations round by round.
pub trait DeclarationSource {
    /// Declarations visible in `round` (zero-based).
    fn discover(&mut self, round: u32) -> Result<Discovery>;

    /// React to a restart request before the next round is discovered.
    fn prepare_round(&mut self, request: &RestartRequest) -> Result<()>;
}

/// A fixed set of declarations that never changes between rounds.
impl DeclarationSource for Discovery {
    fn discover(&mut self, _round: u32) -> Result<Discovery> {
        Ok(self.clone())
    }

    fn prepare_round(&mut self, _request: &RestartRequest) -> Result<()> {
        Ok(())
    }
}

/// Runs resolution rounds until a plan is produced or the round limit is hit.
pub struct RoundDriver<'r, 'o> {
    resolver: &'r GraphResolver<'o>,
}

impl<'r, 'o> RoundDriver<'r, 'o> {
    pub const fn new(resolver: &'r GraphResolver<'o>) -> Self {
        Self {
            resolver,
        }
    }

    pub fn run(&self, source: &mut dyn DeclarationSource) -> Result<ConstructionPlan> {
        let max_rounds = self.resolver.config().max_rounds;
        let mut last_request: Option<RestartRequest> = None;

        for round in 0..max_rounds {
            let discovery = source.discover(round)?;
            tracing::debug!("Round {}: {} declaration(s) discovered", round + 1, discovery.declarations.len());

            match self.resolver.resolve(&discovery, round)? {
                ResolutionOutcome::Resolved(plan) => {
                    tracing::debug!("Round {}: resolved {} component(s)", round + 1, plan.len());
                    return Ok(plan);
                }
                ResolutionOutcome::RestartRequired(request) => {
                    tracing::debug!(
                        "Round {}: extension '{}' requested a new round for {} (requested by {})",
                        round + 1,
                        request.extension,
                        request.claim,
                        request.requester
                    );
                    source.prepare_round(&request)?;
                    last_request = Some(request);
                }
            }
        }

        tracing::warn!("Giving up after {} round(s)", max_rounds);
        Err(match last_request {
            Some(request) => WiregraphError::RoundLimitExceeded {
                claim: request.claim.to_string(),
                extension: request.extension,
                rounds: max_rounds,
            },
            None => WiregraphError::ConfigError {
                message: "max_rounds must be at least 1".to_string(),
            },
        })
    }
}
