//! Pluggable resolution strategies consulted when nothing else satisfies a claim.
//!
//! An [`Extension`] looks at an unresolved claim and answers with an
//! [`ExtensionResult`]:
//!
//! - [`ExtensionResult::NoOpinion`]: try the next extension
//! - [`ExtensionResult::Declaration`]: a usable declaration, possibly a template
//! - [`ExtensionResult::RequiresNewRound`]: the claim can be satisfied once new
//!   artifacts exist; the current round is abandoned and a restart requested
//!
//! Extensions are consulted in registration order and the first opinion wins.
//! A round restart is a plain return value, never an error.

use std::fmt;

use tracing::trace;

use crate::core::Result;
use crate::model::{ComponentDeclaration, DeclarationDraft, DependencyClaim};
use crate::oracle::TypeOracle;

/// Answer of an [`Extension`] for one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionResult {
    NoOpinion,
    Declaration(DeclarationDraft),
    RequiresNewRound,
}

/// What an extension may inspect while answering.
pub struct ExtensionContext<'a> {
    pub oracle: &'a dyn TypeOracle,
    /// The declaration whose claim is being resolved.
    pub requester: &'a ComponentDeclaration,
    /// Zero-based processing round.
    pub round: u32,
}

/// A strategy that can synthesize declarations on demand.
pub trait Extension: Send + Sync {
    /// Stable name used in logs, restart requests and errors.
    fn name(&self) -> &str;

    /// Inspect `claim` and decide whether this extension can provide it.
    fn resolve(&self, claim: &DependencyClaim, ctx: &ExtensionContext<'_>) -> Result<ExtensionResult>;
}

/// An opinion together with the extension that gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionAnswer {
    pub extension: String,
    pub result: ExtensionResult,
}

/// Ordered registry of extensions.
#[derive(Default)]
pub struct Extensions {
    entries: Vec<Box<dyn Extension>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: Box<dyn Extension>) {
        self.entries.push(extension);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    /// Ask every extension in order; return the first opinion.
    pub fn find(&self, claim: &DependencyClaim, ctx: &ExtensionContext<'_>) -> Result<Option<ExtensionAnswer>> {
        for extension in &self.entries {
            let result = extension.resolve(claim, ctx)?;
            if result == ExtensionResult::NoOpinion {
                continue;
            }
            trace!("Extension '{}' answered for {}", extension.name(), claim);
            return Ok(Some(ExtensionAnswer {
                extension: extension.name().to_string(),
                result,
            }));
        }
        Ok(None)
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
