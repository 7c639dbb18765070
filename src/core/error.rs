//! Error handling for wiregraph
//!
//! This module provides the error taxonomy of the resolver and user-friendly
//! error reporting for the CLI. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers (and the resolver's own fork logic)
//!    can react to specific failure modes
//! 2. **Locatable messages**: every resolution error names the claim, the
//!    requesting declaration and, where it applies, the resolution chain
//!
//! # Architecture
//!
//! - [`WiregraphError`] - enumerated error types for all failure cases
//! - [`ErrorContext`] - wrapper that adds details and suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Resolution**: [`WiregraphError::UnresolvedDependency`],
//!   [`WiregraphError::AmbiguousDependency`], [`WiregraphError::CircularDependency`]
//! - **Rounds**: [`WiregraphError::RoundRestartRequired`], [`WiregraphError::RoundLimitExceeded`]
//! - **Input**: [`WiregraphError::TypeParseError`], [`WiregraphError::CatalogParseError`],
//!   [`WiregraphError::InvalidDeclaration`], [`WiregraphError::NoRootComponents`]
//! - **Environment**: [`WiregraphError::ConfigError`], [`WiregraphError::IoError`],
//!   [`WiregraphError::TomlError`]
//!
//! # Fork aggregation
//!
//! When template matching forks the resolution state, only
//! [`WiregraphError::UnresolvedDependency`] is caught and aggregated across
//! sibling branches: the first failure is reported and the others are attached
//! as `suppressed`. Ambiguity and circularity are hard stops.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wiregraph::core::{ErrorContext, WiregraphError};
//!
//! let error = WiregraphError::NoRootComponents;
//! let context = ErrorContext::new(error)
//!     .with_suggestion("Mark at least one component with `root = true`");
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for wiregraph operations.
#[derive(Error, Debug)]
pub enum WiregraphError {
    /// No declaration, template, extension or auto-declared final type could
    /// satisfy a required claim.
    ///
    /// # Fields
    /// - `claim`: the claim (type, kind and tags)
    /// - `requester`: the declaration that made the claim
    /// - `hints`: best-effort suggestions (similar types, tag mismatches, modules)
    /// - `chain`: the resolution frames that led to the claim, outermost first
    /// - `suppressed`: failures of sibling fork branches
    #[error(
        "Required dependency was not found and can't be auto created: {claim} (requested by {requester}){}",
        render_notes(.hints, .chain)
    )]
    UnresolvedDependency {
        claim: String,
        requester: String,
        hints: Vec<String>,
        chain: Vec<String>,
        suppressed: Vec<WiregraphError>,
    },

    /// Two or more equally valid components match a single claim.
    #[error(
        "More than one component matches dependency claim {claim} (requested by {requester}):\n{}",
        render_list(.candidates)
    )]
    AmbiguousDependency {
        claim: String,
        requester: String,
        candidates: Vec<String>,
    },

    /// A cycle goes through a type that cannot be put behind a proxy.
    ///
    /// `claim` is the claim that closed the cycle; the chain ends with the
    /// requester of that claim followed by the re-entered declaration.
    #[error("Circular dependency detected: {} (through claim {claim})", .chain.join(" → "))]
    CircularDependency {
        claim: String,
        chain: Vec<String>,
    },

    /// An extension can satisfy a claim only after new artifacts are produced.
    ///
    /// Not a failure: the round driver consumes it and starts a new round.
    /// It only surfaces as an error when a caller asks for a plan directly.
    #[error(
        "Dependency {claim} of {requester} requires a new processing round (extension '{extension}')"
    )]
    RoundRestartRequired {
        claim: String,
        requester: String,
        extension: String,
    },

    /// The configured number of rounds passed without the awaited component appearing.
    #[error(
        "Component was expected to be generated by extension '{extension}' but was not after {rounds} round(s): {claim}"
    )]
    RoundLimitExceeded {
        claim: String,
        extension: String,
        rounds: u32,
    },

    /// The root set is empty.
    #[error("No root components: expected at least one component marked as root")]
    NoRootComponents,

    /// Template forks nested deeper than configured.
    #[error("Template ambiguity nested deeper than {limit} fork level(s) while resolving {claim}")]
    ResolutionLimitExceeded {
        claim: String,
        limit: usize,
    },

    /// A declaration is malformed or cannot do what it was registered for.
    #[error("Invalid declaration '{name}': {reason}")]
    InvalidDeclaration {
        name: String,
        reason: String,
    },

    /// A type expression could not be parsed.
    #[error("Invalid type expression '{input}': {reason}")]
    TypeParseError {
        input: String,
        reason: String,
    },

    /// A catalog file is syntactically valid TOML but semantically broken.
    #[error("Invalid catalog file {file}: {reason}")]
    CatalogParseError {
        file: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

fn render_notes(hints: &[String], chain: &[String]) -> String {
    let mut out = String::new();
    for hint in hints {
        out.push_str("\n  Hint: ");
        out.push_str(hint);
    }
    if !chain.is_empty() {
        out.push_str("\n  Resolution chain: ");
        out.push_str(&chain.join(" → "));
    }
    out
}

fn render_list(items: &[String]) -> String {
    items.iter().map(|item| format!("  {item}")).collect::<Vec<_>>().join("\n")
}

impl WiregraphError {
    /// Whether fork aggregation may catch this error.
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedDependency { .. })
    }

    /// Attach sibling-branch failures to an unresolved-dependency error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_suppressed(self, others: Vec<WiregraphError>) -> Self {
        match self {
            Self::UnresolvedDependency {
                claim,
                requester,
                hints,
                chain,
                mut suppressed,
            } => {
                suppressed.extend(others);
                Self::UnresolvedDependency {
                    claim,
                    requester,
                    hints,
                    chain,
                    suppressed,
                }
            }
            other => other,
        }
    }

    /// Failures of sibling fork branches, if any.
    pub fn suppressed(&self) -> &[WiregraphError] {
        match self {
            Self::UnresolvedDependency {
                suppressed,
                ..
            } => suppressed,
            _ => &[],
        }
    }
}

/// Error context wrapper that provides user-friendly messages and suggestions.
///
/// Display format:
/// 1. **Error**: the main error message in red
/// 2. **Details**: additional context in yellow (optional)
/// 3. **Suggestion**: actionable next step in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: WiregraphError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: WiregraphError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions.
///
/// [`WiregraphError`]s anywhere in the `anyhow` chain get variant-specific
/// suggestions; everything else is wrapped as a configuration error carrying
/// the full chain as its message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: rewrap(&ctx.error),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    let found = error.chain().find_map(|cause| cause.downcast_ref::<WiregraphError>());
    let Some(wg) = found else {
        return ErrorContext::new(WiregraphError::ConfigError {
            message: format!("{error:#}"),
        });
    };

    let context = ErrorContext::new(rewrap(wg));
    match wg {
        WiregraphError::UnresolvedDependency {
            suppressed,
            ..
        } => {
            let context = context.with_suggestion(
                "Declare a component providing this type, plug in the module that does, or mark the claim nullable",
            );
            if suppressed.is_empty() {
                context
            } else {
                let others = suppressed.iter().map(ToString::to_string).collect::<Vec<_>>();
                context.with_details(format!(
                    "{} other template candidate(s) also failed:\n{}",
                    others.len(),
                    others.join("\n")
                ))
            }
        }
        WiregraphError::AmbiguousDependency {
            ..
        } => context.with_suggestion(
            "Add tags to the claim and the candidates, or mark all but one candidate as default",
        ),
        WiregraphError::CircularDependency {
            ..
        } => context
            .with_details("Cycles can only be broken when the claimed type is an interface or an open class")
            .with_suggestion("Claim an interface instead of the concrete type, or use a promise-of claim on an interface"),
        WiregraphError::RoundLimitExceeded {
            ..
        } => context.with_suggestion("Check that the extension's generated declaration becomes visible in the next round, or raise `max_rounds`"),
        WiregraphError::NoRootComponents => {
            context.with_suggestion("Mark at least one component with `root = true` in the catalog")
        }
        WiregraphError::ResolutionLimitExceeded {
            ..
        } => context.with_suggestion("Reduce template ambiguity or raise `max_fork_depth` in the resolver configuration"),
        WiregraphError::TypeParseError {
            ..
        } => context.with_suggestion("Type expressions look like `Name` or `Name<Arg, Other<T>>`"),
        WiregraphError::TomlError(_) | WiregraphError::CatalogParseError { .. } => {
            context.with_suggestion("Check the catalog file syntax against the documented format")
        }
        _ => context,
    }
}

/// Rebuild an error from a reference, for use in contexts that need ownership.
///
/// `std::io::Error` and `toml::de::Error` are not `Clone`; they become
/// [`WiregraphError::ConfigError`] carrying the original message.
fn rewrap(error: &WiregraphError) -> WiregraphError {
    match error {
        WiregraphError::UnresolvedDependency {
            claim,
            requester,
            hints,
            chain,
            suppressed,
        } => WiregraphError::UnresolvedDependency {
            claim: claim.clone(),
            requester: requester.clone(),
            hints: hints.clone(),
            chain: chain.clone(),
            suppressed: suppressed.iter().map(rewrap).collect(),
        },
        WiregraphError::AmbiguousDependency {
            claim,
            requester,
            candidates,
        } => WiregraphError::AmbiguousDependency {
            claim: claim.clone(),
            requester: requester.clone(),
            candidates: candidates.clone(),
        },
        WiregraphError::CircularDependency {
            claim,
            chain,
        } => WiregraphError::CircularDependency {
            claim: claim.clone(),
            chain: chain.clone(),
        },
        WiregraphError::RoundRestartRequired {
            claim,
            requester,
            extension,
        } => WiregraphError::RoundRestartRequired {
            claim: claim.clone(),
            requester: requester.clone(),
            extension: extension.clone(),
        },
        WiregraphError::RoundLimitExceeded {
            claim,
            extension,
            rounds,
        } => WiregraphError::RoundLimitExceeded {
            claim: claim.clone(),
            extension: extension.clone(),
            rounds: *rounds,
        },
        WiregraphError::NoRootComponents => WiregraphError::NoRootComponents,
        WiregraphError::ResolutionLimitExceeded {
            claim,
            limit,
        } => WiregraphError::ResolutionLimitExceeded {
            claim: claim.clone(),
            limit: *limit,
        },
        WiregraphError::InvalidDeclaration {
            name,
            reason,
        } => WiregraphError::InvalidDeclaration {
            name: name.clone(),
            reason: reason.clone(),
        },
        WiregraphError::TypeParseError {
            input,
            reason,
        } => WiregraphError::TypeParseError {
            input: input.clone(),
            reason: reason.clone(),
        },
        WiregraphError::CatalogParseError {
            file,
            reason,
        } => WiregraphError::CatalogParseError {
            file: file.clone(),
            reason: reason.clone(),
        },
        WiregraphError::ConfigError {
            message,
        } => WiregraphError::ConfigError {
            message: message.clone(),
        },
        WiregraphError::IoError(e) => WiregraphError::ConfigError {
            message: format!("IO error: {e}"),
        },
        WiregraphError::TomlError(e) => WiregraphError::ConfigError {
            message: format!("TOML parsing error: {e}"),
        },
    }
}
