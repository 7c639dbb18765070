//! Global constants used throughout the wiregraph codebase.
//!
//! Defaults for the resolver configuration and well-known names live here so
//! that the engine, the configuration layer and the CLI agree on them.

/// Environment variable pointing at a resolver configuration file.
pub const CONFIG_ENV_VAR: &str = "WIREGRAPH_CONFIG";

/// Default number of processing rounds before extensions are considered stuck.
pub const DEFAULT_MAX_ROUNDS: u32 = 8;

/// Default nesting limit for template ambiguity forks.
pub const DEFAULT_MAX_FORK_DEPTH: usize = 16;

/// Tag carried by synthesized cycle-breaking proxies.
pub const DEFAULT_PROXY_TAG: &str = "wiregraph.PromisedProxy";

/// Minimum Jaro-Winkler similarity for type name suggestions.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Maximum number of "did you mean" suggestions per unresolved claim.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Suffix appended to a declaration name to name its cycle proxy.
pub const PROXY_NAME_SUFFIX: &str = "$PromisedProxy";

/// Deepest level rendered by the dependency tree before it is cut off.
pub const MAX_TREE_DEPTH: usize = 256;
