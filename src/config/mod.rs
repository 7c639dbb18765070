//! Resolver configuration
//!
//! Settings are read from a TOML file. Lookup order:
//!
//! 1. An explicit path (`--config`)
//! 2. The `WIREGRAPH_CONFIG` environment variable
//! 3. `~/.wiregraph/config.toml` (`%LOCALAPPDATA%\wiregraph\config.toml` on Windows)
//!
//! A missing file is not an error; defaults apply. A catalog file may carry a
//! `[resolver]` table whose values override the loaded configuration, see
//! [`ResolverOverrides`].
//!
//! ```toml
//! max_rounds = 8
//! max_fork_depth = 16
//! proxy_tag = "wiregraph.PromisedProxy"
//!
//! [hints]
//! enabled = true
//! similarity_threshold = 0.85
//! max_suggestions = 3
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_MAX_FORK_DEPTH, DEFAULT_MAX_ROUNDS, DEFAULT_MAX_SUGGESTIONS,
    DEFAULT_PROXY_TAG, DEFAULT_SIMILARITY_THRESHOLD,
};

const fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

const fn default_max_fork_depth() -> usize {
    DEFAULT_MAX_FORK_DEPTH
}

fn default_proxy_tag() -> String {
    DEFAULT_PROXY_TAG.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

const fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

/// Tunables of the resolution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Rounds to attempt before giving up on extensions that keep requesting restarts.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Maximum nesting of template ambiguity forks.
    #[serde(default = "default_max_fork_depth")]
    pub max_fork_depth: usize,

    /// Tag carried by synthesized cycle proxies.
    #[serde(default = "default_proxy_tag")]
    pub proxy_tag: String,

    /// Diagnostics attached to unresolved-dependency errors.
    #[serde(default)]
    pub hints: HintConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            max_fork_depth: default_max_fork_depth(),
            proxy_tag: default_proxy_tag(),
            hints: HintConfig::default(),
        }
    }
}

/// Settings for unresolved-dependency hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum Jaro-Winkler similarity for "did you mean" suggestions.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: default_similarity_threshold(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Partial configuration embedded in a catalog file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverOverrides {
    pub max_rounds: Option<u32>,
    pub max_fork_depth: Option<usize>,
    pub proxy_tag: Option<String>,
    pub hints: Option<HintOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HintOverrides {
    pub enabled: Option<bool>,
    pub similarity_threshold: Option<f64>,
    pub max_suggestions: Option<usize>,
}

impl ResolverOverrides {
    /// Overwrite every field of `config` that is set here.
    pub fn apply_to(&self, config: &mut ResolverConfig) {
        if let Some(max_rounds) = self.max_rounds {
            config.max_rounds = max_rounds;
        }
        if let Some(depth) = self.max_fork_depth {
            config.max_fork_depth = depth;
        }
        if let Some(tag) = &self.proxy_tag {
            config.proxy_tag.clone_from(tag);
        }
        if let Some(hints) = &self.hints {
            if let Some(enabled) = hints.enabled {
                config.hints.enabled = enabled;
            }
            if let Some(threshold) = hints.similarity_threshold {
                config.hints.similarity_threshold = threshold;
            }
            if let Some(max) = hints.max_suggestions {
                config.hints.max_suggestions = max;
            }
        }
    }
}

impl ResolverConfig {
    /// Load from the environment-selected or default location.
    pub async fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path()?,
        };
        Self::load_or_default(&path).await
    }

    /// Load from `path` if given, otherwise as [`load`](Self::load) does.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => Self::load().await,
        }
    }

    /// Load from `path`; a missing file yields defaults.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load_from(path).await
        } else {
            debug!("No resolver config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file, which must exist.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read resolver config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse resolver config from {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid resolver config in {}", path.display()))?;
        debug!("Loaded resolver config from {}", path.display());
        Ok(config)
    }

    /// Platform-specific default config location.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("wiregraph")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".wiregraph")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            anyhow::bail!("max_rounds must be at least 1");
        }
        if self.proxy_tag.trim().is_empty() {
            anyhow::bail!("proxy_tag must not be empty");
        }
        if !(0.0..=1.0).contains(&self.hints.similarity_threshold) {
            anyhow::bail!(
                "hints.similarity_threshold must be between 0 and 1, got {}",
                self.hints.similarity_threshold
            );
        }
        Ok(())
    }
}
