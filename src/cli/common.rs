//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::{CatalogManifest, ManifestSource};
use crate::config::ResolverConfig;
use crate::plan::ConstructionPlan;
use crate::resolver::{GraphResolver, RoundDriver};

/// Load `path` and resolve it over as many rounds as its extensions need.
///
/// The catalog's `[resolver]` table overrides `base`.
pub async fn resolve_catalog(path: &Path, base: ResolverConfig) -> Result<ConstructionPlan> {
    let manifest = CatalogManifest::load(path).await?;
    let config = manifest.resolver_config(base);
    config.validate().with_context(|| format!("Invalid [resolver] table in {}", path.display()))?;

    let resolver = GraphResolver::new(manifest.universe())
        .with_config(config)
        .with_extensions(manifest.extensions())
        .with_hints(manifest.hints.clone());
    let mut source = ManifestSource::new(manifest.clone());
    let plan = RoundDriver::new(&resolver).run(&mut source)?;
    tracing::debug!("Resolved {} into {} component(s)", path.display(), plan.len());
    Ok(plan)
}
