//! Display dependency trees of a resolved catalog.
//!
//! Shows each root (or the component given with `--component`) with its
//! construction dependencies, similar to `cargo tree`. Components reached a
//! second time are marked `(shown above)`.
//!
//! ```text
//! └── [2] app: App
//!     ├── [0] clock: Clock
//!     └── [1] repo: UserRepository
//!         └── [0] clock: Clock
//!             └── (shown above)
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::resolve_catalog;
use crate::config::ResolverConfig;
use crate::plan::PlanGraph;

#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Catalog file to resolve
    catalog: PathBuf,

    /// Show the tree of this component only
    #[arg(short = 'p', long)]
    component: Option<String>,
}

impl TreeCommand {
    pub async fn execute(self, config: ResolverConfig) -> Result<()> {
        let plan = resolve_catalog(&self.catalog, config).await?;
        let graph = PlanGraph::from_plan(&plan);

        let starts: Vec<usize> = match &self.component {
            Some(name) => {
                let component = plan.find(name).ok_or_else(|| {
                    anyhow::anyhow!("Component '{}' is not part of the resolved plan", name)
                })?;
                vec![component.index]
            }
            None => plan.roots().map(|c| c.index).collect(),
        };

        println!("{}", self.catalog.display().to_string().bold());
        for index in starts {
            print!("{}", graph.to_tree_string(index));
        }
        Ok(())
    }
}
