//! Resolve a catalog into a construction plan.
//!
//! # Output Formats
//!
//! ## Text (default)
//! ```text
//! Resolved 3 component(s) in 1 round(s)
//!   [0] c: C
//!   [1] b: B
//!       ref → [0] c
//!   [2] app: App (root)
//!       ref → [1] b
//! Fingerprint: sha256:4f1c...
//! ```
//!
//! ## JSON
//! The serialized [`ConstructionPlan`], suitable for code generators.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::common::resolve_catalog;
use crate::config::ResolverConfig;
use crate::plan::{ConstructionPlan, DependencyEdge};

#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Catalog file to resolve
    catalog: PathBuf,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    format: String,

    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ResolveCommand {
    pub async fn execute(self, config: ResolverConfig) -> Result<()> {
        self.validate_arguments()?;
        let plan = resolve_catalog(&self.catalog, config).await?;

        let rendered = match self.format.as_str() {
            "json" => plan.to_json().context("Failed to serialize construction plan")?,
            _ => render_text(&plan),
        };

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, format!("{rendered}\n"))
                    .await
                    .with_context(|| format!("Failed to write plan to {}", path.display()))?;
                println!("{} Wrote {} component(s) to {}", "✓".green(), plan.len(), path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "text" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!("Invalid format '{}'. Valid formats are: text, json", self.format)),
        }
    }
}

fn render_text(plan: &ConstructionPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Resolved {} component(s) in {} round(s)", plan.len(), plan.rounds);

    for component in &plan.components {
        let root = if component.root {
            " (root)".cyan().to_string()
        } else {
            String::new()
        };
        let _ = writeln!(out, "  [{}] {}: {}{}", component.index, component.name.bold(), component.ty, root);
        for edge in &component.dependencies {
            let _ = writeln!(out, "      {}", describe_edge(plan, edge));
        }
        if !component.interceptors.is_empty() {
            let names: Vec<String> = component.interceptors.iter().map(|i| format!("[{i}]")).collect();
            let _ = writeln!(out, "      intercepted by {}", names.join(", "));
        }
    }
    let _ = write!(out, "Fingerprint: {}", plan.fingerprint().dimmed());
    out
}

fn describe_edge(plan: &ConstructionPlan, edge: &DependencyEdge) -> String {
    let name_of = |index: usize| plan.get(index).map_or("?", |c| c.name.as_str());
    match edge {
        DependencyEdge::Reference {
            target,
            ..
        }
        | DependencyEdge::ValueOf {
            target,
            ..
        }
        | DependencyEdge::PromiseOf {
            target,
            ..
        } => format!("{} → [{}] {}", edge.label(), target.index, name_of(target.index)),
        DependencyEdge::AllOf {
            targets,
            claim,
        } => {
            let indexes: Vec<String> = targets.iter().map(|t| format!("[{}]", t.index)).collect();
            format!("all-of {} → {{{}}}", claim.ty, indexes.join(", "))
        }
        DependencyEdge::Absent {
            claim,
        } => format!("absent {}", claim.ty).yellow().to_string(),
        DependencyEdge::TypeToken {
            claim,
        } => format!("type-token {}", claim.ty),
        DependencyEdge::ProxyParameter {
            target,
            ..
        } => match target {
            Some(index) => format!("proxy ⇢ [{index}] {}", name_of(*index)),
            None => "proxy ⇢ (unbound)".to_string(),
        },
    }
}
