//! TOML catalog files.
//!
//! A catalog file describes everything one resolution needs: the type
//! universe, the component declarations, optional resolver overrides, module
//! hints and extensions that generate components on demand.
//!
//! # Format
//!
//! ```toml
//! [resolver]
//! max_rounds = 4
//!
//! [types.UserRepository]
//! kind = "interface"
//!
//! [types.JdbcRepository]
//! kind = "open"
//! params = ["E"]
//! supertypes = ["UserRepository"]
//!
//! [[components]]
//! name = "app"
//! type = "App"
//! root = true
//! claims = [{ type = "UserRepository" }, { type = "Plugin", kind = "all" }]
//!
//! [[components]]
//! name = "jdbc"
//! type = "JdbcRepository<T>"
//! type_params = ["T"]
//! module = "persistence"
//!
//! [[extensions]]
//! name = "json"
//! type = "JsonReader<T>"
//! type_params = ["T"]
//! generate = true
//! component = { name = "json-reader", type = "JsonReader<T>", type_params = ["T"] }
//!
//! [[hints]]
//! type = "DataSource"
//! message = "Add the `jdbc` module to provide a DataSource"
//! ```
//!
//! # Extensions
//!
//! Each `[[extensions]]` entry becomes a [`ManifestExtension`] that answers
//! claims whose type matches its `type` pattern:
//!
//! - without `generate`, it returns its `component` declaration directly
//! - with `generate = true`, it asks for a new round; [`ManifestSource`] then
//!   makes the component visible to every later discovery, as if a code
//!   generator had produced it

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::Discovery;
use crate::config::{ResolverConfig, ResolverOverrides};
use crate::core::{Result, WiregraphError};
use crate::extension::{Extension, ExtensionContext, ExtensionResult, Extensions};
use crate::model::{DeclarationDraft, DeclarationOrigin, DependencyClaim, Substitution, TagSet, TypeRef};
use crate::oracle::TypeUniverse;
use crate::resolver::{DeclarationSource, ModuleHint, RestartRequest, match_structure};

/// One `[[components]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<DependencyClaim>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub root: bool,
    /// Module providing the component through a factory method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl ComponentSpec {
    pub fn to_draft(&self) -> DeclarationDraft {
        let origin = match &self.module {
            Some(module) => DeclarationOrigin::Module {
                module: module.clone(),
            },
            None => DeclarationOrigin::Annotated,
        };
        let mut draft = DeclarationDraft::new(self.name.clone(), self.ty.clone())
            .tags(self.tags.clone())
            .claims(self.claims.iter().cloned())
            .type_params(self.type_params.iter().cloned())
            .origin(origin);
        if self.default {
            draft = draft.default_component();
        }
        if self.root {
            draft = draft.root();
        }
        draft
    }
}

/// One `[[extensions]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionSpec {
    pub name: String,
    /// Claimed types this extension answers for; may contain `type_params`.
    #[serde(rename = "type")]
    pub pattern: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Request a new round before the component becomes visible.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generate: bool,
    pub component: ComponentSpec,
}

impl ExtensionSpec {
    fn pattern(&self) -> TypeRef {
        self.pattern.clone().bind_params(&self.type_params)
    }

    fn draft(&self) -> DeclarationDraft {
        self.component.to_draft().origin(DeclarationOrigin::Extension {
            extension: self.name.clone(),
        })
    }
}

/// A parsed catalog file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverOverrides>,
    #[serde(default, skip_serializing_if = "TypeUniverse::is_empty")]
    pub types: TypeUniverse,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<ModuleHint>,
}

impl CatalogManifest {
    /// Load, parse and validate a catalog file.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let manifest = Self::parse(&content, &path.display().to_string()).with_context(|| {
            format!(
                "Invalid catalog file: {}\n\n\
                Common catalog errors:\n\
                - Type expressions with unbalanced angle brackets\n\
                - Unknown keys in [[components]] or [resolver]\n\
                - Type parameters that do not occur in the component type",
                path.display()
            )
        })?;
        tracing::debug!(
            "Loaded catalog {} with {} component(s), {} type(s) and {} extension(s)",
            path.display(),
            manifest.components.len(),
            manifest.types.len(),
            manifest.extensions.len()
        );
        Ok(manifest)
    }

    /// Parse and validate catalog text; `file` only labels errors.
    pub fn parse(content: &str, file: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| WiregraphError::CatalogParseError {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
        manifest.validate().map_err(|e| WiregraphError::CatalogParseError {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
        Ok(manifest)
    }

    /// Check names and declarations without resolving anything.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for component in &self.components {
            if !names.insert(component.name.as_str()) {
                return Err(WiregraphError::InvalidDeclaration {
                    name: component.name.clone(),
                    reason: "duplicate component name".to_string(),
                });
            }
            component.to_draft().validate()?;
        }

        let mut extension_names = HashSet::new();
        for extension in &self.extensions {
            if extension.name.trim().is_empty() || !extension_names.insert(extension.name.as_str()) {
                return Err(WiregraphError::InvalidDeclaration {
                    name: extension.name.clone(),
                    reason: "extension names must be unique and non-empty".to_string(),
                });
            }
            let pattern_vars = extension.pattern().type_vars();
            if let Some(unused) = extension.type_params.iter().find(|p| !pattern_vars.contains(p)) {
                return Err(WiregraphError::InvalidDeclaration {
                    name: extension.name.clone(),
                    reason: format!("type parameter `{unused}` does not occur in pattern {}", extension.pattern),
                });
            }
            extension.draft().validate()?;
        }
        Ok(())
    }

    pub const fn universe(&self) -> &TypeUniverse {
        &self.types
    }

    /// Declarations of every `[[components]]` entry, in file order.
    pub fn drafts(&self) -> Vec<DeclarationDraft> {
        self.components.iter().map(ComponentSpec::to_draft).collect()
    }

    /// `base` with this file's `[resolver]` overrides applied.
    pub fn resolver_config(&self, mut base: ResolverConfig) -> ResolverConfig {
        if let Some(overrides) = &self.resolver {
            overrides.apply_to(&mut base);
        }
        base
    }

    /// One [`ManifestExtension`] per `[[extensions]]` entry, in file order.
    pub fn extensions(&self) -> Extensions {
        let mut extensions = Extensions::new();
        for spec in &self.extensions {
            extensions.register(Box::new(ManifestExtension::new(spec.clone())));
        }
        extensions
    }
}

/// Extension backed by an `[[extensions]]` entry.
#[derive(Debug, Clone)]
pub struct ManifestExtension {
    spec: ExtensionSpec,
}

impl ManifestExtension {
    pub const fn new(spec: ExtensionSpec) -> Self {
        Self {
            spec,
        }
    }

    fn answers(&self, claim: &DependencyClaim) -> bool {
        let mut subst = Substitution::new();
        match_structure(&self.spec.pattern(), &claim.ty, &mut subst) && claim.tags_match(&self.spec.component.tags)
    }
}

impl Extension for ManifestExtension {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn resolve(&self, claim: &DependencyClaim, ctx: &ExtensionContext<'_>) -> Result<ExtensionResult> {
        if !self.answers(claim) {
            return Ok(ExtensionResult::NoOpinion);
        }
        if self.spec.generate {
            tracing::debug!(
                "Extension '{}' will generate {} for {} (round {})",
                self.spec.name,
                self.spec.component.name,
                ctx.requester,
                ctx.round + 1
            );
            return Ok(ExtensionResult::RequiresNewRound);
        }
        Ok(ExtensionResult::Declaration(self.spec.draft()))
    }
}

/// Round-aware [`DeclarationSource`] over a catalog file.
///
/// Components of generating extensions become part of every discovery after
/// the round in which they were requested.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    manifest: CatalogManifest,
    generated: BTreeSet<String>,
}

impl ManifestSource {
    pub const fn new(manifest: CatalogManifest) -> Self {
        Self {
            manifest,
            generated: BTreeSet::new(),
        }
    }

    /// Names of the extensions whose components were generated so far.
    pub fn generated(&self) -> impl Iterator<Item = &str> {
        self.generated.iter().map(String::as_str)
    }
}

impl DeclarationSource for ManifestSource {
    fn discover(&mut self, _round: u32) -> Result<Discovery> {
        let mut declarations = self.manifest.drafts();
        declarations.extend(
            self.manifest
                .extensions
                .iter()
                .filter(|e| self.generated.contains(&e.name))
                .map(ExtensionSpec::draft),
        );
        Ok(Discovery::new(declarations))
    }

    fn prepare_round(&mut self, request: &RestartRequest) -> Result<()> {
        let known = self.manifest.extensions.iter().any(|e| e.name == request.extension && e.generate);
        if known && self.generated.insert(request.extension.clone()) {
            tracing::debug!("Generated component of extension '{}'", request.extension);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimKind, DeclarationId};

    const CATALOG: &str = r#"
[resolver]
max_rounds = 3

[types.Repository]
kind = "interface"
params = ["E"]

[types.JdbcRepository]
kind = "open"
params = ["E"]
supertypes = ["Repository<E>"]

[[components]]
name = "app"
type = "App"
root = true
claims = [{ type = "Repository<User>" }, { type = "Plugin", kind = "all" }, { type = "JsonReader<User>" }]

[[components]]
name = "jdbc"
type = "JdbcRepository<T>"
type_params = ["T"]
module = "persistence"

[[extensions]]
name = "json"
type = "JsonReader<T>"
type_params = ["T"]
generate = true
component = { name = "json-reader", type = "JsonReader<T>", type_params = ["T"] }

[[hints]]
type = "DataSource"
message = "Add the jdbc module"
"#;

    #[test]
    fn test_parse_catalog() {
        let manifest = CatalogManifest::parse(CATALOG, "catalog.toml").unwrap();
        assert_eq!(manifest.components.len(), 2);
        assert_eq!(manifest.types.len(), 2);
        assert_eq!(manifest.hints.len(), 1);

        let drafts = manifest.drafts();
        assert!(drafts[0].root);
        assert_eq!(drafts[0].claims[1].kind, ClaimKind::All);
        assert!(drafts[1].is_template());
        assert_eq!(
            drafts[1].origin,
            DeclarationOrigin::Module {
                module: "persistence".into()
            }
        );

        let config = manifest.resolver_config(ResolverConfig::default());
        assert_eq!(config.max_rounds, 3);
        assert_eq!(manifest.extensions().names(), vec!["json"]);
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let err = CatalogManifest::parse("[[components]]\nname = \"a\"\ntype = \"List<\"\n", "broken.toml").unwrap_err();
        assert!(matches!(err, WiregraphError::CatalogParseError { ref file, .. } if file == "broken.toml"));

        let duplicate = r#"
[[components]]
name = "a"
type = "A"

[[components]]
name = "a"
type = "B"
"#;
        let err = CatalogManifest::parse(duplicate, "dup.toml").unwrap_err();
        assert!(err.to_string().contains("duplicate component name"));
    }

    #[test]
    fn test_generating_extension_requests_round_then_source_supplies_component() {
        let manifest = CatalogManifest::parse(CATALOG, "catalog.toml").unwrap();
        let extension = ManifestExtension::new(manifest.extensions[0].clone());
        let requester = DeclarationDraft::new("app", TypeRef::named("App")).into_declaration(DeclarationId(0));
        let ctx = ExtensionContext {
            oracle: manifest.universe(),
            requester: &requester,
            round: 0,
        };

        let claim = DependencyClaim::required("JsonReader<User>".parse().unwrap());
        assert_eq!(extension.resolve(&claim, &ctx).unwrap(), ExtensionResult::RequiresNewRound);
        let other = DependencyClaim::required("XmlReader<User>".parse().unwrap());
        assert_eq!(extension.resolve(&other, &ctx).unwrap(), ExtensionResult::NoOpinion);

        let mut source = ManifestSource::new(manifest);
        assert_eq!(source.discover(0).unwrap().declarations.len(), 2);
        source
            .prepare_round(&RestartRequest {
                claim,
                requester: requester.to_string(),
                extension: "json".into(),
                round: 0,
            })
            .unwrap();
        let discovery = source.discover(1).unwrap();
        assert_eq!(discovery.declarations.len(), 3);
        assert_eq!(discovery.declarations[2].name, "json-reader");
        assert_eq!(source.generated().collect::<Vec<_>>(), vec!["json"]);
    }
}
