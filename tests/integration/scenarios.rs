//! End-to-end resolution scenarios expressed as catalog files.

use wiregraph::catalog::{CatalogManifest, ManifestSource};
use wiregraph::config::ResolverConfig;
use wiregraph::core::WiregraphError;
use wiregraph::model::DeclarationOrigin;
use wiregraph::plan::{ConstructionPlan, DependencyEdge, PlanGraph};
use wiregraph::resolver::{GraphResolver, RoundDriver};
use wiregraph::test_utils::{CatalogFixture, init_test_logging};

fn resolve(content: &str) -> Result<ConstructionPlan, WiregraphError> {
    init_test_logging(None);
    let manifest = CatalogManifest::parse(content, "scenario.toml")?;
    let resolver = GraphResolver::new(manifest.universe())
        .with_config(manifest.resolver_config(ResolverConfig::default()))
        .with_extensions(manifest.extensions())
        .with_hints(manifest.hints.clone());
    let mut source = ManifestSource::new(manifest.clone());
    RoundDriver::new(&resolver).run(&mut source)
}

fn targets(plan: &ConstructionPlan, component: &str) -> Vec<Vec<usize>> {
    plan.find(component).unwrap().dependencies.iter().map(DependencyEdge::construction_targets).collect()
}

fn assert_well_formed(plan: &ConstructionPlan) {
    let graph = PlanGraph::from_plan(plan);
    assert!(graph.detect_cycles().is_ok());
    assert!(graph.monotonicity_violations().is_empty());
    for (i, component) in plan.components.iter().enumerate() {
        assert_eq!(component.index, i);
    }
}

const PLUGINS: &str = r#"
[types.Plugin]
kind = "interface"

[types.AuditPlugin]
supertypes = ["Plugin"]

[types.MetricsPlugin]
supertypes = ["Plugin"]

[[components]]
name = "host"
type = "Host"
root = true
claims = [
    { type = "Plugin", kind = "all" },
    { type = "Missing", kind = "nullable" },
    { type = "Widget", kind = "all" },
    { type = "Host", kind = "type-ref" },
]

[[components]]
name = "audit"
type = "AuditPlugin"

[[components]]
name = "metrics"
type = "MetricsPlugin"
"#;

#[test]
fn test_collections_nullable_and_type_tokens() {
    let plan = resolve(PLUGINS).unwrap();
    assert_well_formed(&plan);

    assert_eq!(plan.order(), vec!["audit", "metrics", "host"]);
    let host = plan.find("host").unwrap();
    assert!(matches!(&host.dependencies[0], DependencyEdge::AllOf { targets, .. } if targets.len() == 2));
    assert_eq!(targets(&plan, "host")[0], vec![0, 1]);
    assert!(matches!(host.dependencies[1], DependencyEdge::Absent { .. }));
    assert!(matches!(&host.dependencies[2], DependencyEdge::AllOf { targets, .. } if targets.is_empty()));
    assert!(matches!(host.dependencies[3], DependencyEdge::TypeToken { .. }));
}

const CACHES: &str = r#"
[types.Cache]
kind = "interface"

[types.RedisCache]
supertypes = ["Cache"]

[types.MemoryCache]
supertypes = ["Cache"]

[[components]]
name = "app"
type = "App"
root = true
claims = [{ type = "Cache" }, { type = "Cache", tags = ["fast"] }]

[[components]]
name = "memory"
type = "MemoryCache"
default = true

[[components]]
name = "redis"
type = "RedisCache"

[[components]]
name = "local"
type = "MemoryCache"
tags = ["fast"]
"#;

#[test]
fn test_tags_and_default_override() {
    let plan = resolve(CACHES).unwrap();
    assert_well_formed(&plan);

    assert_eq!(plan.order(), vec!["redis", "local", "app"]);
    assert_eq!(targets(&plan, "app"), vec![vec![0], vec![1]]);
    assert!(plan.find("memory").is_none());
}

const REPOSITORIES: &str = r#"
[types.Repository]
kind = "interface"
params = ["E"]

[types.JdbcRepository]
kind = "open"
params = ["E"]
supertypes = ["Repository<E>"]

[types.MongoRepository]
kind = "open"
params = ["E"]
supertypes = ["Repository<E>"]

[[components]]
name = "app"
type = "App"
root = true
claims = [{ type = "Repository<User>" }]

[[components]]
name = "jdbc"
type = "JdbcRepository<T>"
type_params = ["T"]

[[components]]
name = "mongo"
type = "MongoRepository<T>"
type_params = ["T"]
"#;

#[test]
fn test_competing_templates_are_ambiguous() {
    let err = resolve(REPOSITORIES).unwrap_err();
    match err {
        WiregraphError::AmbiguousDependency {
            candidates,
            ..
        } => {
            assert_eq!(candidates.len(), 2);
            let joined = candidates.join("\n");
            assert!(joined.contains("jdbc<User>"));
            assert!(joined.contains("mongo<User>"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_exact_template_match_wins() {
    let catalog = format!(
        "{REPOSITORIES}\n[[components]]\nname = \"generic\"\ntype = \"Repository<T>\"\ntype_params = [\"T\"]\n"
    );
    let plan = resolve(&catalog).unwrap();
    assert_well_formed(&plan);

    assert_eq!(plan.order(), vec!["generic<User>", "app"]);
    assert_eq!(plan.components[0].ty.to_string(), "Repository<User>");
    assert!(matches!(plan.components[0].origin, DeclarationOrigin::TemplateInstance { .. }));
}

#[test]
fn test_default_template_loses_to_non_default() {
    let catalog = REPOSITORIES.replacen(
        "name = \"mongo\"\ntype = \"MongoRepository<T>\"\ntype_params = [\"T\"]",
        "name = \"mongo\"\ntype = \"MongoRepository<T>\"\ntype_params = [\"T\"]\ndefault = true",
        1,
    );
    let plan = resolve(&catalog).unwrap();
    assert_eq!(plan.order(), vec!["jdbc<User>", "app"]);
}

const INTERCEPTED: &str = r#"
[types.Service]
kind = "interface"

[types.UserService]
supertypes = ["Service"]

[types.Tracing]
intercepts = "Service"

[[components]]
name = "service"
type = "UserService"
root = true

[[components]]
name = "tracing"
type = "Tracing"
"#;

#[test]
fn test_interceptors_are_bound() {
    let plan = resolve(INTERCEPTED).unwrap();
    assert_well_formed(&plan);

    assert_eq!(plan.order(), vec!["tracing", "service"]);
    assert_eq!(plan.find("service").unwrap().interceptors, vec![0]);
}

#[test]
fn test_interface_cycle_gets_one_proxy() {
    let plan = resolve(&CatalogFixture::interface_cycle().content).unwrap();
    assert_well_formed(&plan);

    assert_eq!(plan.order(), vec!["bus$PromisedProxy", "listener", "bus"]);
    let proxies: Vec<_> =
        plan.components.iter().filter(|c| matches!(c.origin, DeclarationOrigin::PromisedProxy { .. })).collect();
    assert_eq!(proxies.len(), 1);
    match proxies[0].dependencies.as_slice() {
        [DependencyEdge::ProxyParameter {
            target,
            ..
        }] => assert_eq!(*target, Some(2)),
        other => panic!("unexpected proxy edges {other:?}"),
    }
    assert_eq!(targets(&plan, "listener"), vec![vec![0]]);
}

#[test]
fn test_final_cycle_names_the_chain() {
    let err = resolve(&CatalogFixture::final_cycle().content).unwrap_err();
    match err {
        WiregraphError::CircularDependency {
            claim,
            chain,
        } => {
            assert!(claim.contains("(required)"));
            assert!(chain.iter().any(|c| c.starts_with("a: A")));
            assert!(chain.iter().any(|c| c.starts_with("b: B")));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_shared_dependency_is_resolved_once() {
    let plan = resolve(&CatalogFixture::layered().content).unwrap();
    assert_well_formed(&plan);

    assert_eq!(plan.components.iter().filter(|c| c.name == "Clock").count(), 1);
    assert_eq!(targets(&plan, "repo"), vec![vec![0]]);
    assert_eq!(targets(&plan, "service"), vec![vec![1], vec![0]]);
    assert!(matches!(plan.find("repo").unwrap().dependencies[0], DependencyEdge::ValueOf { .. }));
}

#[test]
fn test_resolution_is_deterministic() {
    for fixture in [CatalogFixture::layered(), CatalogFixture::interface_cycle(), CatalogFixture::generated_extension()] {
        let first = resolve(&fixture.content).unwrap();
        let second = resolve(&fixture.content).unwrap();
        assert_eq!(first, second, "{} differs between runs", fixture.name);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }
}

#[test]
fn test_no_roots() {
    let err = resolve("[[components]]\nname = \"a\"\ntype = \"A\"\n").unwrap_err();
    assert!(matches!(err, WiregraphError::NoRootComponents));
}
