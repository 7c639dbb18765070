//! Catalog files resolved through `ManifestSource` and the round driver.

use tempfile::TempDir;
use wiregraph::catalog::{CatalogManifest, ManifestSource};
use wiregraph::config::ResolverConfig;
use wiregraph::core::WiregraphError;
use wiregraph::model::DeclarationOrigin;
use wiregraph::plan::ConstructionPlan;
use wiregraph::resolver::{GraphResolver, RoundDriver};
use wiregraph::test_utils::{CatalogFixture, init_test_logging};

async fn load(fixture: &CatalogFixture) -> (TempDir, CatalogManifest) {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let path = fixture.write_to(temp.path()).unwrap();
    let manifest = CatalogManifest::load(&path).await.unwrap();
    (temp, manifest)
}

fn drive(manifest: CatalogManifest, config: ResolverConfig) -> Result<ConstructionPlan, WiregraphError> {
    let config = manifest.resolver_config(config);
    let resolver = GraphResolver::new(manifest.universe())
        .with_config(config)
        .with_extensions(manifest.extensions())
        .with_hints(manifest.hints.clone());
    let mut source = ManifestSource::new(manifest.clone());
    RoundDriver::new(&resolver).run(&mut source)
}

#[tokio::test]
async fn test_layered_catalog_orders_dependencies_first() {
    let (_temp, manifest) = load(&CatalogFixture::layered()).await;
    let plan = drive(manifest, ResolverConfig::default()).unwrap();

    assert_eq!(plan.order(), vec!["Clock", "repo", "service", "app"]);
    assert_eq!(plan.rounds, 1);
    assert_eq!(plan.find("Clock").unwrap().origin, DeclarationOrigin::DiscoveredFinal);
    assert_eq!(plan.find("repo").unwrap().origin, DeclarationOrigin::Annotated);
}

#[tokio::test]
async fn test_generating_extension_takes_two_rounds() {
    let (_temp, manifest) = load(&CatalogFixture::generated_extension()).await;
    let plan = drive(manifest, ResolverConfig::default()).unwrap();

    assert_eq!(plan.rounds, 2);
    assert_eq!(plan.order(), vec!["json-reader<User>", "app"]);
    assert!(matches!(
        plan.components[0].origin,
        DeclarationOrigin::TemplateInstance { .. }
    ));
}

#[tokio::test]
async fn test_round_limit_from_catalog_overrides() {
    let mut fixture = CatalogFixture::generated_extension();
    fixture.content = format!("[resolver]\nmax_rounds = 1\n\n{}", fixture.content);
    let (_temp, manifest) = load(&fixture).await;

    let err = drive(manifest, ResolverConfig::default()).unwrap_err();
    match err {
        WiregraphError::RoundLimitExceeded {
            extension,
            rounds,
            ..
        } => {
            assert_eq!(extension, "json");
            assert_eq!(rounds, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_unresolved_catalog_reports_hints() {
    let (_temp, manifest) = load(&CatalogFixture::unresolved()).await;
    let err = drive(manifest, ResolverConfig::default()).unwrap_err();

    match &err {
        WiregraphError::UnresolvedDependency {
            requester,
            hints,
            ..
        } => {
            assert!(requester.starts_with("app"));
            assert!(hints.contains(&"Did you mean `DataSource`?".to_string()));
            assert!(hints.contains(&"Add the `jdbc` module to provide a data source".to_string()));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.is_unresolved());
}

#[tokio::test]
async fn test_load_reports_syntax_errors_with_path() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let path = CatalogFixture::invalid_syntax().write_to(temp.path()).unwrap();

    let err = CatalogManifest::load(&path).await.unwrap_err();
    let wg = err.downcast_ref::<WiregraphError>().unwrap();
    assert!(matches!(wg, WiregraphError::CatalogParseError { .. }));
}

#[tokio::test]
async fn test_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = CatalogManifest::load(&temp.path().join("nope.toml")).await.unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
}
