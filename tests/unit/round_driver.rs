//! Round driver with hand-written declaration sources and extensions.

use wiregraph::catalog::Discovery;
use wiregraph::config::ResolverConfig;
use wiregraph::core::{Result, WiregraphError};
use wiregraph::extension::{Extension, ExtensionContext, ExtensionResult};
use wiregraph::model::{ClaimKind, DeclarationDraft, DependencyClaim, TypeRef};
use wiregraph::oracle::TypeUniverse;
use wiregraph::resolver::{DeclarationSource, GraphResolver, RestartRequest, RoundDriver};

fn ty(s: &str) -> TypeRef {
    s.parse().unwrap()
}

/// Asks for a new round whenever a `Reader` is claimed.
struct ReaderGenerator;

impl Extension for ReaderGenerator {
    fn name(&self) -> &str {
        "reader-generator"
    }

    fn resolve(&self, claim: &DependencyClaim, _ctx: &ExtensionContext<'_>) -> Result<ExtensionResult> {
        if claim.ty.name() == "Reader" {
            Ok(ExtensionResult::RequiresNewRound)
        } else {
            Ok(ExtensionResult::NoOpinion)
        }
    }
}

/// Emits the reader only once a restart was requested, unless `stuck`.
#[derive(Default)]
struct GeneratingSource {
    stuck: bool,
    generated: bool,
    requests: Vec<RestartRequest>,
    discovered: Vec<u32>,
}

impl DeclarationSource for GeneratingSource {
    fn discover(&mut self, round: u32) -> Result<Discovery> {
        self.discovered.push(round);
        let mut declarations = vec![DeclarationDraft::new("app", ty("App")).needs(ty("Reader"), ClaimKind::Required).root()];
        if self.generated {
            declarations.push(DeclarationDraft::new("reader", ty("Reader")));
        }
        Ok(Discovery::new(declarations))
    }

    fn prepare_round(&mut self, request: &RestartRequest) -> Result<()> {
        self.generated = !self.stuck;
        self.requests.push(request.clone());
        Ok(())
    }
}

#[test]
fn test_restart_then_resolve_in_second_round() {
    let universe = TypeUniverse::new();
    let resolver = GraphResolver::new(&universe).with_extension(Box::new(ReaderGenerator));
    let mut source = GeneratingSource::default();

    let plan = RoundDriver::new(&resolver).run(&mut source).unwrap();

    assert_eq!(plan.order(), vec!["reader", "app"]);
    assert_eq!(plan.rounds, 2);
    assert_eq!(source.discovered, vec![0, 1]);
    assert_eq!(source.requests.len(), 1);
    assert_eq!(source.requests[0].extension, "reader-generator");
    assert_eq!(source.requests[0].round, 0);
    assert_eq!(source.requests[0].claim.ty, ty("Reader"));
}

#[test]
fn test_stuck_extension_exhausts_rounds() {
    let universe = TypeUniverse::new();
    let config = ResolverConfig {
        max_rounds: 3,
        ..ResolverConfig::default()
    };
    let resolver = GraphResolver::new(&universe).with_config(config).with_extension(Box::new(ReaderGenerator));
    let mut source = GeneratingSource {
        stuck: true,
        ..GeneratingSource::default()
    };

    let err = RoundDriver::new(&resolver).run(&mut source).unwrap_err();

    assert!(matches!(
        err,
        WiregraphError::RoundLimitExceeded { ref extension, rounds: 3, .. } if extension == "reader-generator"
    ));
    assert_eq!(source.discovered, vec![0, 1, 2]);
}

#[test]
fn test_zero_rounds_is_a_configuration_error() {
    let universe = TypeUniverse::new();
    let config = ResolverConfig {
        max_rounds: 0,
        ..ResolverConfig::default()
    };
    let resolver = GraphResolver::new(&universe).with_config(config);
    let mut discovery = Discovery::new(vec![DeclarationDraft::new("app", ty("App")).root()]);

    let err = RoundDriver::new(&resolver).run(&mut discovery).unwrap_err();
    assert!(matches!(err, WiregraphError::ConfigError { .. }));
}

#[test]
fn test_static_discovery_resolves_in_one_round() {
    let universe = TypeUniverse::new();
    let resolver = GraphResolver::new(&universe);
    let mut discovery = Discovery::new(vec![
        DeclarationDraft::new("app", ty("App")).needs(ty("Reader"), ClaimKind::Required).root(),
        DeclarationDraft::new("reader", ty("Reader")),
    ]);

    let plan = RoundDriver::new(&resolver).run(&mut discovery).unwrap();
    assert_eq!(plan.rounds, 1);
    assert_eq!(plan.len(), 2);
}

#[test]
fn test_unresolved_errors_pass_through_the_driver() {
    let universe = TypeUniverse::new();
    let resolver = GraphResolver::new(&universe);
    let mut discovery =
        Discovery::new(vec![DeclarationDraft::new("app", ty("App")).needs(ty("Reader"), ClaimKind::Required).root()]);

    let err = RoundDriver::new(&resolver).run(&mut discovery).unwrap_err();
    assert!(err.is_unresolved());
}
