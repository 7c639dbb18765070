//! Graph queries over plans produced by the resolver.

use wiregraph::model::{ClaimKind, DeclarationDraft, TypeRef};
use wiregraph::oracle::{TypeInfo, TypeUniverse};
use wiregraph::plan::{ConstructionPlan, PlanGraph};
use wiregraph::resolver::GraphResolver;

fn ty(s: &str) -> TypeRef {
    s.parse().unwrap()
}

fn resolve(universe: &TypeUniverse, drafts: Vec<DeclarationDraft>) -> ConstructionPlan {
    GraphResolver::new(universe).resolve_declarations(drafts).unwrap()
}

fn diamond() -> ConstructionPlan {
    let universe = TypeUniverse::new().with("Clock", TypeInfo::final_type().constructor(Vec::new()));
    resolve(
        &universe,
        vec![
            DeclarationDraft::new("app", ty("App"))
                .needs(ty("Left"), ClaimKind::Required)
                .needs(ty("Right"), ClaimKind::Required)
                .root(),
            DeclarationDraft::new("left", ty("Left")).needs(ty("Clock"), ClaimKind::Required),
            DeclarationDraft::new("right", ty("Right")).needs(ty("Clock"), ClaimKind::Required),
        ],
    )
}

#[test]
fn test_resolved_plan_is_acyclic_and_monotone() {
    let plan = diamond();
    let graph = PlanGraph::from_plan(&plan);

    assert_eq!(plan.order(), vec!["Clock", "left", "right", "app"]);
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert!(graph.detect_cycles().is_ok());
    assert!(graph.monotonicity_violations().is_empty());
    assert_eq!(graph.topological_order().unwrap().len(), 4);
}

#[test]
fn test_dependency_queries() {
    let plan = diamond();
    let graph = PlanGraph::from_plan(&plan);
    let app = plan.find("app").unwrap().index;
    let clock = plan.find("Clock").unwrap().index;

    assert_eq!(graph.direct_deps(app), vec![1, 2]);
    assert_eq!(graph.transitive_deps(app).into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(graph.dependents(clock), vec![1, 2]);
    assert!(graph.dependents(app).is_empty());
}

#[test]
fn test_tree_marks_repeated_components() {
    let plan = diamond();
    let graph = PlanGraph::from_plan(&plan);
    let tree = graph.to_tree_string(plan.find("app").unwrap().index);

    assert!(tree.starts_with("└── [3] app: App\n"));
    assert!(tree.contains("├── [1] left: Left"));
    assert!(tree.contains("└── [2] right: Right"));
    assert_eq!(tree.matches("[0] Clock: Clock").count(), 2);
    assert!(tree.contains("(shown above)"));
}

#[test]
fn test_fingerprint_tracks_plan_content() {
    let first = diamond();
    let second = diamond();
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.fingerprint().starts_with("sha256:"));

    let mut renamed = diamond();
    renamed.components[1].name = "left2".into();
    assert_ne!(first.fingerprint(), renamed.fingerprint());
}
