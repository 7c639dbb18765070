//! Integration tests for the `wiregraph tree` command.

use predicates::prelude::*;
use tempfile::TempDir;
use wiregraph::test_utils::CatalogFixture;

use super::wiregraph;

#[test]
fn test_tree_shows_roots() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("tree")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog.toml"))
        .stdout(predicate::str::contains("└── [3] app: App"))
        .stdout(predicate::str::contains("    └── [2] service: UserService"))
        .stdout(predicate::str::contains("[1] repo: JdbcUserRepository"))
        .stdout(predicate::str::contains("(shown above)"));
}

#[test]
fn test_tree_single_component() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .args(["tree", "--component", "repo"])
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("└── [1] repo: JdbcUserRepository"))
        .stdout(predicate::str::contains("    └── [0] Clock: Clock"))
        .stdout(predicate::str::contains("app: App").not());
}

#[test]
fn test_tree_proxy_breaks_cycle() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::interface_cycle().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("tree")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("└── [2] bus: EventBus"))
        .stdout(predicate::str::contains("└── [1] listener: Listener"))
        .stdout(predicate::str::contains("[0] bus$PromisedProxy"));
}

#[test]
fn test_tree_unknown_component_fails() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .args(["tree", "-p", "nope"])
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Component 'nope' is not part of the resolved plan"));
}
