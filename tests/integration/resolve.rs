//! Integration tests for the `wiregraph resolve` command.

use predicates::prelude::*;
use tempfile::TempDir;
use wiregraph::plan::ConstructionPlan;
use wiregraph::test_utils::CatalogFixture;

use super::wiregraph;

#[test]
fn test_resolve_prints_plan() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved 4 component(s) in 1 round(s)"))
        .stdout(predicate::str::contains("[0] Clock: Clock"))
        .stdout(predicate::str::contains("[3] app: App (root)"))
        .stdout(predicate::str::contains("ref → [2] service"))
        .stdout(predicate::str::contains("Fingerprint: sha256:"));
}

#[test]
fn test_resolve_json_to_file() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();
    let output = temp.path().join("plan.json");

    wiregraph(temp.path())
        .args(["resolve", "--format", "json", "--output"])
        .arg(&output)
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 component(s)"));

    let content = std::fs::read_to_string(&output).unwrap();
    let plan: ConstructionPlan = serde_json::from_str(&content).unwrap();
    assert_eq!(plan.order(), vec!["Clock", "repo", "service", "app"]);
    assert_eq!(plan.rounds, 1);
}

#[test]
fn test_resolve_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::interface_cycle().write_to(temp.path()).unwrap();

    let run = || {
        let output = wiregraph(temp.path()).args(["resolve", "-f", "json"]).arg(&catalog).output().unwrap();
        assert!(output.status.success());
        output.stdout
    };
    let first = run();
    assert_eq!(first, run());

    let plan: ConstructionPlan = serde_json::from_slice(&first).unwrap();
    assert_eq!(plan.order(), vec!["bus$PromisedProxy", "listener", "bus"]);
}

#[test]
fn test_resolve_generated_extension_needs_two_rounds() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::generated_extension().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved 2 component(s) in 2 round(s)"))
        .stdout(predicate::str::contains("json-reader<User>: JsonReader<User>"));
}

#[test]
fn test_resolve_final_cycle_fails() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::final_cycle().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency detected"))
        .stderr(predicate::str::contains("through claim A (required)"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_resolve_unresolved_shows_hints() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::unresolved().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Required dependency was not found"))
        .stderr(predicate::str::contains("Did you mean `DataSource`?"))
        .stderr(predicate::str::contains("Add the `jdbc` module to provide a data source"));
}

#[test]
fn test_resolve_invalid_catalog_fails() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::invalid_syntax().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid catalog file"));
}

#[test]
fn test_resolve_missing_catalog_fails() {
    let temp = TempDir::new().unwrap();

    wiregraph(temp.path())
        .args(["resolve", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn test_resolve_rejects_unknown_format() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .args(["resolve", "--format", "yaml"])
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format 'yaml'"));
}
