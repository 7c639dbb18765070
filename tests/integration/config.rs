//! Integration tests for configuration files and global flags.

use predicates::prelude::*;
use tempfile::TempDir;
use wiregraph::test_utils::CatalogFixture;

use super::wiregraph;

#[test]
fn test_config_flag_limits_rounds() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::generated_extension().write_to(temp.path()).unwrap();
    let config = temp.path().join("resolver.toml");
    std::fs::write(&config, "max_rounds = 1\n").unwrap();

    wiregraph(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected to be generated by extension 'json'"))
        .stderr(predicate::str::contains("max_rounds"));
}

#[test]
fn test_env_config_is_used() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::unresolved().write_to(temp.path()).unwrap();
    let config = temp.path().join("resolver.toml");
    std::fs::write(&config, "[hints]\nenabled = false\n").unwrap();

    wiregraph(temp.path())
        .env("WIREGRAPH_CONFIG", &config)
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Required dependency was not found"))
        .stderr(predicate::str::contains("Did you mean").not());
}

#[test]
fn test_catalog_overrides_win_over_config_file() {
    let temp = TempDir::new().unwrap();
    let mut fixture = CatalogFixture::generated_extension();
    fixture.content = format!("[resolver]\nmax_rounds = 4\n\n{}", fixture.content);
    let catalog = fixture.write_to(temp.path()).unwrap();
    let config = temp.path().join("resolver.toml");
    std::fs::write(&config, "max_rounds = 1\n").unwrap();

    wiregraph(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("in 2 round(s)"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::layered().write_to(temp.path()).unwrap();
    let config = temp.path().join("resolver.toml");
    std::fs::write(&config, "max_rounds = 0\n").unwrap();

    wiregraph(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_rounds must be at least 1"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let temp = TempDir::new().unwrap();

    wiregraph(temp.path())
        .args(["--verbose", "--quiet", "resolve", "catalog.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_verbose_logs_rounds() {
    let temp = TempDir::new().unwrap();
    let catalog = CatalogFixture::generated_extension().write_to(temp.path()).unwrap();

    wiregraph(temp.path())
        .arg("--verbose")
        .arg("resolve")
        .arg(&catalog)
        .assert()
        .success()
        .stderr(predicate::str::contains("requested a new round"));
}
