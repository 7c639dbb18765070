//! Resolver configuration lookup through `WIREGRAPH_CONFIG`.

use serial_test::serial;
use tempfile::TempDir;
use wiregraph::config::ResolverConfig;
use wiregraph::constants::CONFIG_ENV_VAR;

struct EnvGuard {
    previous: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(value: &std::path::Path) -> Self {
        let previous = std::env::var_os(CONFIG_ENV_VAR);
        // SAFETY: tests touching the environment are serialized
        unsafe { std::env::set_var(CONFIG_ENV_VAR, value) };
        Self {
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: tests touching the environment are serialized
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(CONFIG_ENV_VAR, value),
                None => std::env::remove_var(CONFIG_ENV_VAR),
            }
        }
    }
}

#[tokio::test]
#[serial]
async fn test_env_var_selects_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("resolver.toml");
    tokio::fs::write(&path, "max_fork_depth = 4\n").await.unwrap();
    let _guard = EnvGuard::set(&path);

    let config = ResolverConfig::load().await.unwrap();
    assert_eq!(config.max_fork_depth, 4);
    assert_eq!(config.max_rounds, 8);
}

#[tokio::test]
#[serial]
async fn test_missing_env_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let _guard = EnvGuard::set(&temp.path().join("absent.toml"));

    let config = ResolverConfig::load().await.unwrap();
    assert_eq!(config, ResolverConfig::default());
}

#[tokio::test]
#[serial]
async fn test_explicit_path_wins_and_must_exist() {
    let temp = TempDir::new().unwrap();
    let env_path = temp.path().join("env.toml");
    let explicit = temp.path().join("explicit.toml");
    tokio::fs::write(&env_path, "max_rounds = 2\n").await.unwrap();
    tokio::fs::write(&explicit, "max_rounds = 5\n").await.unwrap();
    let _guard = EnvGuard::set(&env_path);

    let config = ResolverConfig::load_with_optional(Some(explicit)).await.unwrap();
    assert_eq!(config.max_rounds, 5);

    let missing = temp.path().join("missing.toml");
    let err = ResolverConfig::load_with_optional(Some(missing)).await.unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read resolver config"));
}
