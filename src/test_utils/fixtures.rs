//! Test fixtures for creating sample catalog files
//!
//! Each fixture is a complete catalog exercising one resolver feature.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture for creating sample catalog.toml files
#[derive(Clone, Debug)]
pub struct CatalogFixture {
    pub content: String,
    pub name: String,
}

impl CatalogFixture {
    fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.trim().to_string(),
        }
    }

    /// Three-layer application: app -> service -> repository, with a shared clock
    pub fn layered() -> Self {
        Self::new(
            "layered",
            r#"
[types.UserRepository]
kind = "interface"

[types.JdbcUserRepository]
supertypes = ["UserRepository"]

[types.Clock]
constructor = []

[[components]]
name = "app"
type = "App"
root = true
claims = [{ type = "UserService" }]

[[components]]
name = "service"
type = "UserService"
claims = [{ type = "UserRepository" }, { type = "Clock" }]

[[components]]
name = "repo"
type = "JdbcUserRepository"
claims = [{ type = "Clock", kind = "value-of" }]
"#,
        )
    }

    /// Two components depending on each other through an interface
    pub fn interface_cycle() -> Self {
        Self::new(
            "interface_cycle",
            r#"
[types.Publisher]
kind = "interface"

[types.EventBus]
supertypes = ["Publisher"]

[[components]]
name = "bus"
type = "EventBus"
root = true
claims = [{ type = "Listener" }]

[[components]]
name = "listener"
type = "Listener"
claims = [{ type = "Publisher" }]
"#,
        )
    }

    /// Two final components depending on each other
    pub fn final_cycle() -> Self {
        Self::new(
            "final_cycle",
            r#"
[[components]]
name = "a"
type = "A"
root = true
claims = [{ type = "B" }]

[[components]]
name = "b"
type = "B"
claims = [{ type = "A" }]
"#,
        )
    }

    /// A claim satisfied only after an extension generated its component
    pub fn generated_extension() -> Self {
        Self::new(
            "generated_extension",
            r#"
[types.JsonReader]
params = ["T"]

[[components]]
name = "app"
type = "App"
root = true
claims = [{ type = "JsonReader<User>" }]

[[extensions]]
name = "json"
type = "JsonReader<T>"
type_params = ["T"]
generate = true
component = { name = "json-reader", type = "JsonReader<T>", type_params = ["T"] }
"#,
        )
    }

    /// A claim with a typo next to a similar type and a module hint
    pub fn unresolved() -> Self {
        Self::new(
            "unresolved",
            r#"
[types.DataSource]
kind = "interface"

[[components]]
name = "app"
type = "App"
root = true
claims = [{ type = "DataSrc" }]

[[hints]]
type = "DataSrc"
message = "Add the `jdbc` module to provide a data source"
"#,
        )
    }

    /// Catalog with invalid TOML syntax
    pub fn invalid_syntax() -> Self {
        Self::new(
            "invalid_syntax",
            r#"
[[components]
name = "app"
type = "App"
"#,
        )
    }

    /// Write the catalog to a directory
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("catalog.toml");
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write {} fixture to {}", self.name, path.display()))?;
        Ok(path)
    }
}
