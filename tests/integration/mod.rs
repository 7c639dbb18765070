//! Integration test suite for wiregraph
//!
//! End-to-end tests that run the `wiregraph` binary against catalog files
//! written to temporary directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **scenarios**: Resolution scenarios expressed as catalog files
//! - **resolve**: `wiregraph resolve` output formats and failures
//! - **tree**: `wiregraph tree` rendering and component filtering
//! - **config**: Global configuration flags and resolver overrides

mod config;
mod resolve;
mod scenarios;
mod tree;

use assert_cmd::Command;
use std::path::Path;

/// The binary with colors off and configuration isolated in `dir`.
pub(crate) fn wiregraph(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wiregraph").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("WIREGRAPH_CONFIG", dir.join("no-such-config.toml"))
        .env_remove("RUST_LOG");
    cmd
}
