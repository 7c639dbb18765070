//! Test utilities for wiregraph
//!
//! This module provides helpers shared by unit and integration tests:
//! - Test logging that plays well with the test harness
//! - Catalog fixtures covering the main resolver features
//!
//! # Example
//!
//! ```rust,ignore
//! use wiregraph::test_utils::{CatalogFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let dir = tempfile::tempdir().unwrap();
//! let path = CatalogFixture::layered().write_to(dir.path()).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::CatalogFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither set, nothing is logged.
///
/// ```bash
/// RUST_LOG=wiregraph=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
