//! Unit test suite for wiregraph
//!
//! Exercises the library API without going through the CLI binary.
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! # Test Organization
//!
//! - **config_lookup**: Resolver configuration lookup order
//! - **manifest**: Catalog files, manifest extensions and round-aware sources
//! - **plan_graph**: Graph queries over resolved plans
//! - **round_driver**: Multi-round resolution with custom declaration sources

mod config_lookup;
mod manifest;
mod plan_graph;
mod round_driver;
