//! wiregraph - dependency-injection graph resolution
//!
//! Turns a set of component declarations into a construction plan: the
//! ordered list of components a code generator instantiates so that every
//! component's dependencies exist before it does.
//!
//! # Architecture Overview
//!
//! wiregraph works in processing rounds over a catalog of declarations:
//! - Declarations expose a type, carry tags and make typed claims on other
//!   components
//! - A [`oracle::TypeOracle`] answers every type question (subtyping, wrappers,
//!   interceptors, auto-constructible final types)
//! - The [`resolver::GraphResolver`] walks the claims depth-first with an
//!   explicit stack and commits components in construction order
//! - [`extension::Extension`]s may supply declarations on demand or ask for a
//!   new round once generated artifacts exist
//!
//! ## Key Features
//!
//! - **Tags and defaults**: tagged claims pick tagged components; non-default
//!   components override default ones
//! - **Templates**: generic declarations are specialized per claimed type, with
//!   forked exploration when several templates fit
//! - **Collections**: claims for every matching component, optionally behind
//!   value or promise handles
//! - **Cycle breaking**: cycles through interfaces or open classes get a
//!   promised proxy; cycles through final types are reported
//! - **Interceptors**: bound to every component whose type and tags they cover
//! - **Diagnostics**: unresolved claims come with the resolution chain,
//!   tag mismatches, "did you mean" suggestions and module hints
//!
//! # Core Modules
//!
//! - [`model`] - Types, tags, claims and declarations
//! - [`oracle`] - Type questions and the table-driven [`oracle::TypeUniverse`]
//! - [`catalog`] - Per-round declaration store and TOML catalog files
//! - [`extension`] - On-demand declaration strategies
//! - [`resolver`] - The resolution engine and the multi-round driver
//! - [`plan`] - Construction plans, fingerprints and graph queries
//! - [`config`] - Resolver configuration (`~/.wiregraph/config.toml`)
//! - [`core`] - Error types and user-facing error reporting
//! - [`cli`] - Command-line interface
//!
//! # Catalog Format
//!
//! ```toml
//! [types.UserRepository]
//! kind = "interface"
//!
//! [types.JdbcUserRepository]
//! supertypes = ["UserRepository"]
//!
//! [[components]]
//! name = "app"
//! type = "App"
//! root = true
//! claims = [{ type = "UserRepository" }]
//!
//! [[components]]
//! name = "repo"
//! type = "JdbcUserRepository"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Print the plan
//! wiregraph resolve catalog.toml
//!
//! # JSON for code generators
//! wiregraph resolve catalog.toml --format json --output plan.json
//!
//! # Dependency tree of one component
//! wiregraph tree catalog.toml --component app
//! ```

// Resolution model
pub mod catalog;
pub mod extension;
pub mod model;
pub mod oracle;
pub mod plan;
pub mod resolver;

// Application layer
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
