//! Core types for wiregraph
//!
//! This module holds the error taxonomy shared by every other module.
//!
//! # Error Management
//!
//! - **Strongly-typed errors** ([`WiregraphError`]) returned by library APIs
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - [`user_friendly_error`] converts an `anyhow` chain into an [`ErrorContext`]
//!
//! # Examples
//!
//! ```rust
//! use anyhow::Result;
//! use wiregraph::core::{WiregraphError, user_friendly_error};
//!
//! fn example_operation() -> Result<String> {
//!     Err(WiregraphError::NoRootComponents.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, WiregraphError, user_friendly_error};

/// Result alias used by library APIs.
pub type Result<T, E = WiregraphError> = std::result::Result<T, E>;
