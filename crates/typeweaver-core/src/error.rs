//! Error handling for the typeweaver post-processing library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Every variant is fatal for the
//! current generation run: a half-resolved graph would render code that does
//! not compile.
//!
//! # Examples
//!
//! ```
//! use typeweaver_core::error::{Error, Result};
//!
//! fn lookup(alias: &str) -> Result<()> {
//!     Err(Error::unresolved(alias, "Order.amount"))
//! }
//!
//! let err = lookup("Money").unwrap_err();
//! assert!(err.to_string().contains("Money"));
//! ```

use thiserror::Error;

/// Result type for typeweaver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for typeweaver operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bad or unreachable mapping source, invalid namespace specifier or
    /// cyclic remote mapping documents
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An alias needed for import synthesis is missing from the registry
    #[error("Unresolved alias '{alias}' referenced by {entity}: no type mapping registered")]
    UnresolvedAlias {
        /// The symbolic name that was looked up
        alias: String,
        /// The model, property, parameter or operation that referenced it
        entity: String,
    },

    /// Malformed schema fragment or invalid vendor extension
    #[error("Schema error: {0}")]
    Schema(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new unresolved alias error
    pub fn unresolved<A: Into<String>, E: Into<String>>(alias: A, entity: E) -> Self {
        Self::UnresolvedAlias {
            alias: alias.into(),
            entity: entity.into(),
        }
    }
}
