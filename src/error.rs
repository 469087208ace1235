//! Crate error type for everything around validation: recipe files, catalog
//! files and configuration.
//!
//! Validation itself never fails. Problems inside a recipe are reported as
//! findings in a `ValidationReport`; this type covers the collaborators.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog '{origin}': {message}")]
    Catalog { origin: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn catalog(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Catalog {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Stable code for machine consumers of CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Io { .. } => "IO_ERROR",
            Error::Catalog { .. } => "CATALOG_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
