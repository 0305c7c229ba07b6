//! Error types for ingestion and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading sources or configuration.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A source file or directory could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;
