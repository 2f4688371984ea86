//! Error types for catalog operations.

use thiserror::Error;

/// Errors that can occur while loading catalogs or validating through them.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A bundle's recorded hash does not match its types.
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    /// A path that cannot be used as a schema or document source.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No type with this name exists in the catalog.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The document names no `_type` and the catalog has no single
    /// document type to fall back to.
    #[error("cannot choose a root type: document has no _type and the catalog has {0} document types")]
    AmbiguousRoot(usize),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
