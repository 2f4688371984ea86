//! Schema catalog loading, bundling, and validator configuration.
//!
//! This crate turns schema files on disk into a [`TypeCatalog`] that the
//! validation engine in `docschema-core` can run against, and packages
//! catalogs into hashed bundles for distribution.
//!
//! # Quick start
//!
//! ```no_run
//! use docschema_catalog::{TypeCatalog, ValidatorConfig, build_bundle};
//! use serde_json::json;
//!
//! // Load schemas from a directory and validate a document
//! let catalog = TypeCatalog::from_dir("schemas/").unwrap();
//! let config = ValidatorConfig::default();
//! let result = catalog
//!     .validate(&json!({"_type": "article", "title": "Hi"}), &config.options())
//!     .unwrap();
//! println!("{}", result.summary);
//!
//! // Ship the catalog as a single hashed bundle
//! let bundle = build_bundle(catalog.types().to_vec(), "1.0.0", "2024-01-15T10:30:00Z").unwrap();
//! std::fs::write("schemas.json", serde_json::to_string_pretty(&bundle).unwrap()).unwrap();
//! ```

mod bundle;
mod config;
mod error;
mod loader;

pub use bundle::{build_bundle, bundle_hash, verify_bundle};
pub use config::{CatalogSettings, OutputFormat, OutputSettings, ValidationSettings, ValidatorConfig};
pub use error::{CatalogError, Result};
pub use loader::{CatalogBuilder, CatalogSource, TypeCatalog, is_schema_file, read_value};
