//! Schema model and document validation for structured content.
//!
//! This crate defines the types for describing document shapes and the
//! engine that checks documents against them:
//!
//! - [`SchemaType`]: a document, object, or field definition with a
//!   [`Kind`], child fields, array members, reference targets, and
//!   [`ValidationRule`]s.
//! - [`TypeLookup`]: name index over the full type catalog, used to resolve
//!   fields whose kind names another type.
//! - [`SchemaPackage`]: a versioned bundle of types for distribution.
//!
//! Validation ([`validate_document`], [`validate_field`]) walks an arbitrary
//! JSON document and never fails: every problem becomes a
//! [`ValidationIssue`] with a path, a severity, and where possible a
//! concrete fix. The result can be rendered for people ([`format_human`])
//! or reduced for tools ([`format_agent`]).
//!
//! Linting ([`lint_catalog`]) reports problems in the schemas themselves.
//!
//! # Example
//!
//! ```
//! use docschema_core::*;
//! use serde_json::json;
//!
//! let article = SchemaType::new("article", Kind::Document)
//!     .with_field(SchemaType::new("title", Kind::String).required())
//!     .with_field(SchemaType::new("slug", Kind::Slug).required())
//!     .with_field(
//!         SchemaType::new("tags", Kind::Array)
//!             .with_member(SchemaType::new("", Kind::String))
//!             .with_rule(ValidationRule::min(1.0)),
//!     );
//! let types = vec![article.clone()];
//!
//! let document = json!({
//!     "_type": "article",
//!     "title": "Hi",
//!     "slug": {"current": "hi"},
//!     "tags": ["a"]
//! });
//! let result = validate_document(&document, &article, &types, &ValidationOptions::default());
//! assert!(result.valid);
//! assert_eq!(format_human(&result), "Document is valid");
//! ```

mod format;
mod introspect;
mod issue;
mod lint;
mod package;
mod rules;
mod types;
mod validate;

pub use format::{AgentIssue, AgentReport, format_agent, format_human, severity_glyph};
pub use issue::{FieldContext, Severity, ValidationIssue, ValidationResult};
pub use lint::{SchemaError, lint_catalog, lint_type};
pub use package::SchemaPackage;
pub use types::*;
pub use validate::{
    REFERENCE_TYPE, ReferenceResolver, ResolveFuture, ValidationOptions, normalize_slug,
    validate_document, validate_field,
};
