//! Schema catalog linting.
//!
//! Checks the schema definitions themselves, not documents: empty or
//! duplicate names, arrays without member types, references without
//! targets, custom kinds that resolve to nothing, and regex rules that do
//! not compile. The validation engine tolerates all of these silently; this
//! is where they get reported.
//!
//! # Examples
//!
//! ```
//! use docschema_core::*;
//!
//! let types = vec![
//!     SchemaType::new("post", Kind::Document)
//!         .with_field(SchemaType::new("seo", Kind::Custom("seo".into()))),
//! ];
//! let errors = lint_catalog(&types);
//! assert_eq!(
//!     errors,
//!     vec![SchemaError::UnknownKind { path: "post.seo".into(), kind: "seo".into() }]
//! );
//! ```

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::{Kind, RuleFlag, SchemaType, TypeLookup};

/// Structural problems in a schema catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A top-level type has an empty or whitespace-only name.
    #[error("type name cannot be empty")]
    EmptyTypeName,
    /// Two top-level types share a name.
    #[error("duplicate type in catalog: {0}")]
    DuplicateType(String),
    /// A field has an empty name.
    #[error("field name cannot be empty in {0}")]
    EmptyFieldName(String),
    /// Two fields in the same scope share a name.
    #[error("duplicate field at path: {0}")]
    DuplicateField(String),
    /// An array field declares no member types.
    #[error("array field declares no member types: {0}")]
    MissingArrayMembers(String),
    /// A reference field declares no target types.
    #[error("reference field declares no target types: {0}")]
    MissingReferenceTargets(String),
    /// A custom kind does not name any type in the catalog.
    #[error("unknown kind '{kind}' at path: {path}")]
    UnknownKind {
        /// Field path within the catalog.
        path: String,
        /// The unresolved kind name.
        kind: String,
    },
    /// A regex rule constraint does not compile.
    #[error("invalid regex pattern '{pattern}' at path: {path}")]
    InvalidPattern {
        /// Field path within the catalog.
        path: String,
        /// The rejected pattern.
        pattern: String,
    },
}

/// Lints every type in a catalog.
///
/// Catalog-level problems (empty or duplicate type names) are reported
/// first, then each type is linted in declaration order.
pub fn lint_catalog(types: &[SchemaType]) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let lookup = TypeLookup::new(types);

    let mut seen: HashSet<&str> = HashSet::new();
    for schema in types {
        let name = schema.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyTypeName);
        } else if !seen.insert(name) {
            errors.push(SchemaError::DuplicateType(name.to_string()));
        }
    }

    for schema in types {
        errors.extend(lint_type(schema, &lookup));
    }
    errors
}

/// Lints one type, resolving custom kinds through `lookup`.
pub fn lint_type(schema: &SchemaType, lookup: &TypeLookup<'_>) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    lint_children(schema, &schema.name, lookup, &mut errors);
    errors
}

fn lint_children(
    schema: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    errors: &mut Vec<SchemaError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();
    for field in &schema.fields {
        let name = field.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyFieldName(path.to_string()));
            continue;
        }
        let field_path = format!("{path}.{name}");
        if !seen.insert(name) {
            errors.push(SchemaError::DuplicateField(field_path));
            continue;
        }
        lint_field(field, &field_path, lookup, errors);
    }
}

fn lint_field(
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    errors: &mut Vec<SchemaError>,
) {
    match &field.kind {
        Kind::Array if field.of.is_empty() => {
            errors.push(SchemaError::MissingArrayMembers(path.to_string()));
        }
        Kind::Reference if field.to.is_empty() => {
            errors.push(SchemaError::MissingReferenceTargets(path.to_string()));
        }
        Kind::Custom(kind) if !lookup.contains(kind) => {
            errors.push(SchemaError::UnknownKind {
                path: path.to_string(),
                kind: kind.clone(),
            });
        }
        _ => {}
    }

    for rule in field.rules().filter(|rule| rule.flag == RuleFlag::Regex) {
        let pattern = rule
            .text()
            .or_else(|| rule.entry("pattern").and_then(|p| p.as_str()));
        if let Some(pattern) = pattern {
            if Regex::new(pattern).is_err() {
                errors.push(SchemaError::InvalidPattern {
                    path: path.to_string(),
                    pattern: pattern.to_string(),
                });
            }
        }
    }

    for (index, member) in field.of.iter().enumerate() {
        let member_path = format!("{path}[{index}]");
        if let Kind::Custom(kind) = &member.kind {
            if !lookup.contains(kind) {
                errors.push(SchemaError::UnknownKind {
                    path: member_path.clone(),
                    kind: kind.clone(),
                });
            }
        }
        lint_children(member, &member_path, lookup, errors);
    }

    lint_children(field, path, lookup, errors);
}

#[cfg(test)]
mod tests {
    use crate::ValidationRule;

    use super::*;

    #[test]
    fn test_lint_catalog_rejects_duplicate_types() {
        let types = vec![
            SchemaType::new("post", Kind::Document),
            SchemaType::new("post", Kind::Document),
        ];
        assert_eq!(
            lint_catalog(&types),
            vec![SchemaError::DuplicateType("post".to_string())]
        );
    }

    #[test]
    fn test_lint_rejects_duplicate_fields() {
        let types = vec![
            SchemaType::new("post", Kind::Document)
                .with_field(SchemaType::new("title", Kind::String))
                .with_field(SchemaType::new("title", Kind::Text)),
        ];
        assert_eq!(
            lint_catalog(&types),
            vec![SchemaError::DuplicateField("post.title".to_string())]
        );
    }

    #[test]
    fn test_lint_reports_array_and_reference_gaps() {
        let types = vec![
            SchemaType::new("post", Kind::Document)
                .with_field(SchemaType::new("tags", Kind::Array))
                .with_field(SchemaType::new("author", Kind::Reference)),
        ];
        assert_eq!(
            lint_catalog(&types),
            vec![
                SchemaError::MissingArrayMembers("post.tags".to_string()),
                SchemaError::MissingReferenceTargets("post.author".to_string()),
            ]
        );
    }

    #[test]
    fn test_lint_reports_bad_pattern_and_unknown_member() {
        let types = vec![
            SchemaType::new("post", Kind::Document)
                .with_field(
                    SchemaType::new("code", Kind::String).with_rule(ValidationRule::regex("([a-z")),
                )
                .with_field(
                    SchemaType::new("blocks", Kind::Array)
                        .with_member(SchemaType::new("callout", Kind::Custom("callout".into()))),
                ),
        ];
        let errors = lint_catalog(&types);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SchemaError::InvalidPattern { .. }));
        assert_eq!(
            errors[1],
            SchemaError::UnknownKind {
                path: "post.blocks[0]".into(),
                kind: "callout".into()
            }
        );
    }

    #[test]
    fn test_lint_accepts_valid_catalog() {
        let types = vec![
            SchemaType::new("seo", Kind::Object)
                .with_field(SchemaType::new("metaTitle", Kind::String)),
            SchemaType::new("post", Kind::Document)
                .with_field(SchemaType::new("seo", Kind::Custom("seo".into())))
                .with_field(SchemaType::new("author", Kind::Reference).with_target("person"))
                .with_field(
                    SchemaType::new("tags", Kind::Array).with_member(SchemaType::new("", Kind::String)),
                ),
        ];
        assert!(lint_catalog(&types).is_empty());
    }
}
