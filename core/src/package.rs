use serde::{Deserialize, Serialize};

use crate::{Kind, SchemaType, TypeLookup};

/// Serializable schema bundle used for distribution.
///
/// A package groups the [`SchemaType`]s of one catalog with version
/// metadata, so a whole catalog can be shipped as a single JSON or YAML file.
///
/// # Examples
///
/// ```
/// use docschema_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0", "2024-01-15T10:30:00Z");
/// package.name = Some("blog".into());
/// package.types.push(SchemaType::new("post", Kind::Document).with_title("Blog post"));
/// package.types.push(SchemaType::new("seo", Kind::Object));
///
/// assert_eq!(package.type_count(), 2);
/// assert_eq!(package.document_types().count(), 1);
/// assert_eq!(
///     package.find_type("post").map(SchemaType::display_name),
///     Some("Blog post")
/// );
/// assert!(package.find_type("video").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// Schema contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package format version (semver string).
    pub version: String,
    /// Optional package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional package description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 timestamp for package creation.
    pub generated_at: String,
    /// Hex SHA-256 of the canonical JSON of `types`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_hash: Option<String>,
    /// Types in declaration order.
    pub types: Vec<SchemaType>,
}

impl SchemaPackage {
    /// Creates an empty package.
    ///
    /// The `schema_version` is set from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION).
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            generated_at: generated_at.into(),
            bundle_hash: None,
            types: Vec::new(),
        }
    }

    /// Returns the number of types in this package.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Finds a type by name.
    pub fn find_type(&self, name: &str) -> Option<&SchemaType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Iterates the document-kind types, which can be validated as roots.
    pub fn document_types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.iter().filter(|t| t.kind == Kind::Document)
    }

    /// Builds a name index over the package's types.
    pub fn lookup(&self) -> TypeLookup<'_> {
        TypeLookup::new(&self.types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_type_returns_first_definition() {
        let mut package = SchemaPackage::new("1.0.0", "2024-01-15T10:30:00Z");
        package.types.push(SchemaType::new("seo", Kind::Object).with_title("SEO"));
        package.types.push(SchemaType::new("seo", Kind::Object));

        let found = package.find_type("seo").unwrap();
        assert_eq!(found.title.as_deref(), Some("SEO"));
        assert!(package.find_type("post").is_none());
        assert_eq!(package.schema_version.as_deref(), Some(crate::SCHEMA_CONTRACT_VERSION));
    }
}
