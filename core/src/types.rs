//! Schema type definitions for document structure modeling.
//!
//! This module defines the passive data model the validator consumes: a
//! tree of [`SchemaType`] nodes describing documents, objects and fields,
//! plus the declarative [`ValidationRule`]s attached to them. The types are
//! designed for serialization with [`serde`] and round-trip through JSON and
//! YAML schema files.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::issue::Severity;

/// Version of the schema contract (semver).
///
/// Embedded in every [`SchemaPackage`](crate::SchemaPackage) to track
/// compatibility across schema versions.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Discriminator naming what shape a [`SchemaType`] represents.
///
/// Built-in kinds form a closed set; anything else is the name of another
/// type in the catalog and is carried as [`Kind::Custom`].
///
/// # Examples
///
/// ```
/// use docschema_core::Kind;
///
/// assert_eq!(Kind::from("string"), Kind::String);
/// assert_eq!(Kind::from("author"), Kind::Custom("author".into()));
/// assert_eq!(Kind::Datetime.as_str(), "datetime");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    /// Top-level document type.
    Document,
    /// Nested object with its own fields.
    Object,
    /// Short string.
    String,
    /// Long-form string.
    Text,
    /// Finite number.
    Number,
    /// Boolean.
    Boolean,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Date and time.
    Datetime,
    /// Ordered list of member values.
    Array,
    /// Pointer to another document.
    Reference,
    /// Image asset with optional metadata fields.
    Image,
    /// File asset with optional metadata fields.
    File,
    /// URL-safe identifier (`{ current: "..." }`).
    Slug,
    /// Absolute URL string.
    Url,
    /// Portable-text paragraph.
    Block,
    /// Name of another type in the catalog.
    Custom(String),
}

impl Kind {
    /// Returns the tag used in schema files.
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Document => "document",
            Kind::Object => "object",
            Kind::String => "string",
            Kind::Text => "text",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Date => "date",
            Kind::Datetime => "datetime",
            Kind::Array => "array",
            Kind::Reference => "reference",
            Kind::Image => "image",
            Kind::File => "file",
            Kind::Slug => "slug",
            Kind::Url => "url",
            Kind::Block => "block",
            Kind::Custom(name) => name,
        }
    }

    /// Returns `true` for kinds whose values are JSON scalars.
    ///
    /// # Examples
    ///
    /// ```
    /// use docschema_core::Kind;
    ///
    /// assert!(Kind::Number.is_primitive());
    /// assert!(!Kind::Slug.is_primitive());
    /// ```
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Kind::String
                | Kind::Text
                | Kind::Number
                | Kind::Boolean
                | Kind::Date
                | Kind::Datetime
                | Kind::Url
        )
    }

    /// Returns `true` for document and object kinds.
    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::Document | Kind::Object)
    }
}

impl From<&str> for Kind {
    fn from(tag: &str) -> Self {
        match tag {
            "document" => Kind::Document,
            "object" => Kind::Object,
            "string" => Kind::String,
            "text" => Kind::Text,
            "number" => Kind::Number,
            "boolean" => Kind::Boolean,
            "date" => Kind::Date,
            "datetime" => Kind::Datetime,
            "array" => Kind::Array,
            "reference" => Kind::Reference,
            "image" => Kind::Image,
            "file" => Kind::File,
            "slug" => Kind::Slug,
            "url" => Kind::Url,
            "block" => Kind::Block,
            other => Kind::Custom(other.to_string()),
        }
    }
}

impl From<String> for Kind {
    fn from(tag: String) -> Self {
        Kind::from(tag.as_str())
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flag naming which constraint a [`ValidationRule`] expresses.
///
/// Unknown flags are preserved as [`RuleFlag::Other`] so schemas written for
/// newer rule sets still load; the engine ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleFlag {
    /// Value must be present (`required` is accepted as an alias).
    Presence,
    /// Lower bound on length, value, or item count.
    Min,
    /// Upper bound on length, value, or item count.
    Max,
    /// Exact string length.
    Length,
    /// String must match a pattern.
    Regex,
    /// String must look like an email address.
    Email,
    /// String must parse as a URI.
    Uri,
    /// Value must be unique across the dataset.
    Unique,
    /// Caller-supplied predicate.
    Custom,
    /// Number must have no fractional part.
    Integer,
    /// Number must be greater than zero.
    Positive,
    /// Unrecognized flag.
    Other(String),
}

impl RuleFlag {
    /// Returns the tag used in schema files.
    pub fn as_str(&self) -> &str {
        match self {
            RuleFlag::Presence => "presence",
            RuleFlag::Min => "min",
            RuleFlag::Max => "max",
            RuleFlag::Length => "length",
            RuleFlag::Regex => "regex",
            RuleFlag::Email => "email",
            RuleFlag::Uri => "uri",
            RuleFlag::Unique => "unique",
            RuleFlag::Custom => "custom",
            RuleFlag::Integer => "integer",
            RuleFlag::Positive => "positive",
            RuleFlag::Other(flag) => flag,
        }
    }
}

impl From<String> for RuleFlag {
    fn from(flag: String) -> Self {
        match flag.as_str() {
            "presence" | "required" => RuleFlag::Presence,
            "min" => RuleFlag::Min,
            "max" => RuleFlag::Max,
            "length" => RuleFlag::Length,
            "regex" => RuleFlag::Regex,
            "email" => RuleFlag::Email,
            "uri" => RuleFlag::Uri,
            "unique" => RuleFlag::Unique,
            "custom" => RuleFlag::Custom,
            "integer" => RuleFlag::Integer,
            "positive" => RuleFlag::Positive,
            _ => RuleFlag::Other(flag),
        }
    }
}

impl From<RuleFlag> for String {
    fn from(flag: RuleFlag) -> Self {
        flag.as_str().to_string()
    }
}

impl fmt::Display for RuleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declarative constraint attached to a field.
///
/// The shape of `constraint` depends on the flag: a number for
/// `min`/`max`/`length`, a pattern string or `{pattern, name, invert}`
/// record for `regex`, `"required"` for `presence`, and so on.
///
/// # Examples
///
/// ```
/// use docschema_core::{RuleFlag, ValidationRule};
///
/// let rule = ValidationRule::min(3.0);
/// assert_eq!(rule.flag, RuleFlag::Min);
/// assert_eq!(rule.number(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Which constraint this rule expresses.
    pub flag: RuleFlag,
    /// Flag-specific constraint value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Value>,
}

impl ValidationRule {
    /// Creates a rule without a constraint.
    pub fn new(flag: RuleFlag) -> Self {
        Self {
            flag,
            constraint: None,
        }
    }

    /// Creates a rule with a constraint value.
    pub fn with_constraint(flag: RuleFlag, constraint: impl Into<Value>) -> Self {
        Self {
            flag,
            constraint: Some(constraint.into()),
        }
    }

    /// `presence: required`.
    pub fn required() -> Self {
        Self::with_constraint(RuleFlag::Presence, "required")
    }

    /// `min: n`.
    pub fn min(bound: f64) -> Self {
        Self::with_constraint(RuleFlag::Min, bound)
    }

    /// `max: n`.
    pub fn max(bound: f64) -> Self {
        Self::with_constraint(RuleFlag::Max, bound)
    }

    /// `regex: pattern`.
    pub fn regex(pattern: &str) -> Self {
        Self::with_constraint(RuleFlag::Regex, pattern)
    }

    /// Returns the constraint as a number, if it is one.
    pub fn number(&self) -> Option<f64> {
        self.constraint.as_ref().and_then(Value::as_f64)
    }

    /// Returns the constraint as a string, if it is one.
    pub fn text(&self) -> Option<&str> {
        self.constraint.as_ref().and_then(Value::as_str)
    }

    /// Returns a named entry of a record-shaped constraint.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.constraint
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|record| record.get(key))
    }
}

/// An ordered group of rules with an optional message and level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationGroup {
    /// Rules in declaration order.
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
    /// Author-supplied message for the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Author-supplied level for the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,
}

impl ValidationGroup {
    /// Creates a group from rules.
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        Self {
            rules,
            message: None,
            level: None,
        }
    }
}

/// A node in the type catalog: a document/object type or a single field.
///
/// `fields` is used by composite kinds (and image/file metadata), `of` by
/// arrays, `to` by references. Anything kind-specific that is not a child
/// type lives in the open `options` map (`list` for dropdowns, `source` for
/// slugs, `hotspot` for images).
///
/// # Examples
///
/// ```
/// use docschema_core::{Kind, SchemaType};
///
/// let post = SchemaType::new("post", Kind::Document)
///     .with_field(SchemaType::new("title", Kind::String).required())
///     .with_field(
///         SchemaType::new("tags", Kind::Array)
///             .with_member(SchemaType::new("tag", Kind::String)),
///     );
///
/// assert_eq!(post.fields.len(), 2);
/// assert!(post.field("title").unwrap().is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaType {
    /// Kind tag (built-in or custom type name).
    #[serde(rename = "type")]
    pub kind: Kind,
    /// Type or field name.
    #[serde(default)]
    pub name: String,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Child fields (document/object/image/file kinds).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaType>,
    /// Member types (array kind).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub of: Vec<SchemaType>,
    /// Target types (reference kind).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<SchemaType>,
    /// Rule groups in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationGroup>,
    /// Kind-specific settings.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl SchemaType {
    /// Creates a type with no children, rules, or options.
    pub fn new(name: &str, kind: Kind) -> Self {
        Self {
            kind,
            name: name.to_string(),
            title: None,
            fields: Vec::new(),
            of: Vec::new(),
            to: Vec::new(),
            validation: Vec::new(),
            options: Map::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Appends a child field.
    pub fn with_field(mut self, field: SchemaType) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends an array member type.
    pub fn with_member(mut self, member: SchemaType) -> Self {
        self.of.push(member);
        self
    }

    /// Appends a reference target, named by its kind tag.
    pub fn with_target(mut self, target: &str) -> Self {
        self.to.push(SchemaType::new(target, Kind::from(target)));
        self
    }

    /// Appends a rule in a group of its own.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation.push(ValidationGroup::new(vec![rule]));
        self
    }

    /// Sets an option value.
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Marks the field as required.
    pub fn required(self) -> Self {
        self.with_rule(ValidationRule::required())
    }

    /// Finds a direct child field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaType> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Name-indexed view over the full type catalog.
///
/// Built once per validation call and used to resolve field kinds that name
/// another declared type. Later definitions with the same name replace
/// earlier ones.
///
/// # Examples
///
/// ```
/// use docschema_core::{Kind, SchemaType, TypeLookup};
///
/// let types = vec![
///     SchemaType::new("post", Kind::Document),
///     SchemaType::new("seo", Kind::Object),
/// ];
/// let lookup = TypeLookup::new(&types);
/// assert_eq!(lookup.get("seo").unwrap().kind, Kind::Object);
/// assert!(lookup.get("missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeLookup<'a> {
    types: HashMap<&'a str, &'a SchemaType>,
}

impl<'a> TypeLookup<'a> {
    /// Indexes `types` by name.
    pub fn new(types: &'a [SchemaType]) -> Self {
        Self {
            types: types.iter().map(|t| (t.name.as_str(), t)).collect(),
        }
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&'a SchemaType> {
        self.types.get(name).copied()
    }

    /// Resolves a custom kind to an object type in the catalog.
    ///
    /// Returns `None` for built-in kinds, unknown names, and names that
    /// resolve to a non-object type.
    pub fn resolve_object(&self, kind: &Kind) -> Option<&'a SchemaType> {
        match kind {
            Kind::Custom(name) => self.get(name).filter(|t| t.kind == Kind::Object),
            _ => None,
        }
    }

    /// Returns `true` if `name` is declared in the catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the number of indexed types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are indexed.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_kind_round_trips_through_tag() {
        for tag in ["document", "object", "slug", "block", "datetime", "seo"] {
            let kind = Kind::from(tag);
            assert_eq!(kind.as_str(), tag);
        }
        assert!(matches!(Kind::from("seo"), Kind::Custom(_)));
    }

    #[test]
    fn test_required_alias_maps_to_presence() {
        let rule: ValidationRule = serde_json::from_value(json!({"flag": "required"})).unwrap();
        assert_eq!(rule.flag, RuleFlag::Presence);
        assert_eq!(rule.constraint, None);
    }

    #[test]
    fn test_unknown_flag_is_preserved() {
        let rule: ValidationRule =
            serde_json::from_value(json!({"flag": "precision", "constraint": 2})).unwrap();
        assert_eq!(rule.flag, RuleFlag::Other("precision".into()));
        assert_eq!(rule.number(), Some(2.0));
    }

    #[test]
    fn test_schema_type_deserializes_with_defaults() {
        let raw = json!({
            "type": "document",
            "name": "article",
            "fields": [
                {"type": "string", "name": "title", "validation": [{"rules": [{"flag": "presence", "constraint": "required"}]}]},
                {"type": "reference", "name": "author", "to": [{"type": "author"}]},
                {"type": "string", "name": "status", "options": {"list": ["draft", "published"]}}
            ]
        });
        let schema: SchemaType = serde_json::from_value(raw).unwrap();
        assert_eq!(schema.kind, Kind::Document);
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[1].to[0].kind, Kind::Custom("author".into()));
        assert_eq!(schema.fields[1].to[0].name, "");
        assert!(schema.fields[2].options.contains_key("list"));
    }

    #[test]
    fn test_lookup_resolves_only_object_kinds() {
        let types = vec![
            SchemaType::new("seo", Kind::Object),
            SchemaType::new("post", Kind::Document),
        ];
        let lookup = TypeLookup::new(&types);
        assert!(lookup.resolve_object(&Kind::Custom("seo".into())).is_some());
        assert!(lookup.resolve_object(&Kind::Custom("post".into())).is_none());
        assert!(lookup.resolve_object(&Kind::Object).is_none());
        assert_eq!(lookup.len(), 2);
    }
}
