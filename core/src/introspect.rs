//! Read-only accessors over [`SchemaType`].
//!
//! These answer the small questions the engine keeps asking about a field:
//! is it required, which rules does it carry, which kinds may an array or
//! reference hold, which dropdown values exist.

use serde_json::Value;

use crate::{Kind, RuleFlag, SchemaType, TypeLookup, ValidationRule};

impl SchemaType {
    /// Iterates every rule across all groups, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &ValidationRule> {
        self.validation.iter().flat_map(|group| group.rules.iter())
    }

    /// Returns the first rule with `flag`.
    pub fn find_rule(&self, flag: &RuleFlag) -> Option<&ValidationRule> {
        self.rules().find(|rule| &rule.flag == flag)
    }

    /// Returns `true` if any rule carries `flag`.
    pub fn has_rule(&self, flag: &RuleFlag) -> bool {
        self.find_rule(flag).is_some()
    }

    /// Returns the presence rule that makes this field required.
    ///
    /// A presence rule without a constraint, or with the constraint
    /// `"required"`, counts; `presence: "optional"` does not.
    pub fn required_rule(&self) -> Option<&ValidationRule> {
        self.rules().find(|rule| {
            rule.flag == RuleFlag::Presence
                && rule.text().is_none_or(|constraint| constraint == "required")
        })
    }

    /// Returns `true` if the field must be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use docschema_core::{Kind, SchemaType};
    ///
    /// assert!(SchemaType::new("title", Kind::String).required().is_required());
    /// assert!(!SchemaType::new("subtitle", Kind::String).is_required());
    /// ```
    pub fn is_required(&self) -> bool {
        self.required_rule().is_some()
    }

    /// Human-facing label: the title if declared, otherwise the name.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Kind tags a reference field may point at.
    ///
    /// # Examples
    ///
    /// ```
    /// use docschema_core::{Kind, SchemaType};
    ///
    /// let author = SchemaType::new("author", Kind::Reference)
    ///     .with_target("person")
    ///     .with_target("team");
    /// assert_eq!(author.reference_targets(), vec!["person", "team"]);
    /// ```
    pub fn reference_targets(&self) -> Vec<&str> {
        self.to.iter().map(tag_of).collect()
    }

    /// Kind tags an array field may hold.
    pub fn member_kinds(&self) -> Vec<&str> {
        self.of.iter().map(tag_of).collect()
    }

    /// Finds the array member whose kind or name equals `tag`.
    pub fn find_member(&self, tag: &str) -> Option<&SchemaType> {
        self.of
            .iter()
            .find(|member| member.kind.as_str() == tag || member.name == tag)
    }

    /// Returns `true` if a reference target matches `tag` by kind or name.
    pub fn accepts_target(&self, tag: &str) -> bool {
        self.to
            .iter()
            .any(|target| target.kind.as_str() == tag || target.name == tag)
    }

    /// The single primitive member kind of an array, if there is exactly one.
    pub fn sole_primitive_member(&self) -> Option<&SchemaType> {
        let mut primitives = self.of.iter().filter(|member| member.kind.is_primitive());
        match (primitives.next(), primitives.next()) {
            (Some(member), None) => Some(member),
            _ => None,
        }
    }

    /// Allowed values declared in `options.list`.
    ///
    /// Entries may be plain values or `{title, value}` records. Returns
    /// `None` when no list is declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use docschema_core::{Kind, SchemaType};
    /// use serde_json::json;
    ///
    /// let status = SchemaType::new("status", Kind::String).with_option(
    ///     "list",
    ///     json!(["draft", {"title": "Published", "value": "published"}]),
    /// );
    /// assert_eq!(
    ///     status.dropdown_values().unwrap(),
    ///     vec!["draft".to_string(), "published".to_string()]
    /// );
    /// ```
    pub fn dropdown_values(&self) -> Option<Vec<String>> {
        let list = self.options.get("list")?.as_array()?;
        let values = list
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(record) => record.get("value").and_then(scalar_text),
                other => scalar_text(other),
            })
            .collect::<Vec<_>>();
        if values.is_empty() { None } else { Some(values) }
    }

    /// Field name a slug is generated from (`options.source`).
    pub fn slug_source(&self) -> Option<&str> {
        self.options.get("source").and_then(Value::as_str)
    }

    /// Child fields to recurse into, resolving custom object kinds.
    ///
    /// Inline fields win; otherwise a custom kind is looked up in the
    /// catalog and its fields are used when it is an object type.
    pub fn effective_fields<'a>(&'a self, lookup: &TypeLookup<'a>) -> &'a [SchemaType] {
        if !self.fields.is_empty() {
            return &self.fields;
        }
        match lookup.resolve_object(&self.kind) {
            Some(resolved) => &resolved.fields,
            None => &[],
        }
    }

    /// Returns `true` if values of this type are objects with fields.
    pub fn is_object_like(&self, lookup: &TypeLookup<'_>) -> bool {
        self.kind.is_composite() || lookup.resolve_object(&self.kind).is_some()
    }
}

fn tag_of(schema: &SchemaType) -> &str {
    match &schema.kind {
        Kind::Custom(name) => name,
        _ if !schema.name.is_empty() => &schema.name,
        kind => kind.as_str(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
