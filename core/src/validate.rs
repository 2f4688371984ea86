//! Type-directed document validation.
//!
//! [`validate_document`] walks a document alongside its root
//! [`SchemaType`], dispatching a structural check per field kind and then
//! applying the field's declared rules. Nothing in this module fails: every
//! problem with the document becomes a [`ValidationIssue`] in the result.
//!
//! # Examples
//!
//! ```
//! use docschema_core::*;
//! use serde_json::json;
//!
//! let article = SchemaType::new("article", Kind::Document)
//!     .with_field(SchemaType::new("title", Kind::String).required())
//!     .with_field(SchemaType::new("slug", Kind::Slug).required());
//!
//! let result = validate_document(
//!     &json!({"_type": "article"}),
//!     &article,
//!     &[article.clone()],
//!     &ValidationOptions::default(),
//! );
//! assert!(!result.valid);
//! let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
//! assert_eq!(paths, vec!["title", "slug"]);
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::rules::apply_rules;
use crate::{Kind, RuleFlag, SchemaType, TypeLookup, ValidationIssue, ValidationResult};

/// Marker `_type` carried by plain reference objects.
pub const REFERENCE_TYPE: &str = "reference";

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex must compile"));

/// Future returned by a [`ReferenceResolver`].
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Option<Value>> + Send + 'a>>;

/// Asynchronous lookup of referenced documents.
///
/// Accepted in [`ValidationOptions`] so callers can pass one through today;
/// validation is synchronous and never calls it.
pub trait ReferenceResolver: Send + Sync {
    /// Fetches the document a `_ref` points at.
    fn resolve<'a>(&'a self, reference: &'a str) -> ResolveFuture<'a>;
}

/// Caller options for a validation run.
///
/// # Examples
///
/// ```
/// use docschema_core::ValidationOptions;
///
/// let options = ValidationOptions::default();
/// assert!(options.include_warnings);
/// assert!(!options.include_info);
/// assert!(!options.stop_on_first_error);
///
/// let strict = ValidationOptions::default().with_info(true).stop_on_first_error();
/// assert!(strict.include_info && strict.stop_on_first_error);
/// ```
#[derive(Clone)]
pub struct ValidationOptions {
    /// Report warning-severity issues.
    pub include_warnings: bool,
    /// Report info-severity issues.
    pub include_info: bool,
    /// Stop visiting root fields once an error has been recorded.
    pub stop_on_first_error: bool,
    /// Reference resolution hook; never invoked by the engine.
    pub resolve_reference: Option<Arc<dyn ReferenceResolver>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            include_warnings: true,
            include_info: false,
            stop_on_first_error: false,
            resolve_reference: None,
        }
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("include_warnings", &self.include_warnings)
            .field("include_info", &self.include_info)
            .field("stop_on_first_error", &self.stop_on_first_error)
            .field("resolve_reference", &self.resolve_reference.is_some())
            .finish()
    }
}

impl ValidationOptions {
    /// Sets whether warnings are reported.
    pub fn with_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    /// Sets whether info issues are reported.
    pub fn with_info(mut self, include: bool) -> Self {
        self.include_info = include;
        self
    }

    /// Stops visiting root fields after the first error.
    pub fn stop_on_first_error(mut self) -> Self {
        self.stop_on_first_error = true;
        self
    }

    /// Installs a reference resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolve_reference = Some(resolver);
        self
    }
}

/// Validates `document` against `root`, resolving custom kinds in `all_types`.
///
/// The `_type` check never aborts the walk: a mismatched or missing type is
/// reported and every root field is still visited (unless
/// `stop_on_first_error` is set, which halts before the next root field once
/// any error exists).
pub fn validate_document(
    document: &Value,
    root: &SchemaType,
    all_types: &[SchemaType],
    options: &ValidationOptions,
) -> ValidationResult {
    let lookup = TypeLookup::new(all_types);
    let mut issues = Vec::new();

    check_document_type(document, root, &mut issues);

    for field in root.effective_fields(&lookup) {
        if options.stop_on_first_error && issues.iter().any(ValidationIssue::is_error) {
            debug!(document_type = %root.name, field = %field.name, "stopping at first error");
            break;
        }
        check_field(document.get(&field.name), field, &field.name, &lookup, &mut issues);
    }

    ValidationResult::from_issues(
        &root.name,
        issues,
        options.include_warnings,
        options.include_info,
    )
}

/// Validates a single field value at `path`.
///
/// `value` is `None` when the key is absent; JSON `null` is treated the same
/// way. Severity filtering is left to [`validate_document`]; this returns
/// every issue found.
pub fn validate_field(
    value: Option<&Value>,
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    _options: &ValidationOptions,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_field(value, field, path, lookup, &mut issues);
    issues
}

fn check_document_type(document: &Value, root: &SchemaType, issues: &mut Vec<ValidationIssue>) {
    match document.get("_type") {
        None | Some(Value::Null) => issues.push(
            ValidationIssue::error("_type", "Document is missing required type (_type)")
                .with_expected(format!("\"{}\"", root.name))
                .suggest(format!("Add \"_type\": \"{}\" to the document", root.name)),
        ),
        Some(Value::String(actual)) if *actual == root.name => {}
        Some(actual) => issues.push(
            ValidationIssue::error(
                "_type",
                format!(
                    "Document type mismatch: expected \"{}\", got {}",
                    root.name, actual
                ),
            )
            .with_value(actual)
            .with_expected(format!("\"{}\"", root.name))
            .suggest(format!("Change _type to \"{}\"", root.name)),
        ),
    }
}

pub(crate) fn check_field(
    value: Option<&Value>,
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    let value = match value {
        Some(value) if !value.is_null() => value,
        _ => {
            if let Some(rule) = field.required_rule() {
                issues.push(
                    ValidationIssue::error(
                        path,
                        format!("Required field \"{}\" is missing", field.display_name()),
                    )
                    .with_rule(rule)
                    .with_field(field)
                    .with_expected(expected_shape(&field.kind))
                    .suggest(format!(
                        "Add \"{}\": {}",
                        field.name,
                        example_value(&field.kind)
                    )),
                );
            }
            return;
        }
    };

    check_kind(value, field, path, lookup, issues);
    apply_rules(value, field, path, issues);
}

fn check_kind(
    value: &Value,
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    match &field.kind {
        Kind::String | Kind::Text => check_string(value, field, path, issues),
        Kind::Number => check_number(value, field, path, issues),
        Kind::Boolean => {
            if !value.is_boolean() {
                issues.push(type_mismatch(value, field, path, "a boolean"));
            }
        }
        Kind::Date | Kind::Datetime => check_date(value, field, path, issues),
        Kind::Array => check_array(value, field, path, lookup, issues),
        Kind::Document | Kind::Object => check_object(value, field, path, lookup, issues),
        Kind::Reference => check_reference(value, field, path, issues),
        Kind::Image | Kind::File => check_asset(value, field, path, lookup, issues),
        Kind::Slug => check_slug(value, field, path, issues),
        Kind::Url => check_url(value, field, path, issues),
        Kind::Block => check_block(value, field, path, issues),
        Kind::Custom(name) => {
            if lookup.resolve_object(&field.kind).is_some() {
                check_object(value, field, path, lookup, issues);
            } else {
                trace!(path, kind = %name, "no structural check for unresolved kind");
            }
        }
    }
}

fn check_string(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(text) = value.as_str() else {
        let mut issue = type_mismatch(value, field, path, "a string");
        if value.is_number() || value.is_boolean() {
            issue = issue.suggest(format!("Quote the value: \"{value}\""));
        }
        issues.push(issue);
        return;
    };

    if let Some(allowed) = field.dropdown_values() {
        if !allowed.iter().any(|candidate| candidate == text) {
            let listed = allowed
                .iter()
                .map(|v| format!("\"{v}\""))
                .collect::<Vec<_>>()
                .join(", ");
            let mut issue = ValidationIssue::error(
                path,
                format!("Value \"{text}\" is not one of the allowed options"),
            )
            .with_value(value)
            .with_field(field)
            .with_expected(format!("one of: {listed}"));
            for candidate in &allowed {
                issue = issue.suggest(format!("Use \"{candidate}\""));
            }
            issues.push(issue);
        }
    }
}

fn check_number(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
        let mut issue = type_mismatch(value, field, path, "a number");
        if let Some(parsed) = value.as_str().and_then(|s| s.trim().parse::<f64>().ok()) {
            issue = issue.suggest(format!("Remove the quotes: {}", fmt_number(parsed)));
        }
        issues.push(issue);
        return;
    };

    if let Some(rule) = field.find_rule(&RuleFlag::Integer) {
        if number.fract() != 0.0 {
            issues.push(
                ValidationIssue::error(
                    path,
                    format!("Expected an integer, got {}", fmt_number(number)),
                )
                .with_rule(rule)
                .with_value(value)
                .with_field(field)
                .with_expected("integer")
                .suggest(format!("Use {}", fmt_number(number.round())))
                .suggest(format!("Use {}", fmt_number(number.trunc()))),
            );
        }
    }

    if let Some(rule) = field.find_rule(&RuleFlag::Positive) {
        if number <= 0.0 {
            issues.push(
                ValidationIssue::error(
                    path,
                    format!("Expected a positive number, got {}", fmt_number(number)),
                )
                .with_rule(rule)
                .with_value(value)
                .with_field(field)
                .with_expected("a number greater than 0")
                .suggest("Use a value greater than 0"),
            );
        }
    }
}

fn check_date(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let parsed = value.as_str().and_then(parse_calendar);
    if parsed.is_some() {
        return;
    }

    let (label, example) = match field.kind {
        Kind::Date => ("date", "2024-01-15"),
        _ => ("datetime", "2024-01-15T10:30:00Z"),
    };
    let message = match value.as_str() {
        Some(text) => format!("\"{text}\" is not a valid {label}"),
        None => format!("Expected a {label} string, got {}", describe(value)),
    };
    issues.push(
        ValidationIssue::error(path, message)
            .with_value(value)
            .with_field(field)
            .with_expected(format!("ISO 8601 {label} string"))
            .suggest(format!("Use ISO 8601 format, e.g. \"{example}\"")),
    );
}

fn check_array(
    value: &Value,
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(items) = value.as_array() else {
        issues.push(
            type_mismatch(value, field, path, "an array")
                .suggest(format!("Wrap the value in an array: [{value}]")),
        );
        return;
    };

    let implicit_member = match field.of.as_slice() {
        [only] if only.is_object_like(lookup) => Some(only),
        _ => None,
    };

    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        match item {
            Value::Null => issues.push(
                ValidationIssue::error(&item_path, "Array items cannot be null")
                    .with_field(field)
                    .suggest(format!("Remove the null entry at index {index}")),
            ),
            Value::Object(map) => {
                if is_absent(map, "_key") {
                    issues.push(
                        ValidationIssue::warning(&item_path, "Array item is missing a _key")
                            .with_field(field)
                            .with_expected("object with a unique \"_key\"")
                            .suggest(format!(
                                "Add a unique \"_key\", e.g. \"_key\": \"{}-{index}\"",
                                field.name
                            )),
                    );
                }
                check_array_object(item, map, field, implicit_member, &item_path, lookup, issues);
            }
            primitive => check_array_primitive(primitive, field, &item_path, lookup, issues),
        }
    }
}

fn check_array_object(
    item: &Value,
    map: &Map<String, Value>,
    field: &SchemaType,
    implicit_member: Option<&SchemaType>,
    item_path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    if field.of.is_empty() {
        return;
    }

    match map.get("_type") {
        Some(Value::String(tag)) => match field.find_member(tag) {
            Some(member) => check_member(item, member, item_path, lookup, issues),
            None => {
                let allowed = field.member_kinds();
                let mut issue = ValidationIssue::error(
                    format!("{item_path}._type"),
                    format!("Array item type \"{tag}\" is not allowed here"),
                )
                .with_value(&Value::String(tag.clone()))
                .with_field(field)
                .with_expected(format!("one of: {}", allowed.join(", ")));
                for kind in allowed {
                    issue = issue.suggest(format!("Change _type to \"{kind}\""));
                }
                issues.push(issue);
            }
        },
        Some(other) => issues.push(
            ValidationIssue::error(
                format!("{item_path}._type"),
                format!("Array item _type must be a string, got {}", describe(other)),
            )
            .with_value(other)
            .with_field(field),
        ),
        None => {
            if let Some(member) = implicit_member {
                check_member(item, member, item_path, lookup, issues);
            }
        }
    }
}

fn check_array_primitive(
    item: &Value,
    field: &SchemaType,
    item_path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(member) = field.sole_primitive_member() {
        check_field(Some(item), member, item_path, lookup, issues);
    } else if !field.of.is_empty() && !field.of.iter().any(|m| accepts_primitive(m, lookup)) {
        issues.push(
            ValidationIssue::error(
                item_path,
                format!("Expected an object array item, got {}", describe(item)),
            )
            .with_value(item)
            .with_field(field)
            .with_expected(format!(
                "object with _type one of: {}",
                field.member_kinds().join(", ")
            )),
        );
    }
}

/// Primitive members, and custom kinds that do not resolve to an object type.
fn accepts_primitive(member: &SchemaType, lookup: &TypeLookup<'_>) -> bool {
    match &member.kind {
        Kind::Custom(_) => lookup.resolve_object(&member.kind).is_none(),
        kind => kind.is_primitive(),
    }
}

/// Validates an array element against the member type it matched.
fn check_member(
    item: &Value,
    member: &SchemaType,
    item_path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    match &member.kind {
        // `_key` on the element itself was already checked by the array.
        Kind::Block => check_block_children(item, item_path, issues),
        Kind::Reference => check_reference(item, member, item_path, issues),
        Kind::Image | Kind::File => check_asset(item, member, item_path, lookup, issues),
        Kind::Slug => check_slug(item, member, item_path, issues),
        _ => {
            if let Some(map) = item.as_object() {
                check_fields(map, member.effective_fields(lookup), item_path, lookup, issues);
            }
        }
    }
}

fn check_object(
    value: &Value,
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(map) = value.as_object() else {
        issues.push(type_mismatch(value, field, path, "an object"));
        return;
    };
    check_fields(map, field.effective_fields(lookup), path, lookup, issues);
}

fn check_fields(
    map: &Map<String, Value>,
    fields: &[SchemaType],
    path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    for child in fields {
        let child_path = format!("{path}.{}", child.name);
        check_field(map.get(&child.name), child, &child_path, lookup, issues);
    }
}

fn check_reference(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(map) = value.as_object() else {
        let mut issue = type_mismatch(value, field, path, "a reference object")
            .with_expected("{ \"_type\": \"reference\", \"_ref\": \"<document id>\" }");
        if let Some(id) = value.as_str() {
            issue = issue.suggest(format!(
                "Wrap the id: {{ \"_type\": \"reference\", \"_ref\": \"{id}\" }}"
            ));
        }
        issues.push(issue);
        return;
    };

    let ref_path = format!("{path}._ref");
    match map.get("_ref") {
        Some(Value::String(_)) => {}
        Some(other) => issues.push(
            ValidationIssue::error(
                ref_path,
                format!("Reference _ref must be a string, got {}", describe(other)),
            )
            .with_value(other)
            .with_field(field)
            .with_expected("document id string"),
        ),
        None => issues.push(
            ValidationIssue::error(ref_path, "Reference is missing _ref")
                .with_field(field)
                .with_expected("document id string")
                .suggest("Add \"_ref\": \"<document id>\""),
        ),
    }

    if let Some(Value::String(target)) = map.get("_type") {
        if target != REFERENCE_TYPE && !field.to.is_empty() && !field.accepts_target(target) {
            let allowed = field.reference_targets();
            let mut issue = ValidationIssue::error(
                path,
                format!("Reference to \"{target}\" is not allowed"),
            )
            .with_value(value)
            .with_field(field)
            .with_expected(format!("reference to one of: {}", allowed.join(", ")));
            for kind in allowed {
                issue = issue.suggest(format!("Point the reference at a \"{kind}\" document"));
            }
            issues.push(issue);
        }
    }
}

fn check_asset(
    value: &Value,
    field: &SchemaType,
    path: &str,
    lookup: &TypeLookup<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    let label = field.kind.as_str();
    let Some(map) = value.as_object() else {
        let shape = match field.kind {
            Kind::File => "a file object",
            _ => "an image object",
        };
        issues.push(
            type_mismatch(value, field, path, shape).with_expected(
                format!(
                    "{{ \"_type\": \"{label}\", \"asset\": {{ \"_type\": \"reference\", \"_ref\": \"<asset id>\" }} }}"
                ),
            ),
        );
        return;
    };

    let asset_path = format!("{path}.asset");
    match map.get("asset") {
        None | Some(Value::Null) => issues.push(
            ValidationIssue::error(&asset_path, format!("The {label} is missing its asset"))
                .with_field(field)
                .with_expected("{ \"_type\": \"reference\", \"_ref\": \"<asset id>\" }")
                .suggest(format!("Upload the {label} and reference its asset id")),
        ),
        Some(Value::Object(asset)) => {
            let has_ref = asset
                .get("_ref")
                .and_then(Value::as_str)
                .is_some_and(|r| !r.is_empty());
            if !has_ref {
                issues.push(
                    ValidationIssue::error(
                        format!("{asset_path}._ref"),
                        "Asset reference must have a non-empty _ref",
                    )
                    .with_field(field)
                    .with_expected("asset id string")
                    .suggest("Set asset._ref to the uploaded asset id"),
                );
            }
        }
        Some(other) => issues.push(
            ValidationIssue::error(
                &asset_path,
                format!("Asset must be a reference object, got {}", describe(other)),
            )
            .with_value(other)
            .with_field(field)
            .with_expected("{ \"_type\": \"reference\", \"_ref\": \"<asset id>\" }"),
        ),
    }

    check_fields(map, field.effective_fields(lookup), path, lookup, issues);
}

fn check_slug(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(map) = value.as_object() else {
        let mut issue = type_mismatch(value, field, path, "a slug object")
            .with_expected("{ \"_type\": \"slug\", \"current\": \"...\" }");
        if let Some(text) = value.as_str() {
            issue = issue.suggest(format!(
                "Use {{ \"_type\": \"slug\", \"current\": \"{}\" }}",
                normalize_slug(text)
            ));
        }
        issues.push(issue);
        return;
    };

    let current_path = format!("{path}.current");
    let current = map
        .get("current")
        .and_then(Value::as_str)
        .filter(|current| !current.is_empty());
    let Some(current) = current else {
        let mut issue = ValidationIssue::error(
            &current_path,
            "Slug must have a non-empty \"current\" value",
        )
        .with_field(field)
        .with_expected("non-empty string");
        if let Some(source) = field.slug_source() {
            issue = issue.suggest(format!("Generate the slug from the \"{source}\" field"));
        }
        issues.push(issue);
        return;
    };

    let canonical = current
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !canonical {
        let normalized = normalize_slug(current);
        let mut issue = ValidationIssue::warning(
            &current_path,
            format!(
                "Slug \"{current}\" should only contain lowercase letters, digits, and hyphens"
            ),
        )
        .with_value(&Value::String(current.to_string()))
        .with_field(field)
        .with_expected("lowercase letters, digits, and hyphens");
        if !normalized.is_empty() {
            issue = issue.suggest(format!("Use \"{normalized}\""));
        }
        if let Some(source) = field.slug_source() {
            issue = issue.suggest(format!("Regenerate the slug from the \"{source}\" field"));
        }
        issues.push(issue);
    }
}

/// Lowercases `text`, collapses every run of other characters into a
/// single hyphen, and trims hyphens from both ends.
///
/// # Examples
///
/// ```
/// use docschema_core::normalize_slug;
///
/// assert_eq!(normalize_slug("Hello World!"), "hello-world");
/// assert_eq!(normalize_slug("--Rust & Serde--"), "rust-serde");
/// ```
pub fn normalize_slug(text: &str) -> String {
    let lowered = text.to_lowercase();
    SLUG_SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

fn check_url(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(text) = value.as_str() else {
        issues.push(type_mismatch(value, field, path, "a URL string"));
        return;
    };
    if Url::parse(text).is_ok() {
        return;
    }

    let mut issue = ValidationIssue::error(path, format!("\"{text}\" is not a valid absolute URL"))
        .with_value(value)
        .with_field(field)
        .with_expected("absolute URL, e.g. \"https://example.com\"");
    let prefixed = format!("https://{}", text.trim_start_matches('/'));
    if !text.contains("://") && Url::parse(&prefixed).is_ok() {
        issue = issue.suggest(format!("Use \"{prefixed}\""));
    }
    issues.push(issue.suggest("Include the scheme, e.g. \"https://example.com/page\""));
}

fn check_block(value: &Value, field: &SchemaType, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(map) = value.as_object() else {
        issues.push(type_mismatch(value, field, path, "a block object"));
        return;
    };
    if is_absent(map, "_type") {
        issues.push(
            ValidationIssue::error(format!("{path}._type"), "Block is missing _type")
                .with_field(field)
                .suggest("Add \"_type\": \"block\""),
        );
    }
    if is_absent(map, "_key") {
        issues.push(
            ValidationIssue::warning(format!("{path}._key"), "Block is missing _key")
                .with_field(field)
                .suggest("Add a unique \"_key\" to the block"),
        );
    }
    check_block_children(value, path, issues);
}

fn check_block_children(block: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
    let children = match block.get("children") {
        None | Some(Value::Null) => return,
        Some(Value::Array(children)) => children,
        Some(other) => {
            issues.push(
                ValidationIssue::error(
                    format!("{path}.children"),
                    format!("Block children must be an array, got {}", describe(other)),
                )
                .with_value(other)
                .with_expected("array of spans"),
            );
            return;
        }
    };

    for (index, child) in children.iter().enumerate() {
        let child_path = format!("{path}.children[{index}]");
        let Some(span) = child.as_object() else {
            issues.push(
                ValidationIssue::error(
                    &child_path,
                    format!("Block child must be an object, got {}", describe(child)),
                )
                .with_value(child)
                .with_expected("{ \"_type\": \"span\", \"_key\": \"...\", \"text\": \"...\" }"),
            );
            continue;
        };
        match span.get("_type") {
            None | Some(Value::Null) => issues.push(
                ValidationIssue::error(format!("{child_path}._type"), "Block child is missing _type")
                    .suggest("Add \"_type\": \"span\""),
            ),
            Some(Value::String(kind)) if kind == "span" => {
                if !span.get("text").is_some_and(Value::is_string) {
                    issues.push(
                        ValidationIssue::error(
                            format!("{child_path}.text"),
                            "Span text must be a string",
                        )
                        .with_expected("string")
                        .suggest("Add \"text\": \"\""),
                    );
                }
            }
            Some(_) => {}
        }
        if is_absent(span, "_key") {
            issues.push(
                ValidationIssue::warning(format!("{child_path}._key"), "Block child is missing _key")
                    .suggest("Add a unique \"_key\" to the span"),
            );
        }
    }
}

/// A missing key or an explicit `null`.
fn is_absent(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_none_or(Value::is_null)
}

fn type_mismatch(value: &Value, field: &SchemaType, path: &str, expected: &str) -> ValidationIssue {
    ValidationIssue::error(
        path,
        format!("Expected {expected}, got {}", describe(value)),
    )
    .with_value(value)
    .with_field(field)
    .with_expected(expected_shape(&field.kind))
}

/// Parses the date and datetime spellings accepted by date fields.
pub(crate) fn parse_calendar(text: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// JSON type name of a value, for messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Formats a number without a trailing `.0` for whole values.
pub(crate) fn fmt_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

fn expected_shape(kind: &Kind) -> String {
    match kind {
        Kind::String | Kind::Text => "string".to_string(),
        Kind::Number => "number".to_string(),
        Kind::Boolean => "boolean".to_string(),
        Kind::Date => "ISO 8601 date string".to_string(),
        Kind::Datetime => "ISO 8601 datetime string".to_string(),
        Kind::Array => "array".to_string(),
        Kind::Reference => "reference object with _ref".to_string(),
        Kind::Image | Kind::File => format!("{kind} object with asset reference"),
        Kind::Slug => "slug object with current".to_string(),
        Kind::Url => "absolute URL string".to_string(),
        Kind::Block => "portable text block".to_string(),
        Kind::Document | Kind::Object => "object".to_string(),
        Kind::Custom(name) => format!("{name} value"),
    }
}

fn example_value(kind: &Kind) -> &'static str {
    match kind {
        Kind::String | Kind::Text => "\"...\"",
        Kind::Number => "0",
        Kind::Boolean => "false",
        Kind::Date => "\"2024-01-15\"",
        Kind::Datetime => "\"2024-01-15T10:30:00Z\"",
        Kind::Array => "[]",
        Kind::Reference => "{ \"_type\": \"reference\", \"_ref\": \"<document id>\" }",
        Kind::Image | Kind::File => "{ \"asset\": { \"_type\": \"reference\", \"_ref\": \"<asset id>\" } }",
        Kind::Slug => "{ \"_type\": \"slug\", \"current\": \"my-slug\" }",
        Kind::Url => "\"https://example.com\"",
        Kind::Block => "{ \"_type\": \"block\", \"children\": [] }",
        Kind::Document | Kind::Object | Kind::Custom(_) => "{ ... }",
    }
}
