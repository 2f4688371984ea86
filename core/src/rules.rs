//! Generic constraint rules applied after a field's structural check.
//!
//! Every rule attached to a field is visited, whatever the field's kind.
//! Bounds are interpreted against the runtime type of the value: string
//! length, numeric value, or array item count.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};
use url::{ParseError, Url};

use crate::validate::{fmt_number, parse_calendar};
use crate::{Kind, RuleFlag, SchemaType, ValidationIssue, ValidationRule};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

pub(crate) fn apply_rules(
    value: &Value,
    field: &SchemaType,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for rule in field.rules() {
        match &rule.flag {
            RuleFlag::Min => check_bound(value, field, rule, path, Bound::Min, issues),
            RuleFlag::Max => check_bound(value, field, rule, path, Bound::Max, issues),
            RuleFlag::Length => check_length(value, field, rule, path, issues),
            RuleFlag::Regex => check_regex(value, field, rule, path, issues),
            RuleFlag::Email => check_email(value, field, rule, path, issues),
            RuleFlag::Uri => check_uri(value, field, rule, path, issues),
            RuleFlag::Unique => {
                trace!(path, "unique needs a dataset-wide index; not evaluated");
            }
            RuleFlag::Custom => issues.push(
                ValidationIssue::info(path, "Custom validation rule cannot be evaluated")
                    .with_rule(rule)
                    .with_field(field),
            ),
            // Structural, handled by the kind check.
            RuleFlag::Presence | RuleFlag::Integer | RuleFlag::Positive => {}
            RuleFlag::Other(flag) => {
                trace!(path, flag = %flag, "ignoring unrecognized rule flag");
            }
        }
    }
}

fn check_bound(
    value: &Value,
    field: &SchemaType,
    rule: &ValidationRule,
    path: &str,
    bound: Bound,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(limit) = rule.number() else {
        check_date_bound(value, field, rule, path, bound, issues);
        return;
    };
    let shown = fmt_number(limit);

    let issue = match value {
        Value::String(text) => {
            let length = text.chars().count();
            count_violation(length, limit, bound).map(|delta| {
                let (message, fix) = match bound {
                    Bound::Min => (
                        format!("Must be at least {shown} characters long (currently {length})"),
                        format!("Add {delta} more character(s)"),
                    ),
                    Bound::Max => (
                        format!("Must be at most {shown} characters long (currently {length})"),
                        format!("Remove {delta} character(s)"),
                    ),
                };
                ValidationIssue::error(path, message)
                    .with_expected(expected_count(bound, &shown, "characters"))
                    .suggest(fix)
            })
        }
        Value::Array(items) => count_violation(items.len(), limit, bound).map(|delta| {
            let length = items.len();
            let (message, fix) = match bound {
                Bound::Min => (
                    format!("Must have at least {shown} item(s) (currently {length})"),
                    format!("Add {delta} more item(s)"),
                ),
                Bound::Max => (
                    format!("Must have at most {shown} item(s) (currently {length})"),
                    format!("Remove {delta} item(s)"),
                ),
            };
            ValidationIssue::error(path, message)
                .with_expected(expected_count(bound, &shown, "items"))
                .suggest(fix)
        }),
        Value::Number(number) => {
            let number = number.as_f64().unwrap_or(f64::NAN);
            let violated = match bound {
                Bound::Min => number < limit,
                Bound::Max => number > limit,
            };
            violated.then(|| {
                let (message, expected) = match bound {
                    Bound::Min => (
                        format!(
                            "Must be greater than or equal to {shown} (got {})",
                            fmt_number(number)
                        ),
                        format!(">= {shown}"),
                    ),
                    Bound::Max => (
                        format!(
                            "Must be less than or equal to {shown} (got {})",
                            fmt_number(number)
                        ),
                        format!("<= {shown}"),
                    ),
                };
                ValidationIssue::error(path, message)
                    .with_expected(expected)
                    .suggest(format!("Use {shown}"))
            })
        }
        _ => None,
    };

    if let Some(issue) = issue {
        issues.push(issue.with_rule(rule).with_value(value).with_field(field));
    }
}

/// Returns how far `length` is past `limit`, if it violates the bound.
fn count_violation(length: usize, limit: f64, bound: Bound) -> Option<usize> {
    let length = length as f64;
    match bound {
        Bound::Min if length < limit => Some((limit - length).ceil() as usize),
        Bound::Max if length > limit => Some((length - limit).ceil() as usize),
        _ => None,
    }
}

fn expected_count(bound: Bound, shown: &str, unit: &str) -> String {
    match bound {
        Bound::Min => format!("at least {shown} {unit}"),
        Bound::Max => format!("at most {shown} {unit}"),
    }
}

/// `min`/`max` with a date constraint on a date or datetime field.
fn check_date_bound(
    value: &Value,
    field: &SchemaType,
    rule: &ValidationRule,
    path: &str,
    bound: Bound,
    issues: &mut Vec<ValidationIssue>,
) {
    if !matches!(field.kind, Kind::Date | Kind::Datetime) {
        return;
    }
    let (Some(limit_text), Some(text)) = (rule.text(), value.as_str()) else {
        return;
    };
    let (Some(limit), Some(actual)) = (parse_calendar(limit_text), parse_calendar(text)) else {
        return;
    };

    let message = match bound {
        Bound::Min if actual < limit => format!("Must be on or after {limit_text}"),
        Bound::Max if actual > limit => format!("Must be on or before {limit_text}"),
        _ => return,
    };
    issues.push(
        ValidationIssue::error(path, message)
            .with_rule(rule)
            .with_value(value)
            .with_field(field)
            .suggest(format!("Use {limit_text}")),
    );
}

fn check_length(
    value: &Value,
    field: &SchemaType,
    rule: &ValidationRule,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let (Some(exact), Some(text)) = (rule.number(), value.as_str()) else {
        return;
    };
    let length = text.chars().count();
    if length as f64 == exact {
        return;
    }

    let shown = fmt_number(exact);
    let fix = if (length as f64) < exact {
        format!("Add {} more character(s)", (exact - length as f64).ceil() as usize)
    } else {
        format!("Remove {} character(s)", (length as f64 - exact).ceil() as usize)
    };
    issues.push(
        ValidationIssue::error(
            path,
            format!("Must be exactly {shown} characters long (currently {length})"),
        )
        .with_rule(rule)
        .with_value(value)
        .with_field(field)
        .with_expected(format!("exactly {shown} characters"))
        .suggest(fix),
    );
}

fn check_regex(
    value: &Value,
    field: &SchemaType,
    rule: &ValidationRule,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let (pattern, name, invert) = match &rule.constraint {
        Some(Value::String(pattern)) => (pattern.as_str(), None, false),
        Some(Value::Object(record)) => {
            let Some(pattern) = record.get("pattern").and_then(Value::as_str) else {
                return;
            };
            (
                pattern,
                record.get("name").and_then(Value::as_str),
                record.get("invert").and_then(Value::as_bool).unwrap_or(false),
            )
        }
        _ => return,
    };
    let Some(text) = value.as_str() else {
        return;
    };

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            debug!(path, pattern, error = %err, "skipping regex rule with invalid pattern");
            return;
        }
    };
    if regex.is_match(text) != invert {
        return;
    }

    let label = name.map_or_else(|| format!("/{pattern}/"), |name| format!("\"{name}\""));
    let (message, expected) = if invert {
        (
            format!("Must not match the {label} pattern"),
            format!("a string not matching /{pattern}/"),
        )
    } else {
        (
            format!("Does not match the {label} pattern"),
            format!("a string matching /{pattern}/"),
        )
    };
    issues.push(
        ValidationIssue::error(path, message)
            .with_rule(rule)
            .with_value(value)
            .with_field(field)
            .with_expected(expected),
    );
}

fn check_email(
    value: &Value,
    field: &SchemaType,
    rule: &ValidationRule,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(text) = value.as_str() else {
        return;
    };
    if EMAIL.is_match(text) {
        return;
    }
    issues.push(
        ValidationIssue::error(path, format!("\"{text}\" is not a valid email address"))
            .with_rule(rule)
            .with_value(value)
            .with_field(field)
            .with_expected("local@domain")
            .suggest("Use the form name@example.com"),
    );
}

fn check_uri(
    value: &Value,
    field: &SchemaType,
    rule: &ValidationRule,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(text) = value.as_str() else {
        return;
    };
    let allow_relative = rule
        .entry("allowRelative")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let schemes: Vec<&str> = match rule.entry("scheme") {
        Some(Value::String(scheme)) => vec![scheme.as_str()],
        Some(Value::Array(schemes)) => schemes.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    match Url::parse(text) {
        Ok(url) => {
            if schemes.is_empty() || schemes.iter().any(|s| s.eq_ignore_ascii_case(url.scheme())) {
                return;
            }
            let mut issue = ValidationIssue::error(
                path,
                format!("URI scheme \"{}\" is not allowed", url.scheme()),
            )
            .with_rule(rule)
            .with_value(value)
            .with_field(field)
            .with_expected(format!("scheme one of: {}", schemes.join(", ")));
            for scheme in &schemes {
                issue = issue.suggest(format!("Use a {scheme}: URI"));
            }
            issues.push(issue);
        }
        Err(ParseError::RelativeUrlWithoutBase) if allow_relative => {}
        // Url fields already reported the malformed value structurally.
        Err(_) if field.kind == Kind::Url => {}
        Err(_) => issues.push(
            ValidationIssue::error(path, format!("\"{text}\" is not a valid URI"))
                .with_rule(rule)
                .with_value(value)
                .with_field(field)
                .with_expected("absolute URI")
                .suggest("Include the scheme, e.g. \"https://example.com\""),
        ),
    }
}
