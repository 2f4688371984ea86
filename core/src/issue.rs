//! Validation issues and the result value produced by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{SchemaType, ValidationRule};

/// How serious an issue is.
///
/// Only [`Severity::Error`] makes a document invalid.
///
/// # Examples
///
/// ```
/// use docschema_core::Severity;
///
/// assert!(Severity::Info < Severity::Warning);
/// assert!(Severity::Warning < Severity::Error);
/// assert_eq!(Severity::Warning.to_string(), "warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; the engine could not evaluate something.
    Info,
    /// Recoverable shape issue that does not invalidate the document.
    Warning,
    /// Violation that makes the document invalid.
    Error,
}

impl Severity {
    /// Returns the lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name, kind, and title of the field an issue was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldContext {
    /// Field name.
    pub name: String,
    /// Kind tag of the field.
    pub kind: String,
    /// Field title, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl From<&SchemaType> for FieldContext {
    fn from(field: &SchemaType) -> Self {
        Self {
            name: field.name.clone(),
            kind: field.kind.to_string(),
            title: field.title.clone(),
        }
    }
}

/// One problem found while validating a document.
///
/// `path` uses dot/bracket notation (`content[0].children[2].text`).
/// `suggestions` are ordered most-preferred first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Location of the problem in the document.
    pub path: String,
    /// Human-readable description.
    pub message: String,
    /// Severity of the problem.
    pub severity: Severity,
    /// Rule that was violated, if the issue came from a declared rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<ValidationRule>,
    /// Offending value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Description of the accepted shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Field the issue was found on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldContext>,
    /// Remediation hints, most-preferred first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ValidationIssue {
    /// Creates an issue with the given severity.
    pub fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity,
            rule: None,
            value: None,
            expected: None,
            field: None,
            suggestions: Vec::new(),
        }
    }

    /// Creates an error-severity issue.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, path, message)
    }

    /// Creates a warning-severity issue.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, path, message)
    }

    /// Creates an info-severity issue.
    pub fn info(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, path, message)
    }

    /// Attaches the violated rule.
    pub fn with_rule(mut self, rule: &ValidationRule) -> Self {
        self.rule = Some(rule.clone());
        self
    }

    /// Attaches the offending value.
    pub fn with_value(mut self, value: &Value) -> Self {
        self.value = Some(value.clone());
        self
    }

    /// Describes the accepted shape.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attaches field context.
    pub fn with_field(mut self, field: &SchemaType) -> Self {
        self.field = Some(FieldContext::from(field));
        self
    }

    /// Appends a suggestion.
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Returns the highest-priority suggestion.
    pub fn best_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }

    /// Returns `true` for error-severity issues.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of validating one document.
///
/// `valid` is `true` iff there are no error-severity issues; warnings and
/// info never affect it. `issues` keeps the engine's discovery order and is
/// filtered by the caller's severity options, as are `warnings` and `info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `true` iff no error-severity issues were found.
    pub valid: bool,
    /// All reported issues, filtered by severity options.
    pub issues: Vec<ValidationIssue>,
    /// Error-severity issues (always populated).
    pub errors: Vec<ValidationIssue>,
    /// Warning-severity issues (empty unless warnings are included).
    pub warnings: Vec<ValidationIssue>,
    /// Info-severity issues (empty unless info is included).
    pub info: Vec<ValidationIssue>,
    /// Name of the type the document was validated against.
    pub document_type: String,
    /// One-line human summary.
    pub summary: String,
}

impl ValidationResult {
    /// Partitions raw engine output into a result.
    ///
    /// # Examples
    ///
    /// ```
    /// use docschema_core::{ValidationIssue, ValidationResult};
    ///
    /// let issues = vec![
    ///     ValidationIssue::warning("tags[0]", "Array item is missing a _key"),
    ///     ValidationIssue::info("body", "Custom validation rule cannot be evaluated"),
    /// ];
    /// let result = ValidationResult::from_issues("post", issues, true, false);
    /// assert!(result.valid);
    /// assert_eq!(result.warnings.len(), 1);
    /// assert!(result.info.is_empty());
    /// assert_eq!(result.summary, "Document is valid (1 warning(s))");
    /// ```
    pub fn from_issues(
        document_type: &str,
        issues: Vec<ValidationIssue>,
        include_warnings: bool,
        include_info: bool,
    ) -> Self {
        let issues: Vec<ValidationIssue> = issues
            .into_iter()
            .filter(|issue| match issue.severity {
                Severity::Error => true,
                Severity::Warning => include_warnings,
                Severity::Info => include_info,
            })
            .collect();

        let of = |severity: Severity| -> Vec<ValidationIssue> {
            issues
                .iter()
                .filter(|issue| issue.severity == severity)
                .cloned()
                .collect()
        };
        let errors = of(Severity::Error);
        let warnings = of(Severity::Warning);
        let info = of(Severity::Info);

        let summary = summarize(errors.len(), warnings.len(), info.len());

        Self {
            valid: errors.is_empty(),
            issues,
            errors,
            warnings,
            info,
            document_type: document_type.to_string(),
            summary,
        }
    }

    /// Returns the number of error-severity issues.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

fn summarize(errors: usize, warnings: usize, info: usize) -> String {
    if errors == 0 {
        return if warnings == 0 {
            "Document is valid".to_string()
        } else {
            format!("Document is valid ({warnings} warning(s))")
        };
    }

    let mut summary = format!("Validation failed: {errors} error(s)");
    if warnings > 0 {
        summary.push_str(&format!(", {warnings} warning(s)"));
    }
    if info > 0 {
        summary.push_str(&format!(", {info} info"));
    }
    summary
}
