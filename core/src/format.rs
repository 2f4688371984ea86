//! Projections of a [`ValidationResult`] for people and for tools.
//!
//! [`format_human`] renders a line-oriented report that starts with the
//! summary; [`format_agent`] reduces the result to errors with a single best
//! suggestion each.

use serde::{Deserialize, Serialize};

use crate::{Severity, ValidationResult};

/// Glyph printed before an issue of the given severity.
pub fn severity_glyph(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✖",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    }
}

/// Renders the human-readable report.
///
/// The first line is the summary. Each issue follows as
/// `glyph path: message`, with its first suggestion on an indented line.
///
/// # Examples
///
/// ```
/// use docschema_core::{format_human, ValidationIssue, ValidationResult};
///
/// let issues = vec![
///     ValidationIssue::error("title", "Required field \"title\" is missing")
///         .suggest("Add \"title\": \"...\""),
/// ];
/// let result = ValidationResult::from_issues("article", issues, true, false);
/// let report = format_human(&result);
/// let lines: Vec<&str> = report.lines().collect();
/// assert_eq!(lines[0], "Validation failed: 1 error(s)");
/// assert_eq!(lines[1], "✖ title: Required field \"title\" is missing");
/// assert_eq!(lines[2], "    → Add \"title\": \"...\"");
/// ```
pub fn format_human(result: &ValidationResult) -> String {
    let mut lines = vec![result.summary.clone()];
    for issue in &result.issues {
        lines.push(format!(
            "{} {}: {}",
            severity_glyph(issue.severity),
            issue.path,
            issue.message
        ));
        if let Some(suggestion) = issue.best_suggestion() {
            lines.push(format!("    → {suggestion}"));
        }
    }
    lines.join("\n")
}

/// One error reduced for automated consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIssue {
    /// Location of the error.
    pub path: String,
    /// Human-readable description.
    pub message: String,
    /// Highest-priority suggestion only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Description of the accepted shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

/// Compact machine-oriented summary of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReport {
    /// `true` iff the document has no errors.
    pub valid: bool,
    /// One-line summary.
    pub summary: String,
    /// Number of errors.
    pub error_count: usize,
    /// Error-severity issues only.
    pub errors: Vec<AgentIssue>,
}

/// Builds the compact report: errors only, one suggestion each.
///
/// # Examples
///
/// ```
/// use docschema_core::{format_agent, ValidationIssue, ValidationResult};
///
/// let issues = vec![
///     ValidationIssue::error("status", "Value \"live\" is not one of the allowed options")
///         .suggest("Use \"draft\"")
///         .suggest("Use \"published\""),
///     ValidationIssue::warning("tags[0]", "Array item is missing a _key"),
/// ];
/// let result = ValidationResult::from_issues("article", issues, true, false);
/// let report = format_agent(&result);
/// assert_eq!(report.error_count, 1);
/// assert_eq!(report.errors[0].suggestion.as_deref(), Some("Use \"draft\""));
/// ```
pub fn format_agent(result: &ValidationResult) -> AgentReport {
    AgentReport {
        valid: result.valid,
        summary: result.summary.clone(),
        error_count: result.errors.len(),
        errors: result
            .errors
            .iter()
            .map(|issue| AgentIssue {
                path: issue.path.clone(),
                message: issue.message.clone(),
                suggestion: issue.best_suggestion().map(str::to_string),
                expected: issue.expected.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use crate::ValidationIssue;

    use super::*;

    fn mixed_result() -> ValidationResult {
        let issues = vec![
            ValidationIssue::error("title", "Must be at most 5 characters long (currently 7)")
                .with_expected("at most 5 characters")
                .suggest("Remove 2 character(s)"),
            ValidationIssue::warning("slug.current", "Slug \"Hi There\" should only contain lowercase letters, digits, and hyphens")
                .suggest("Use \"hi-there\""),
            ValidationIssue::info("body", "Custom validation rule cannot be evaluated"),
        ];
        ValidationResult::from_issues("article", issues, true, true)
    }

    #[test]
    fn test_human_report_lists_every_issue_in_order() {
        let report = format_human(&mixed_result());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Validation failed: 1 error(s), 1 warning(s), 1 info",
                "✖ title: Must be at most 5 characters long (currently 7)",
                "    → Remove 2 character(s)",
                "⚠ slug.current: Slug \"Hi There\" should only contain lowercase letters, digits, and hyphens",
                "    → Use \"hi-there\"",
                "ℹ body: Custom validation rule cannot be evaluated",
            ]
        );
    }

    #[test]
    fn test_human_report_for_valid_document() {
        let result = ValidationResult::from_issues("article", Vec::new(), true, false);
        assert_eq!(format_human(&result), "Document is valid");
    }

    #[test]
    fn test_agent_report_keeps_errors_only() {
        let report = format_agent(&mixed_result());
        assert!(!report.valid);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].expected.as_deref(), Some("at most 5 characters"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errorCount"], 1);
        assert_eq!(json["errors"][0]["suggestion"], "Remove 2 character(s)");
    }
}
