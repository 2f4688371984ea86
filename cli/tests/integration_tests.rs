use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("docschema_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn docschema(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docschema"))
        .args(args)
        .env_remove("DOCSCHEMA_LOG")
        .output()
        .expect("failed to run docschema")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Article schema with a required title and a slug.
fn write_article_schema(dir: &TempDir) -> PathBuf {
    let schema = serde_json::json!({
        "type": "document",
        "name": "article",
        "title": "Article",
        "fields": [
            {
                "type": "string",
                "name": "title",
                "validation": [{"rules": [
                    {"flag": "presence", "constraint": "required"},
                    {"flag": "max", "constraint": 20}
                ]}]
            },
            {"type": "slug", "name": "slug"}
        ]
    });
    let path = dir.join("article.json");
    fs::write(&path, serde_json::to_string_pretty(&schema).unwrap())
        .expect("failed to write schema");
    path
}

fn write_document(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap())
        .expect("failed to write document");
    path
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_valid_document() {
    let dir = TempDir::new("validate_ok");
    let schema = write_article_schema(&dir);
    let doc = write_document(
        &dir,
        "doc.json",
        serde_json::json!({"_type": "article", "title": "Hello", "slug": {"current": "hello"}}),
    );

    let output = docschema(&[
        "validate",
        "--schemas",
        schema.to_str().unwrap(),
        doc.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Document is valid"));
}

#[test]
fn validate_reports_errors_and_exits_nonzero() {
    let dir = TempDir::new("validate_err");
    let schema = write_article_schema(&dir);
    let doc = write_document(&dir, "doc.json", serde_json::json!({"_type": "article"}));

    let output = docschema(&[
        "validate",
        "--schemas",
        schema.to_str().unwrap(),
        doc.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Validation failed: 1 error(s)"));
    assert!(out.contains("✖ title: Required field \"title\" is missing"));
    assert!(stderr(&output).contains("1 of 1 document(s) failed validation"));
}

#[test]
fn validate_agent_format_lists_each_array_element() {
    let dir = TempDir::new("validate_agent");
    let schema = write_article_schema(&dir);
    let doc = write_document(
        &dir,
        "docs.json",
        serde_json::json!([
            {"_type": "article", "title": "Fine"},
            {"_type": "article", "title": "This title is far too long"}
        ]),
    );

    let output = docschema(&[
        "validate",
        "--schemas",
        schema.to_str().unwrap(),
        "--format",
        "agent",
        doc.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0]["document"].as_str().unwrap().ends_with("docs.json[0]"));
    assert_eq!(reports[0]["valid"], true);
    assert_eq!(reports[1]["valid"], false);
    assert_eq!(reports[1]["errorCount"], 1);
    assert_eq!(reports[1]["errors"][0]["path"], "title");
    assert_eq!(reports[1]["errors"][0]["suggestion"], "Remove 6 character(s)");
}

#[test]
fn validate_with_explicit_type_and_yaml_document() {
    let dir = TempDir::new("validate_type");
    let schema = write_article_schema(&dir);
    let doc = dir.join("doc.yaml");
    fs::write(&doc, "_type: article\ntitle: Hello\nslug:\n  current: Hello World\n").unwrap();

    let output = docschema(&[
        "validate",
        "--schemas",
        schema.to_str().unwrap(),
        "--type",
        "article",
        "--format",
        "json",
        doc.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(reports[0]["documentType"], "article");
    assert_eq!(reports[0]["warnings"][0]["path"], "slug.current");
}

#[test]
fn validate_no_warnings_flag_drops_warnings() {
    let dir = TempDir::new("validate_no_warn");
    let schema = write_article_schema(&dir);
    let doc = write_document(
        &dir,
        "doc.json",
        serde_json::json!({"_type": "article", "title": "Hi", "slug": {"current": "Not Canonical"}}),
    );

    let output = docschema(&[
        "validate",
        "--schemas",
        schema.to_str().unwrap(),
        "--no-warnings",
        "--format",
        "json",
        doc.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(reports[0]["warnings"].as_array().unwrap().len(), 0);
    assert_eq!(reports[0]["summary"], "Document is valid");
}

#[test]
fn validate_uses_config_catalog_and_format() {
    let dir = TempDir::new("validate_config");
    let schemas = TempDir::new("validate_config_schemas");
    write_article_schema(&schemas);
    let doc = write_document(&dir, "doc.json", serde_json::json!({"_type": "article"}));
    let config = dir.join("docschema.yml");
    fs::write(
        &config,
        format!(
            "version: \"1.0\"\ncatalog:\n  dirs:\n    - {}\noutput:\n  format: agent\n",
            schemas.path.display()
        ),
    )
    .unwrap();

    let output = docschema(&[
        "validate",
        "--config",
        config.to_str().unwrap(),
        doc.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(reports[0]["errors"][0]["path"], "title");
}

#[test]
fn validate_without_schemas_fails() {
    let dir = TempDir::new("validate_no_schemas");
    let doc = write_document(&dir, "doc.json", serde_json::json!({"_type": "article"}));

    let output = docschema(&["validate", doc.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--schemas"));
}

#[test]
fn validate_unknown_document_type_fails() {
    let dir = TempDir::new("validate_unknown");
    let schema = write_article_schema(&dir);
    let doc = write_document(&dir, "doc.json", serde_json::json!({"_type": "video"}));

    let output = docschema(&[
        "validate",
        "--schemas",
        schema.to_str().unwrap(),
        doc.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown type: video"));
}

// ---------------------------------------------------------------------------
// lint / bundle / types
// ---------------------------------------------------------------------------

#[test]
fn lint_reports_schema_problems() {
    let dir = TempDir::new("lint");
    let path = dir.join("broken.json");
    fs::write(
        &path,
        r#"{"type": "document", "name": "post", "fields": [{"type": "array", "name": "tags"}]}"#,
    )
    .unwrap();

    let output = docschema(&["lint", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("array field declares no member types: post.tags"));
}

#[test]
fn lint_accepts_clean_schema() {
    let dir = TempDir::new("lint_clean");
    let schema = write_article_schema(&dir);

    let output = docschema(&["lint", schema.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No problems found in 1 type(s)."));
}

#[test]
fn bundle_writes_hashed_package() {
    let dir = TempDir::new("bundle");
    write_article_schema(&dir);
    let out = dir.join("dist/schemas.json");

    let output = docschema(&[
        "bundle",
        dir.join("article.json").to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--name",
        "blog",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let package: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(package["name"], "blog");
    assert_eq!(package["types"].as_array().unwrap().len(), 1);
    assert_eq!(package["bundle_hash"].as_str().unwrap().len(), 64);

    // The bundle is a valid schema source for validation.
    let doc = write_document(&dir, "doc.json", serde_json::json!({"_type": "article", "title": "Hi"}));
    let output = docschema(&[
        "validate",
        "--schemas",
        out.to_str().unwrap(),
        doc.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn types_lists_names_and_kinds() {
    let dir = TempDir::new("types");
    let schema = write_article_schema(&dir);

    let output = docschema(&["types", schema.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "article\tdocument\tArticle");
}
