use std::path::{Path, PathBuf};

use docschema_catalog::{
    CatalogError, TypeCatalog, ValidatorConfig, build_bundle, read_value,
};
use docschema_core::{Kind, SchemaError, SchemaPackage, SchemaType, ValidationRule};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn blog_types() -> Vec<SchemaType> {
    vec![
        SchemaType::new("seo", Kind::Object)
            .with_field(SchemaType::new("metaTitle", Kind::String).with_rule(ValidationRule::max(60.0))),
        SchemaType::new("article", Kind::Document)
            .with_field(SchemaType::new("title", Kind::String).required())
            .with_field(SchemaType::new("seo", Kind::Custom("seo".into()))),
    ]
}

fn write_bundle(dir: &Path, package: &SchemaPackage) -> PathBuf {
    let path = dir.join("schemas.json");
    std::fs::write(&path, serde_json::to_string_pretty(package).unwrap()).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

#[test]
fn test_bundle_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = build_bundle(blog_types(), "1.0.0", "2024-01-15T10:30:00Z").unwrap();
    let path = write_bundle(dir.path(), &bundle);

    let catalog = TypeCatalog::from_bundle(&path).unwrap();
    assert_eq!(catalog.types(), blog_types().as_slice());

    // A bundle in a schema directory loads like any other schema file.
    let from_dir = TypeCatalog::from_dir(dir.path()).unwrap();
    assert_eq!(from_dir.len(), 2);
}

#[test]
fn test_tampered_bundle_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut bundle = build_bundle(blog_types(), "1.0.0", "2024-01-15T10:30:00Z").unwrap();
    bundle.types[0].name = "meta".into();
    let path = write_bundle(dir.path(), &bundle);

    let err = TypeCatalog::from_bundle(&path).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidChecksum(_)));
    assert!(err.to_string().starts_with("invalid checksum"));
}

#[test]
fn test_bundle_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = build_bundle(blog_types(), "1.0.0", "2024-01-15T10:30:00Z").unwrap();
    let path = dir.path().join("schemas.yaml");
    std::fs::write(&path, serde_yaml::to_string(&bundle).unwrap()).unwrap();

    let catalog = TypeCatalog::from_bundle(&path).unwrap();
    assert!(catalog.contains("article"));
}

// ---------------------------------------------------------------------------
// Validation through the catalog
// ---------------------------------------------------------------------------

#[test]
fn test_validation_resolves_custom_objects_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let types = blog_types();
    for schema in &types {
        let path = dir.path().join(format!("{}.json", schema.name));
        std::fs::write(&path, serde_json::to_string(schema).unwrap()).unwrap();
    }

    let catalog = TypeCatalog::from_paths(&[dir.path().to_path_buf()]).unwrap();
    let options = ValidatorConfig::default().options();
    let result = catalog
        .validate(
            &json!({"_type": "article", "title": "Hi", "seo": {"metaTitle": "m".repeat(70)}}),
            &options,
        )
        .unwrap();

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "seo.metaTitle");
}

#[test]
fn test_validate_as_ignores_document_type_for_root_choice() {
    let catalog = TypeCatalog::from_types(blog_types());
    let result = catalog
        .validate_as(
            &json!({"_type": "post", "title": "Hi"}),
            "article",
            &ValidatorConfig::default().options(),
        )
        .unwrap();
    assert_eq!(result.document_type, "article");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, "_type");
}

#[test]
fn test_catalog_lint_reports_unknown_kinds() {
    let mut types = blog_types();
    types.remove(0);
    let catalog = TypeCatalog::from_types(types);
    assert_eq!(
        catalog.lint(),
        vec![SchemaError::UnknownKind {
            path: "article.seo".into(),
            kind: "seo".into(),
        }]
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_catalog_falls_back_to_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = build_bundle(blog_types(), "1.0.0", "2024-01-15T10:30:00Z").unwrap();
    let bundle_path = write_bundle(dir.path(), &bundle);

    let mut config = ValidatorConfig::default();
    config.catalog.dirs.push(dir.path().join("missing"));
    config.catalog.bundles.push(bundle_path);

    let catalog = config.catalog().unwrap();
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_read_value_handles_yaml_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.yml");
    std::fs::write(&path, "_type: article\ntitle: Hello\ntags:\n  - a\n  - b\n").unwrap();

    let value = read_value(&path).unwrap();
    assert_eq!(
        value,
        json!({"_type": "article", "title": "Hello", "tags": ["a", "b"]})
    );

    let other = dir.path().join("doc.toml");
    std::fs::write(&other, "").unwrap();
    assert!(matches!(read_value(&other), Err(CatalogError::InvalidInput(_))));
}
