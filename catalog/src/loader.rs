//! Catalog loading with builder pattern and fallback chains.
//!
//! Provides [`TypeCatalog`] for name lookup and validation over a set of
//! schema types, and [`CatalogBuilder`] for loading a catalog from the first
//! source that works.
//!
//! # Loading patterns
//!
//! ```no_run
//! use docschema_catalog::TypeCatalog;
//!
//! // Every .json/.yaml/.yml file in a directory
//! let catalog = TypeCatalog::from_dir("schemas/").unwrap();
//! assert!(catalog.get("article").is_some());
//!
//! // A single hashed bundle
//! let catalog = TypeCatalog::from_bundle("schemas.json").unwrap();
//!
//! // Fallback chain
//! let catalog = TypeCatalog::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .build()
//!     .unwrap();
//! ```
//!
//! A schema file may hold one type, a list of types, or a
//! [`SchemaPackage`]. JSON and YAML are both accepted, chosen by extension.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use docschema_core::{
    Kind, SchemaError, SchemaPackage, SchemaType, TypeLookup, ValidationOptions, ValidationResult,
    lint_catalog, validate_document,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bundle::verify_bundle;
use crate::error::{CatalogError, Result};

/// Describes where a [`TypeCatalog`] was loaded from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Built from in-memory types.
    Memory,
    /// Loaded from one schema file.
    File(PathBuf),
    /// Loaded from a directory of schema files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaPackage`] file.
    Bundle(PathBuf),
    /// Loaded from a mix of files and directories.
    Paths(Vec<PathBuf>),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CatalogSource>),
}

/// Ordered collection of schema types with lookup by name.
///
/// Declaration order is preserved for listing and linting; lookups go
/// through a name index. When two types share a name, the later one wins
/// the lookup (the linter reports the duplicate).
///
/// # Examples
///
/// ```
/// use docschema_catalog::TypeCatalog;
/// use docschema_core::{Kind, SchemaType, ValidationOptions};
/// use serde_json::json;
///
/// let catalog = TypeCatalog::from_types(vec![
///     SchemaType::new("post", Kind::Document)
///         .with_field(SchemaType::new("title", Kind::String).required()),
/// ]);
///
/// let result = catalog
///     .validate(&json!({"_type": "post"}), &ValidationOptions::default())
///     .unwrap();
/// assert!(!result.valid);
/// assert_eq!(result.errors[0].path, "title");
/// ```
#[derive(Debug)]
pub struct TypeCatalog {
    types: Vec<SchemaType>,
    index: HashMap<String, usize>,
    source: CatalogSource,
}

impl TypeCatalog {
    /// Returns a new [`CatalogBuilder`] for configuring a fallback chain.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Builds a catalog from in-memory types.
    pub fn from_types(types: Vec<SchemaType>) -> Self {
        Self::with_source(types, CatalogSource::Memory)
    }

    fn with_source(types: Vec<SchemaType>, source: CatalogSource) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(position, schema)| (schema.name.clone(), position))
            .collect();
        Self {
            types,
            index,
            source,
        }
    }

    /// Loads the types in one schema file.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`](CatalogError::InvalidInput) for an
    /// unsupported extension, [`IoError`](CatalogError::IoError) if the file
    /// cannot be read, a JSON/YAML error if it does not parse, or
    /// [`InvalidChecksum`](CatalogError::InvalidChecksum) for a tampered
    /// bundle.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let types = read_schema_file(path)?;
        Ok(Self::with_source(types, CatalogSource::File(path.to_path_buf())))
    }

    /// Loads every schema file in a directory, in path order.
    ///
    /// Files without a `.json`, `.yaml`, or `.yml` extension are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](CatalogError::IoError) if the directory cannot be
    /// read, or the first error from any file.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut types = Vec::new();
        for file in schema_files_in(path)? {
            types.extend(read_schema_file(&file)?);
        }
        Ok(Self::with_source(types, CatalogSource::Directory(path.to_path_buf())))
    }

    /// Loads a single [`SchemaPackage`] file and verifies its hash.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](CatalogError::IoError) if the file cannot be read,
    /// a JSON/YAML error if it is not a package, or
    /// [`InvalidChecksum`](CatalogError::InvalidChecksum) on hash mismatch.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = read_value(path)?;
        let package: SchemaPackage = serde_json::from_value(value)?;
        verify_bundle(&package)?;
        debug!(path = %path.display(), types = package.types.len(), "loaded schema bundle");
        Ok(Self::with_source(package.types, CatalogSource::Bundle(path.to_path_buf())))
    }

    /// Loads a mix of schema files and directories.
    ///
    /// Directories contribute their schema files; files are loaded as given.
    /// Every file is read once, in path order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`](CatalogError::InvalidInput) if `inputs` is
    /// empty, a path does not exist, or a file has an unsupported extension;
    /// otherwise the first load error.
    pub fn from_paths(inputs: &[PathBuf]) -> Result<Self> {
        let files = collect_schema_files(inputs)?;
        let mut types = Vec::new();
        for file in &files {
            types.extend(read_schema_file(file)?);
        }
        Ok(Self::with_source(types, CatalogSource::Paths(inputs.to_vec())))
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.index.get(name).map(|&position| &self.types[position])
    }

    /// Returns `true` if the catalog declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the number of types, duplicates included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the catalog holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|schema| schema.name.as_str())
    }

    /// All types in declaration order.
    pub fn types(&self) -> &[SchemaType] {
        &self.types
    }

    /// Builds a borrowed name index for the core validation API.
    pub fn lookup(&self) -> TypeLookup<'_> {
        TypeLookup::new(&self.types)
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Validates a document, choosing the root type from its `_type`.
    ///
    /// Without a string `_type`, the catalog's only document-kind type is
    /// used; the engine then reports the missing type on the result.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownType`](CatalogError::UnknownType) when `_type` names
    /// no type, or [`AmbiguousRoot`](CatalogError::AmbiguousRoot) when there
    /// is no `_type` and not exactly one document type.
    pub fn validate(&self, document: &Value, options: &ValidationOptions) -> Result<ValidationResult> {
        let root = match document.get("_type").and_then(Value::as_str) {
            Some(name) => self
                .get(name)
                .ok_or_else(|| CatalogError::UnknownType(name.to_string()))?,
            None => self.sole_document_type()?,
        };
        Ok(validate_document(document, root, &self.types, options))
    }

    /// Validates a document against the named type.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownType`](CatalogError::UnknownType) if `name` is not in
    /// the catalog.
    pub fn validate_as(
        &self,
        document: &Value,
        name: &str,
        options: &ValidationOptions,
    ) -> Result<ValidationResult> {
        let root = self
            .get(name)
            .ok_or_else(|| CatalogError::UnknownType(name.to_string()))?;
        Ok(validate_document(document, root, &self.types, options))
    }

    /// Lints every type in the catalog.
    pub fn lint(&self) -> Vec<SchemaError> {
        lint_catalog(&self.types)
    }

    fn sole_document_type(&self) -> Result<&SchemaType> {
        let mut documents = self.types.iter().filter(|t| t.kind == Kind::Document);
        match (documents.next(), documents.next()) {
            (Some(only), None) => Ok(only),
            _ => Err(CatalogError::AmbiguousRoot(
                self.types.iter().filter(|t| t.kind == Kind::Document).count(),
            )),
        }
    }
}

/// Builder for constructing a [`TypeCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`CatalogError::NoSourcesAvailable`] is returned.
pub struct CatalogBuilder {
    sources: Vec<CatalogSource>,
}

impl CatalogBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a single schema file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::File(path.into()));
        self
    }

    /// Adds a directory of schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaPackage`] bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Bundle(path.into()));
        self
    }

    /// Attempts to load from configured sources in order.
    ///
    /// Returns the first successfully loaded catalog. If all sources fail,
    /// returns [`CatalogError::NoSourcesAvailable`].
    pub fn build(self) -> Result<TypeCatalog> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                CatalogSource::File(path) => TypeCatalog::from_file(path),
                CatalogSource::Directory(path) => TypeCatalog::from_dir(path),
                CatalogSource::Bundle(path) => TypeCatalog::from_bundle(path),
                CatalogSource::Paths(paths) => TypeCatalog::from_paths(paths),
                CatalogSource::Memory | CatalogSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut catalog) => {
                    catalog.source = CatalogSource::Multiple(all_sources);
                    return Ok(catalog);
                }
                Err(err) => warn!(source = ?source, error = %err, "catalog source failed to load"),
            }
        }

        Err(CatalogError::NoSourcesAvailable)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `true` for `.json`, `.yaml`, and `.yml` paths.
pub fn is_schema_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("json" | "yaml" | "yml")
    )
}

/// Reads a JSON or YAML file into a JSON value, by extension.
///
/// # Errors
///
/// Returns [`InvalidInput`](CatalogError::InvalidInput) for other
/// extensions, or the I/O or parse error.
pub fn read_value(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    match path.extension().and_then(OsStr::to_str) {
        Some("json") => Ok(serde_json::from_str(&raw)?),
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&raw)?),
        _ => Err(CatalogError::InvalidInput(format!(
            "'{}' must end in .json, .yaml, or .yml",
            path.display()
        ))),
    }
}

fn read_schema_file(path: &Path) -> Result<Vec<SchemaType>> {
    let types = match read_value(path)? {
        value @ Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(map) if map.contains_key("types") => {
            let package: SchemaPackage = serde_json::from_value(Value::Object(map))?;
            verify_bundle(&package)?;
            package.types
        }
        value => vec![serde_json::from_value(value)?],
    };
    debug!(path = %path.display(), types = types.len(), "loaded schema file");
    Ok(types)
}

fn schema_files_in(dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_schema_file(&path) {
            files.insert(path);
        }
    }
    Ok(files)
}

fn collect_schema_files(inputs: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
    if inputs.is_empty() {
        return Err(CatalogError::InvalidInput(
            "no schema paths were provided".to_string(),
        ));
    }

    let mut files = BTreeSet::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(schema_files_in(input)?);
        } else if input.is_file() {
            if !is_schema_file(input) {
                return Err(CatalogError::InvalidInput(format!(
                    "schema file '{}' must end in .json, .yaml, or .yml",
                    input.display()
                )));
            }
            files.insert(input.clone());
        } else {
            return Err(CatalogError::InvalidInput(format!(
                "schema path '{}' does not exist",
                input.display()
            )));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docschema_core::Kind;
    use serde_json::json;

    fn post() -> SchemaType {
        SchemaType::new("post", Kind::Document)
            .with_field(SchemaType::new("title", Kind::String).required())
    }

    fn write_json(dir: &Path, name: &str, value: &impl serde::Serialize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_from_dir_reads_json_and_yaml_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "b_post.json", &post());
        std::fs::write(
            dir.path().join("a_seo.yaml"),
            "type: object\nname: seo\nfields:\n  - type: string\n    name: metaTitle\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = TypeCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["seo", "post"]);
        assert!(matches!(catalog.source(), CatalogSource::Directory(_)));
    }

    #[test]
    fn test_from_file_accepts_list_of_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "types.json",
            &vec![post(), SchemaType::new("person", Kind::Document)],
        );

        let catalog = TypeCatalog::from_file(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("person"));
    }

    #[test]
    fn test_from_paths_rejects_missing_and_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("schema.txt");
        std::fs::write(&text, "{}").unwrap();

        assert!(matches!(
            TypeCatalog::from_paths(&[]),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            TypeCatalog::from_paths(&[dir.path().join("missing.json")]),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            TypeCatalog::from_paths(&[text]),
            Err(CatalogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_picks_root_from_document_type() {
        let catalog = TypeCatalog::from_types(vec![post(), SchemaType::new("person", Kind::Document)]);
        let options = ValidationOptions::default();

        let result = catalog
            .validate(&json!({"_type": "person"}), &options)
            .unwrap();
        assert!(result.valid);
        assert_eq!(result.document_type, "person");

        assert!(matches!(
            catalog.validate(&json!({"_type": "video"}), &options),
            Err(CatalogError::UnknownType(name)) if name == "video"
        ));
        assert!(matches!(
            catalog.validate(&json!({"title": "x"}), &options),
            Err(CatalogError::AmbiguousRoot(2))
        ));
    }

    #[test]
    fn test_validate_falls_back_to_single_document_type() {
        let catalog = TypeCatalog::from_types(vec![post(), SchemaType::new("seo", Kind::Object)]);
        let result = catalog
            .validate(&json!({"title": "Hello"}), &ValidationOptions::default())
            .unwrap();
        assert_eq!(result.document_type, "post");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "_type");
    }

    #[test]
    fn test_validate_as_unknown_type() {
        let catalog = TypeCatalog::from_types(vec![post()]);
        assert!(matches!(
            catalog.validate_as(&json!({}), "page", &ValidationOptions::default()),
            Err(CatalogError::UnknownType(_))
        ));
    }

    #[test]
    fn test_builder_falls_back_to_second_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "post.json", &post());

        let catalog = TypeCatalog::builder()
            .from_dir(dir.path().join("missing"))
            .from_file(&path)
            .build()
            .unwrap();
        assert!(catalog.contains("post"));
        assert!(matches!(catalog.source(), CatalogSource::Multiple(sources) if sources.len() == 2));
    }

    #[test]
    fn test_builder_all_fail() {
        let result = TypeCatalog::builder()
            .from_dir("/nonexistent/dir1/")
            .from_bundle("/nonexistent/bundle1.json")
            .build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
        assert!(matches!(
            TypeCatalog::builder().build(),
            Err(CatalogError::NoSourcesAvailable)
        ));
    }
}
