//! Validator configuration file.
//!
//! Defines the YAML-serializable settings a validation run starts from:
//! severity options, where to load schemas from, and the report format.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! validation:
//!   include_warnings: true
//!   include_info: false
//!   stop_on_first_error: false
//! catalog:
//!   dirs:
//!     - schemas/
//!   bundles:
//!     - dist/schemas.json
//! output:
//!   format: human
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use docschema_core::ValidationOptions;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::loader::TypeCatalog;

/// Severity and traversal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Report warning-severity issues.
    pub include_warnings: bool,
    /// Report info-severity issues.
    pub include_info: bool,
    /// Stop at the first root field that produces an error.
    pub stop_on_first_error: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            include_warnings: true,
            include_info: false,
            stop_on_first_error: false,
        }
    }
}

/// Where schema types are loaded from.
///
/// Directories are tried before bundles; the first source that loads wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directories of schema files.
    pub dirs: Vec<PathBuf>,
    /// Hashed bundle files.
    pub bundles: Vec<PathBuf>,
}

/// Report format for validation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented report with glyphs and suggestions.
    #[default]
    Human,
    /// Compact JSON with errors and one suggestion each.
    Agent,
    /// Full JSON validation results.
    Json,
}

/// Report settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Report format.
    pub format: OutputFormat,
}

/// Top-level validator configuration.
///
/// # Examples
///
/// ```
/// use docschema_catalog::{OutputFormat, ValidatorConfig};
///
/// let yaml = r#"
/// version: "1.0"
/// validation:
///   include_info: true
/// output:
///   format: agent
/// "#;
/// let config: ValidatorConfig = serde_yaml::from_str(yaml).unwrap();
/// let options = config.options();
/// assert!(options.include_warnings);
/// assert!(options.include_info);
/// assert_eq!(config.output.format, OutputFormat::Agent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Severity and traversal settings.
    #[serde(default)]
    pub validation: ValidationSettings,
    /// Schema sources.
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// Report settings.
    #[serde(default)]
    pub output: OutputSettings,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            validation: ValidationSettings::default(),
            catalog: CatalogSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl ValidatorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](CatalogError::IoError) if the file cannot be read,
    /// or [`YamlError`](CatalogError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](CatalogError::IoError) if the file cannot be
    /// written, or [`YamlError`](CatalogError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Validation options described by this configuration.
    pub fn options(&self) -> ValidationOptions {
        let mut options = ValidationOptions::default()
            .with_warnings(self.validation.include_warnings)
            .with_info(self.validation.include_info);
        if self.validation.stop_on_first_error {
            options = options.stop_on_first_error();
        }
        options
    }

    /// Loads the catalog from the configured sources.
    ///
    /// # Errors
    ///
    /// Returns [`NoSourcesAvailable`](CatalogError::NoSourcesAvailable) if no
    /// sources are configured or none of them loads.
    pub fn catalog(&self) -> Result<TypeCatalog> {
        if self.catalog.dirs.is_empty() && self.catalog.bundles.is_empty() {
            return Err(CatalogError::NoSourcesAvailable);
        }
        let builder = self
            .catalog
            .dirs
            .iter()
            .fold(TypeCatalog::builder(), |builder, dir| builder.from_dir(dir));
        self.catalog
            .bundles
            .iter()
            .fold(builder, |builder, bundle| builder.from_bundle(bundle))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
validation:
  include_warnings: false
  include_info: true
  stop_on_first_error: true
catalog:
  dirs:
    - schemas/
  bundles:
    - dist/schemas.json
output:
  format: json
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ValidatorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(!config.validation.include_warnings);
        assert!(config.validation.include_info);
        assert!(config.validation.stop_on_first_error);
        assert_eq!(config.catalog.dirs, vec![PathBuf::from("schemas/")]);
        assert_eq!(config.catalog.bundles, vec![PathBuf::from("dist/schemas.json")]);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: ValidatorConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn test_options_follow_settings() {
        let config: ValidatorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let options = config.options();
        assert!(!options.include_warnings);
        assert!(options.include_info);
        assert!(options.stop_on_first_error);
    }

    #[test]
    fn test_catalog_without_sources() {
        assert!(matches!(
            ValidatorConfig::default().catalog(),
            Err(CatalogError::NoSourcesAvailable)
        ));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docschema.yml");

        let original: ValidatorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = ValidatorConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
