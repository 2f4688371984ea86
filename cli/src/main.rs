use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use docschema_catalog::{
    CatalogError, OutputFormat, TypeCatalog, ValidatorConfig, build_bundle, read_value,
};
use docschema_core::{ValidationOptions, ValidationResult, format_agent, format_human};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_ENV: &str = "DOCSCHEMA_LOG";

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Human,
    Agent,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Human => Self::Human,
            CliOutputFormat::Agent => Self::Agent,
            CliOutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "docschema", version)]
#[command(about = "Validate structured content documents against schema types")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate JSON or YAML documents against a schema catalog.
    Validate(ValidateArgs),
    /// Check schema files for structural problems.
    Lint(SchemaArgs),
    /// Bundle schema files into a hashed SchemaPackage file.
    Bundle(BundleArgs),
    /// List the types declared by schema files.
    Types(SchemaArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema file or directory (repeatable).
    #[arg(long = "schemas", short = 's')]
    schemas: Vec<PathBuf>,
    /// Validate every document against this type instead of its _type.
    #[arg(long = "type", short = 't')]
    type_name: Option<String>,
    /// Validator configuration file (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report format (overrides the configuration file).
    #[arg(long)]
    format: Option<CliOutputFormat>,
    /// Omit warnings from reports.
    #[arg(long)]
    no_warnings: bool,
    /// Include info-level issues in reports.
    #[arg(long)]
    include_info: bool,
    /// Stop checking a document after its first failing root field.
    #[arg(long)]
    stop_on_first_error: bool,
    /// Document files. A file holding a JSON array validates each element.
    #[arg(required = true)]
    documents: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema files and/or directories containing schema files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Schema files and/or directories containing schema files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output JSON bundle path.
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

/// One document read from an input file.
struct LoadedDocument {
    label: String,
    value: Value,
}

/// Report wrapper naming the document it belongs to.
#[derive(Serialize)]
struct DocumentReport<T: Serialize> {
    document: String,
    #[serde(flatten)]
    report: T,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Lint(args) => run_lint(args),
        Command::Bundle(args) => run_bundle(args),
        Command::Types(args) => run_types(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => ValidatorConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => ValidatorConfig::default(),
    };

    let mut options = config.options();
    if args.no_warnings {
        options = options.with_warnings(false);
    }
    if args.include_info {
        options = options.with_info(true);
    }
    if args.stop_on_first_error {
        options = options.stop_on_first_error();
    }
    let format: OutputFormat = args.format.map(Into::into).unwrap_or(config.output.format);

    let catalog = if !args.schemas.is_empty() {
        TypeCatalog::from_paths(&args.schemas).map_err(|e| e.to_string())?
    } else if args.config.is_some() {
        config.catalog().map_err(|e| e.to_string())?
    } else {
        return Err("Specify schemas with --schemas or a catalog in --config".to_string());
    };
    debug!(types = catalog.len(), "catalog loaded");

    let mut failures = 0usize;
    let mut documents = Vec::new();
    for path in &args.documents {
        match load_documents(path) {
            Ok(loaded) => documents.extend(loaded),
            Err(err) => {
                eprintln!("error: {}: {err}", path.display());
                failures += 1;
            }
        }
    }

    let outcomes: Vec<(String, Result<ValidationResult, CatalogError>)> = documents
        .par_iter()
        .map(|doc| {
            let result = validate_one(&catalog, doc, args.type_name.as_deref(), &options);
            (doc.label.clone(), result)
        })
        .collect();

    let mut results = Vec::new();
    for (label, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push((label, result)),
            Err(err) => {
                eprintln!("error: {label}: {err}");
                failures += 1;
            }
        }
    }

    print_results(&results, format)?;

    let invalid = results.iter().filter(|(_, result)| !result.valid).count();
    let total = results.len() + failures;
    if invalid + failures > 0 {
        return Err(format!(
            "{} of {total} document(s) failed validation",
            invalid + failures
        ));
    }
    Ok(())
}

fn validate_one(
    catalog: &TypeCatalog,
    doc: &LoadedDocument,
    type_name: Option<&str>,
    options: &ValidationOptions,
) -> Result<ValidationResult, CatalogError> {
    match type_name {
        Some(name) => catalog.validate_as(&doc.value, name, options),
        None => catalog.validate(&doc.value, options),
    }
}

fn load_documents(path: &Path) -> Result<Vec<LoadedDocument>, CatalogError> {
    let label = path.display().to_string();
    let documents = match read_value(path)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| LoadedDocument {
                label: format!("{label}[{index}]"),
                value,
            })
            .collect(),
        value => vec![LoadedDocument { label, value }],
    };
    Ok(documents)
}

fn print_results(results: &[(String, ValidationResult)], format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Human => {
            let blocks: Vec<String> = results
                .iter()
                .map(|(label, result)| format!("{label}\n{}", format_human(result)))
                .collect();
            if !blocks.is_empty() {
                println!("{}", blocks.join("\n\n"));
            }
        }
        OutputFormat::Agent => {
            let reports: Vec<_> = results
                .iter()
                .map(|(label, result)| DocumentReport {
                    document: label.clone(),
                    report: format_agent(result),
                })
                .collect();
            print_json(&reports)?;
        }
        OutputFormat::Json => {
            let reports: Vec<_> = results
                .iter()
                .map(|(label, result)| DocumentReport {
                    document: label.clone(),
                    report: result,
                })
                .collect();
            print_json(&reports)?;
        }
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// lint / bundle / types commands
// ---------------------------------------------------------------------------

fn run_lint(args: SchemaArgs) -> Result<(), String> {
    let catalog = TypeCatalog::from_paths(&args.inputs).map_err(|e| e.to_string())?;
    let problems = catalog.lint();
    if problems.is_empty() {
        println!("No problems found in {} type(s).", catalog.len());
        return Ok(());
    }
    for problem in &problems {
        println!("{problem}");
    }
    Err(format!("{} schema problem(s) found", problems.len()))
}

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let catalog = TypeCatalog::from_paths(&args.inputs).map_err(|e| e.to_string())?;
    if let Some(first) = catalog.lint().first() {
        return Err(format!("Schema catalog has problems: {first}"));
    }

    let generated_at = chrono::Utc::now().to_rfc3339();
    let mut package = build_bundle(catalog.types().to_vec(), PACKAGE_VERSION, &generated_at)
        .map_err(|e| e.to_string())?;
    package.name = args.name;
    package.description = args.description;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    let raw = serde_json::to_string_pretty(&package)
        .map_err(|err| format!("Failed to serialize schema bundle: {err}"))?;
    fs::write(&args.output, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Bundled {} type(s) into '{}'.",
        package.type_count(),
        args.output.display()
    );
    Ok(())
}

fn run_types(args: SchemaArgs) -> Result<(), String> {
    let catalog = TypeCatalog::from_paths(&args.inputs).map_err(|e| e.to_string())?;
    for schema in catalog.types() {
        match &schema.title {
            Some(title) => println!("{}\t{}\t{title}", schema.name, schema.kind),
            None => println!("{}\t{}", schema.name, schema.kind),
        }
    }
    Ok(())
}
