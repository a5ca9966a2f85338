//! well-registry - groundwater well registry CLI
//!
//! Thin command-line front end over the `well_registry` library. Submissions
//! are read as JSON files; wells, histories and code lists are printed as
//! JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Check a construction report without applying it
//! well-registry validate report.json
//!
//! # Create a well, then record an alteration against it
//! well-registry create construction.json
//! well-registry apply --tag 1 alteration.json
//!
//! # Inspect
//! well-registry show --tag 1
//! well-registry history --tag 1
//! well-registry codes well_class
//! ```
//!
//! # Environment Variables
//!
//! - `WELL_REGISTRY_CONFIG`: Path to the registry config file
//! - `WELL_REGISTRY_DATA_DIR`: Overrides `storage.path`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use well_registry::codes::file::read_code_file;
use well_registry::config::RegistryConfig;
use well_registry::storage::{ProcessLock, StorageBackend};
use well_registry::{
    ActivitySubmission, CodeTableKind, RegistryError, ValidationError, ValidationOutcome,
    WellRegistry,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "well-registry")]
#[command(about = "Groundwater well registry: validate and apply well activity reports")]
#[command(version)]
struct CliArgs {
    /// Config file. Without it, $WELL_REGISTRY_CONFIG then ./well_registry.toml are tried
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the sled store (overrides storage.path)
    #[arg(long, global = true, env = "WELL_REGISTRY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Validate a submission against current state without applying it
    Validate {
        /// Submission JSON file
        file: PathBuf,
    },

    /// Create a well from a construction submission
    Create {
        /// Submission JSON file
        file: PathBuf,
    },

    /// Apply an alteration, decommission or other submission to a well
    Apply {
        /// Well tag number
        #[arg(long)]
        tag: u64,
        /// Submission JSON file
        file: PathBuf,
    },

    /// Print the current state of a well
    Show {
        #[arg(long)]
        tag: u64,
    },

    /// Print every submission recorded against a well, in filing order
    History {
        #[arg(long)]
        tag: u64,
    },

    /// List the entries of one code table (e.g. well_class, casing_material)
    Codes {
        table: String,
    },

    /// Load code table entries from a TOML code file
    SeedCodes {
        file: PathBuf,
    },

    /// Expire a code from a date onward
    ExpireCode {
        table: String,
        code: String,
        /// Well class of a well subclass code
        #[arg(long)]
        parent: Option<String>,
        /// First day on which the code is no longer valid (YYYY-MM-DD)
        #[arg(long)]
        on: NaiveDate,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json);

    let mut config = match &args.config {
        Some(path) => RegistryConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RegistryConfig::load(),
    };
    if let Some(dir) = &args.data_dir {
        config.storage.path.clone_from(dir);
    }

    // Held until exit so a second process cannot open the same sled directory
    let _lock = match config.storage.backend {
        StorageBackend::Sled => Some(
            ProcessLock::acquire(&config.storage.path).context("Failed to lock data directory")?,
        ),
        StorageBackend::Memory => None,
    };

    let registry = WellRegistry::open(&config).context("Failed to open well registry")?;

    match args.command {
        SubCommand::Validate { file } => {
            let sub = read_submission(&file)?;
            match registry.validate(&sub)? {
                ValidationOutcome::Accepted { next_status } => {
                    info!(status = %next_status, "Submission is valid");
                    print_json(&serde_json::json!({ "accepted": true, "next_status": next_status }))
                }
                ValidationOutcome::Rejected(errors) => report_rejection(&errors),
            }
        }
        SubCommand::Create { file } => {
            let sub = read_submission(&file)?;
            let well = registry.create(&sub).or_else(rejection_to_report)?;
            print_json(&well)
        }
        SubCommand::Apply { tag, file } => {
            let sub = read_submission(&file)?;
            let well = registry.apply(tag, &sub).or_else(rejection_to_report)?;
            print_json(&well)
        }
        SubCommand::Show { tag } => match registry.get_well(tag)? {
            Some(well) => print_json(&well),
            None => bail!("No well with tag number {tag}"),
        },
        SubCommand::History { tag } => print_json(&registry.submissions_for(tag)?),
        SubCommand::Codes { table } => print_json(&registry.list_codes(parse_table(&table)?)?),
        SubCommand::SeedCodes { file } => {
            let tables = read_code_file(&file)
                .with_context(|| format!("Failed to read code file {}", file.display()))?;
            let count = registry.import_codes(tables)?;
            info!(entries = count, "Code tables updated");
            Ok(())
        }
        SubCommand::ExpireCode {
            table,
            code,
            parent,
            on,
        } => {
            registry.expire_code(parse_table(&table)?, &code, parent.as_deref(), on)?;
            Ok(())
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so stdout stays parseable JSON
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_submission(path: &Path) -> Result<ActivitySubmission> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read submission {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse submission {}", path.display()))
}

fn parse_table(name: &str) -> Result<CodeTableKind> {
    match CodeTableKind::from_table_name(name) {
        Some(kind) => Ok(kind),
        None => {
            let known: Vec<&str> = CodeTableKind::ALL.iter().map(|k| k.table_name()).collect();
            bail!("Unknown code table '{name}' (known tables: {})", known.join(", "))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print itemized validation errors and fail the command.
fn report_rejection<T>(errors: &[ValidationError]) -> Result<T> {
    print_json(&serde_json::json!({ "accepted": false, "errors": errors }))?;
    bail!("Submission rejected with {} error(s)", errors.len())
}

fn rejection_to_report<T>(err: RegistryError) -> Result<T> {
    match err {
        RegistryError::Rejected(errors) => report_rejection(&errors),
        RegistryError::StorageFailure(e) => Err(e).context("Storage failure"),
    }
}
