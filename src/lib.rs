//! iiifconv: IIIF Presentation API v2 to v3 conversion.
//!
//! iiifconv converts the v2 manifests and collections of a digitized image
//! catalog into IIIF Presentation 3 documents. The converters are pure
//! field-mapping functions; file discovery, reading and writing live in
//! separate layers so one broken file never stops a batch.
//!
//! # Modules
//!
//! - [`model`]: Typed v2 input and v3 output documents
//! - [`convert`]: The v2 to v3 converters and their conversion reports
//! - [`validation`]: Preflight checks of v2 documents
//! - [`batch`]: Directory-tree conversion with per-file error accounting
//! - [`collect`]: Building a v2 collection from v2 manifests
//! - [`config`]: URL templates, language and provider settings
//! - [`error`]: Error types for iiifconv operations

pub mod batch;
pub mod collect;
pub mod config;
pub mod convert;
pub mod error;
pub mod ids;
pub mod io_json;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{ConvertConfig, SummaryPolicy};
use crate::convert::DocumentKind;
use crate::io_json::V2Document;
pub use error::IiifError;

/// The iiifconv CLI application.
#[derive(Parser)]
#[command(name = "iiifconv")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML file with URL templates, language and provider settings.
    #[arg(long, global = true, env = "IIIFCONV_CONFIG")]
    config: Option<PathBuf>,

    /// Strip HTML markup from descriptions when building summaries.
    #[arg(long, global = true)]
    strip_html: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert one v2 manifest to v3.
    Manifest(ConvertArgs),
    /// Convert one v2 collection to v3.
    Collection(ConvertArgs),
    /// Convert every manifest and collection under a catalog directory.
    Batch(BatchArgs),
    /// Check a v2 document for issues that affect conversion.
    Validate(ValidateArgs),
    /// Build a v2 collection from the manifests of one source database.
    Collect(CollectArgs),
}

/// Arguments for the manifest and collection subcommands.
#[derive(clap::Args)]
struct ConvertArgs {
    /// v2 input file.
    input: PathBuf,

    /// v3 output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Write the output even if the conversion drops information.
    #[arg(long)]
    allow_lossy: bool,

    /// Format of the conversion report printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Arguments for the batch subcommand.
#[derive(clap::Args)]
struct BatchArgs {
    /// Root of the v2 catalog tree (e.g. docs/iiif).
    root: PathBuf,

    /// Separate output tree. Defaults to <root>/3 and <root>/collection/3.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name of the collection folder under the root.
    #[arg(long, default_value = "collection")]
    collection_dir: String,

    /// Write documents even if their conversion drops information.
    #[arg(long)]
    allow_lossy: bool,

    /// Format of the batch summary printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// v2 input file to validate.
    input: PathBuf,

    /// Document kind; 'auto' decides from @type and content.
    #[arg(long, value_enum, default_value_t = KindArg::Auto)]
    kind: KindArg,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Arguments for the collect subcommand.
#[derive(clap::Args)]
struct CollectArgs {
    /// Directory holding <name>*/manifest.json folders.
    root: PathBuf,

    /// Collection name; selects manifest folders starting with it.
    #[arg(long)]
    name: String,

    /// Collection label.
    #[arg(long)]
    label: String,

    /// Site root used for the collection @id.
    #[arg(long, default_value = collect::DEFAULT_BASE_URL)]
    base_url: String,

    /// Output file for the v2 collection.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Auto,
    Manifest,
    Collection,
}

/// Run the iiifconv CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), IiifError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("iiifconv {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Convert IIIF Presentation v2 manifests and collections to v3.");
        println!();
        println!("Run 'iiifconv --help' for usage information.");
        return Ok(());
    };

    let config = load_effective_config(cli.config.as_deref(), cli.strip_html)?;

    match command {
        Commands::Manifest(args) => run_convert(DocumentKind::Manifest, args, &config),
        Commands::Collection(args) => run_convert(DocumentKind::Collection, args, &config),
        Commands::Batch(args) => run_batch(args, &config),
        Commands::Validate(args) => run_validate(args),
        Commands::Collect(args) => run_collect(args),
    }
}

fn load_effective_config(path: Option<&Path>, strip_html: bool) -> Result<ConvertConfig, IiifError> {
    let mut config = match path {
        Some(path) => config::load_config(path)?,
        None => ConvertConfig::default(),
    };
    if strip_html {
        config.summary = SummaryPolicy::StripHtml;
    }
    Ok(config)
}

/// Execute the manifest or collection subcommand.
fn run_convert(
    kind: DocumentKind,
    args: ConvertArgs,
    config: &ConvertConfig,
) -> Result<(), IiifError> {
    let job = batch::BatchJob {
        kind,
        input: args.input,
        output: args.output,
    };

    match batch::run_job(&job, config, args.allow_lossy) {
        Ok(report) => {
            match args.report {
                ReportFormat::Json => print_json(&report)?,
                ReportFormat::Text => {
                    println!(
                        "Converted {} -> {}",
                        job.input.display(),
                        job.output.display()
                    );
                    print!("{}", report);
                }
            }
            Ok(())
        }
        Err(IiifError::LossyConversion { report }) => {
            eprint!("{}", report);
            Err(IiifError::LossyConversion { report })
        }
        Err(err) => Err(err),
    }
}

/// Execute the batch subcommand.
fn run_batch(args: BatchArgs, config: &ConvertConfig) -> Result<(), IiifError> {
    let mut opts = match &args.output {
        Some(output) => batch::BatchOptions::with_output(&args.root, output),
        None => batch::BatchOptions::in_place(&args.root),
    };
    if args.output.is_none() {
        opts.collections_out = args.root.join(&args.collection_dir).join("3");
    }
    opts.collection_dir = args.collection_dir;
    opts.allow_lossy = args.allow_lossy;

    let report = batch::run_batch(&opts, config)?;

    match args.report {
        ReportFormat::Json => print_json(&report)?,
        ReportFormat::Text => {
            println!("Conversion complete!");
            print!("{}", report);
        }
    }

    if report.failed > 0 {
        Err(IiifError::BatchFailed {
            failed: report.failed,
        })
    } else {
        Ok(())
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), IiifError> {
    let document = match args.kind {
        KindArg::Auto => io_json::read_document(&args.input)?,
        KindArg::Manifest => V2Document::Manifest(io_json::read_manifest(&args.input)?),
        KindArg::Collection => V2Document::Collection(io_json::read_collection(&args.input)?),
    };

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_document(&document, &opts);

    match args.output {
        ReportFormat::Json => print_json(&serde_json::json!({
            "kind": document.kind(),
            "error_count": report.error_count(),
            "warning_count": report.warning_count(),
            "issues": &report.issues,
        }))?,
        ReportFormat::Text => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(IiifError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the collect subcommand.
fn run_collect(args: CollectArgs) -> Result<(), IiifError> {
    let mut opts = collect::CollectOptions::new(args.name, args.label);
    opts.base_url = args.base_url;

    let count = collect::collect_to_file(&args.root, &opts, &args.output)?;
    println!(
        "Collected {} manifest(s) into {}",
        count,
        args.output.display()
    );
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), IiifError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| IiifError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", text);
    Ok(())
}
