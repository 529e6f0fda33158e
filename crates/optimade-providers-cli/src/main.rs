// crates/optimade-providers-cli/src/main.rs
// ============================================================================
// Module: OPTIMADE Providers CLI Entry Point
// Description: Command dispatcher for provider listing and child discovery.
// Purpose: Expose the provider directory to shells and scripts as JSON.
// Dependencies: clap, optimade-providers, serde_json, thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! `optimade-providers list` prints the normalized providers registry and
//! `optimade-providers children` prints the child databases of one provider.
//! Output is pretty JSON on stdout; diagnostics go to stderr through
//! `tracing`, filtered by `RUST_LOG` unless `--verbose` is given.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use optimade_providers::DirectoryConfig;
use optimade_providers::ProviderDirectory;
use optimade_providers::ProviderRecord;
use optimade_providers::ProviderSource;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";
/// Log filter used with `--verbose`.
const VERBOSE_LOG_FILTER: &str = "debug";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "optimade-providers", version, disable_help_subcommand = true)]
struct Cli {
    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the normalized providers registry.
    List(ListCommand),
    /// Print the child databases advertised by one provider.
    Children(ChildrenCommand),
}

/// Arguments shared by every command that resolves the registry.
#[derive(Args, Debug)]
struct DirectoryArgs {
    /// Registry URL or local JSON file (defaults to the configured registries).
    #[arg(long, value_name = "URL|PATH")]
    source: Option<String>,
    /// Optional config file path (defaults to `OPTIMADE_PROVIDERS_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Attach a synthesized `_id` to every record.
    #[arg(long)]
    add_id: bool,
    /// Registry selection.
    #[command(flatten)]
    directory: DirectoryArgs,
}

/// Arguments for `children`.
#[derive(Args, Debug)]
struct ChildrenCommand {
    /// Identifier of the provider to query.
    #[arg(value_name = "PROVIDER_ID")]
    provider_id: String,
    /// Registry selection.
    #[command(flatten)]
    directory: DirectoryArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    match run(cli.command, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the selected command, writing results to `out`.
fn run(command: Commands, out: &mut impl Write) -> CliResult<()> {
    match command {
        Commands::List(command) => command_list(&command, out),
        Commands::Children(command) => command_children(&command, out),
    }
}

/// Installs the stderr log subscriber.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `list`.
fn command_list(command: &ListCommand, out: &mut impl Write) -> CliResult<()> {
    let directory = open_directory(&command.directory)?;
    let source = command.directory.source.as_deref().map(ProviderSource::parse);
    let records = directory
        .resolve_providers(command.add_id, source.as_ref())
        .map_err(|err| CliError::new(err.to_string()))?;
    tracing::debug!(count = records.len(), "providers resolved");
    write_json(out, &records)
}

/// Executes `children`.
fn command_children(command: &ChildrenCommand, out: &mut impl Write) -> CliResult<()> {
    let directory = open_directory(&command.directory)?;
    let source = command.directory.source.as_deref().map(ProviderSource::parse);
    let records = directory
        .resolve_providers(false, source.as_ref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let provider = select_provider(&records, &command.provider_id)?;
    let children =
        directory.discover_children(provider).map_err(|err| CliError::new(err.to_string()))?;
    write_json(out, &children)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration and builds the directory.
fn open_directory(args: &DirectoryArgs) -> CliResult<ProviderDirectory> {
    let config = DirectoryConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    ProviderDirectory::new(config).map_err(|err| CliError::new(err.to_string()))
}

/// Finds a provider record by identifier.
fn select_provider<'a>(
    records: &'a [ProviderRecord],
    provider_id: &str,
) -> CliResult<&'a ProviderRecord> {
    records
        .iter()
        .find(|record| record.id() == Some(provider_id))
        .ok_or_else(|| CliError::new(format!("provider {provider_id} not found in registry")))
}

/// Writes a value as pretty JSON followed by a newline.
fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    writeln!(out, "{rendered}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::FAILURE
}
