//! s3dups - Duplicate object finder for S3 listings
//!
//! Groups the objects of a bucket listing by content hash (ETag), keeps the
//! hashes shared by several objects, and clusters the duplicate keys by their
//! longest shared key prefix to reveal key hierarchies that were copied
//! wholesale.
//!
//! # Pipeline
//!
//! ```text
//! ObjectSource → group_by_hash → filter_duplicates → cluster_by_prefix → report
//! ```
//!
//! The library half ([`source`], [`duplicates`]) does no terminal I/O; the
//! application half ([`run_app`]) wires it to the CLI, configuration,
//! progress bars, and output formatters.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod session;
pub mod source;

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, LoadArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{Analysis, DuplicateFinder, ScanSummary};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::session::Session;
use crate::source::{ListingSource, ObjectSource};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Copy)]
struct OutputOptions {
    color: bool,
    quiet: bool,
}

/// Run the command described by `cli`.
///
/// Logging must already be initialised.
///
/// # Errors
///
/// Returns an error if the listing or session cannot be read, a record is
/// invalid, or a report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    log::debug!("Log level: {}", logging::current_level_name());
    if cli.no_color {
        yansi::disable();
    }
    let options = OutputOptions {
        color: !cli.no_color && io::stdout().is_terminal(),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Scan(ref args) => run_scan(args, options),
        Commands::Load(ref args) => run_load(args, options),
    }
}

fn run_scan(args: &ScanArgs, options: OutputOptions) -> Result<ExitCode> {
    let mut config = Config::load(args.config.as_deref());
    config.merge_scan_args(args);
    log::debug!("Effective configuration: {:?}", config);

    let source = ListingSource::new(&args.listing).with_prefix(config.prefix.clone());

    let mut finder_config = config.finder_config();
    if progress_enabled(&config, options.quiet, io::stderr().is_terminal()) {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (analysis, summary) = finder
        .find_duplicates(&source)
        .with_context(|| format!("Scan of {} failed", source.describe()))?;
    let exit_code = ExitCode::for_results(analysis.has_duplicates());

    if let Some(ref path) = args.file {
        write_json_file(path, &analysis, &summary, exit_code)?;
    }

    if let Some(ref path) = args.save_session {
        Session::new(
            source.describe(),
            config.session_settings(),
            analysis.clone(),
            summary.clone(),
        )
        .save(path)?;
    }

    render(&analysis, &summary, config.output, exit_code, options)?;
    Ok(exit_code)
}

/// Progress bars are only drawn next to a text report, never when stdout
/// carries JSON or CSV.
fn progress_enabled(config: &Config, quiet: bool, stderr_is_terminal: bool) -> bool {
    config.progress && !quiet && config.output == OutputFormat::Text && stderr_is_terminal
}

fn run_load(args: &LoadArgs, options: OutputOptions) -> Result<ExitCode> {
    let session = Session::load(&args.path)?;
    log::info!(
        "Loaded session from {} ({}, created {})",
        args.path.display(),
        session.source,
        session.created_at
    );

    let (analysis, summary) = session.into_results();
    let exit_code = ExitCode::for_results(analysis.has_duplicates());
    render(&analysis, &summary, args.output, exit_code, options)?;
    Ok(exit_code)
}

/// Write the JSON results document to `path`.
fn write_json_file(
    path: &Path,
    analysis: &Analysis,
    summary: &ScanSummary,
    exit_code: ExitCode,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create results file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    JsonOutput::new(analysis, summary, exit_code)
        .write_to(&mut writer, true)
        .with_context(|| format!("Failed to write results to: {}", path.display()))?;
    writer.flush()?;
    log::info!("Results written to {}", path.display());
    Ok(())
}

/// Print the report in `format` to stdout.
fn render(
    analysis: &Analysis,
    summary: &ScanSummary,
    format: OutputFormat,
    exit_code: ExitCode,
    options: OutputOptions,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Text => TextOutput::new(analysis, summary)
            .with_color(options.color)
            .with_summary(!options.quiet)
            .write_to(&mut out)
            .context("Failed to write text report")?,
        OutputFormat::Json => JsonOutput::new(analysis, summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write JSON report")?,
        OutputFormat::Csv => CsvOutput::new(analysis)
            .write_to(&mut out)
            .context("Failed to write CSV report")?,
    }
    Ok(())
}
