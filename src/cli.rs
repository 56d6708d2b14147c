//! Command-line interface definitions for s3dups.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, color) and
//! subcommands for different operations.
//!
//! Scan options that also exist in the configuration file are optional here;
//! when given they override the file and environment (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Produce a listing, then report duplicate sets
//! aws s3api list-objects-v2 --bucket media --output json > listing.json
//! s3dups scan listing.json --bucket media
//!
//! # Per-hash listing instead of duplicate sets
//! s3dups scan listing.json --simple
//!
//! # Read the listing from stdin and emit JSON
//! aws s3api list-objects-v2 --bucket media | s3dups scan - --output json
//!
//! # Verbose mode for debugging
//! s3dups -v scan listing.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Find duplicate objects in an S3 bucket listing.
///
/// s3dups groups objects by ETag and clusters the duplicates into key
/// hierarchies that look like wholesale copies of each other.
#[derive(Debug, Parser)]
#[command(name = "s3dups")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for s3dups.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a list-objects-v2 listing for duplicate objects
    Scan(ScanArgs),
    /// Load a previously saved session
    Load(LoadArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Listing file produced by `aws s3api list-objects-v2` (`-` for stdin)
    #[arg(value_name = "LISTING")]
    pub listing: PathBuf,

    /// Bucket name, used as a label in reports and sessions
    #[arg(short, long, value_name = "NAME")]
    pub bucket: Option<String>,

    /// Only consider keys starting with this prefix
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Key path delimiter used to derive common prefixes [default: /]
    #[arg(short, long, value_name = "DELIMITER")]
    pub delimiter: Option<String>,

    /// List duplicates per hash without clustering them into sets
    #[arg(short, long, conflicts_with = "no_simple")]
    pub simple: bool,

    /// Cluster duplicates into sets even if the configuration sets `simple`
    #[arg(long)]
    pub no_simple: bool,

    /// Output format [default: text]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Also write the results as JSON to this file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Save scan results to a session file
    #[arg(long, value_name = "PATH")]
    pub save_session: Option<PathBuf>,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable progress display
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the load subcommand.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Session file to load
    #[arg(value_name = "SESSION_FILE")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
