//! Logging infrastructure for s3dups.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `S3DUPS_LOG` environment variable (if set)
//! 2. `RUST_LOG` environment variable (if set)
//! 3. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 4. Default: info level
//!
//! Logs always go to stderr.
//!
//! # Example
//!
//! ```rust,no_run
//! use s3dups::logging::init_logging;
//!
//! // Initialize with verbose mode (-v)
//! init_logging(1, false);
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Environment variable holding an `env_logger` filter for this tool.
pub const LOG_ENV: &str = "S3DUPS_LOG";

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// # Priority
///
/// 1. `S3DUPS_LOG`, then `RUST_LOG`, parsed as `env_logger` filters
/// 2. If `quiet` is true: Error level only
/// 3. If `verbose >= 2`: Trace level
/// 4. If `verbose == 1`: Debug level
/// 5. Default: Info level
///
/// Calling it a second time is harmless; the first logger stays installed.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI
/// * `quiet` - If true, only show errors (overridden by the environment)
pub fn init_logging(verbose: u8, quiet: bool) {
    let env_filter = env_filter();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    match env_filter {
        Some(ref filter) => {
            builder.parse_filters(filter);
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    match env_filter {
        Some(filter) => log::debug!("Logging initialized from environment: {:?}", filter),
        None => log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        ),
    }
}

/// Filter string from `S3DUPS_LOG` or `RUST_LOG`, in that order.
fn env_filter() -> Option<String> {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log format based on build type and verbosity.
///
/// - Debug builds, or `-v` and above: timestamp, level, module path
/// - Otherwise: level and message only
fn configure_format(builder: &mut Builder, verbose: u8) {
    let detailed = cfg!(debug_assertions) || verbose >= 1;

    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if detailed {
            let timestamp = buf.timestamp_seconds();
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                timestamp,
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        }
    });
}

/// Get the current log level as a string.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_level_default() {
        assert_eq!(determine_level(0, false), LevelFilter::Info);
    }

    #[test]
    fn test_determine_level_verbose() {
        assert_eq!(determine_level(1, false), LevelFilter::Debug);
    }

    #[test]
    fn test_determine_level_trace() {
        assert_eq!(determine_level(2, false), LevelFilter::Trace);
        assert_eq!(determine_level(9, false), LevelFilter::Trace);
    }

    #[test]
    fn test_determine_level_quiet_overrides_verbose() {
        assert_eq!(determine_level(0, true), LevelFilter::Error);
        assert_eq!(determine_level(3, true), LevelFilter::Error);
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(0, true);
        init_logging(2, false);
    }

    #[test]
    fn test_current_level_name_values() {
        let name = current_level_name();
        assert!(
            ["off", "error", "warn", "info", "debug", "trace"].contains(&name),
            "Unexpected level name: {}",
            name
        );
    }
}
