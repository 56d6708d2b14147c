//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Exit codes for the s3dups application.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 4: Invalid input (unreadable listing, malformed record, bad delimiter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Invalid input: the listing or a record could not be used.
    InvalidInput = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "SD000",
            Self::GeneralError => "SD001",
            Self::NoDuplicates => "SD002",
            Self::InvalidInput => "SD004",
        }
    }

    /// Exit code for a completed scan.
    #[must_use]
    pub fn for_results(has_duplicates: bool) -> Self {
        if has_duplicates {
            Self::Success
        } else {
            Self::NoDuplicates
        }
    }

    /// Exit code for an application error.
    ///
    /// Finder errors anywhere in the chain count as invalid input; everything
    /// else is a general error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err
            .chain()
            .any(|cause| cause.downcast_ref::<FinderError>().is_some())
        {
            Self::InvalidInput
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
