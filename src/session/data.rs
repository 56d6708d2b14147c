//! Data structures for scan sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duplicates::{Analysis, ScanSummary, DEFAULT_DELIMITER};

/// Current version of the session file format.
pub const SESSION_VERSION: u32 = 1;

/// Represents a saved scan session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Format version.
    pub version: u32,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Where the records came from (listing path or description).
    pub source: String,
    /// Settings used during the scan.
    pub settings: SessionSettings,
    /// Everything the scan found.
    pub analysis: Analysis,
    /// Statistics of the scan.
    pub summary: ScanSummary,
}

impl Session {
    /// Create a new session with current timestamp and default version.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        settings: SessionSettings,
        analysis: Analysis,
        summary: ScanSummary,
    ) -> Self {
        Self {
            version: SESSION_VERSION,
            created_at: Utc::now(),
            source: source.into(),
            settings,
            analysis,
            summary,
        }
    }

    /// Consume the session, returning the stored results.
    #[must_use]
    pub fn into_results(self) -> (Analysis, ScanSummary) {
        (self.analysis, self.summary)
    }
}

/// Settings used during the scan that produced the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Bucket label, if one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Key prefix filter.
    #[serde(default)]
    pub prefix: String,
    /// Key path delimiter.
    pub delimiter: String,
    /// Whether clustering was skipped.
    #[serde(default)]
    pub simple: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: String::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            simple: false,
        }
    }
}
