//! I/O operations for scan sessions.

use crate::session::data::{Session, SESSION_VERSION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Envelope for session files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct SessionEnvelope {
    /// SHA256 checksum of the serialized session data.
    checksum: String,
    /// The actual session data.
    session: Session,
}

/// SHA256 of the compact JSON form of a session.
fn checksum(session: &Session) -> Result<String> {
    let session_json = serde_json::to_string(session)
        .context("Failed to serialize session for checksum calculation")?;
    let mut hasher = Sha256::new();
    hasher.update(session_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl Session {
    /// Saves the session to a file with an integrity checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create session file: {}", path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write session to: {}", path.display()))?;
        log::info!("Session saved to {}", path.display());
        Ok(())
    }

    /// Serializes the session to a JSON string with an integrity checksum.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let envelope = SessionEnvelope {
            checksum: checksum(self)?,
            session: self.clone(),
        };

        // Pretty printed for readability; the checksum always covers the compact form
        serde_json::to_string_pretty(&envelope).context("Failed to serialize session envelope")
    }

    /// Loads a session from a file and verifies its integrity.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a session
    /// envelope, fails the checksum, or has another format version.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parses and verifies a session envelope.
    ///
    /// # Errors
    ///
    /// See [`Session::load`].
    pub fn from_json(content: &str) -> Result<Self> {
        let envelope: SessionEnvelope = serde_json::from_str(content).context(
            "Failed to parse session envelope. The file might be corrupted or in an old format.",
        )?;

        if checksum(&envelope.session)? != envelope.checksum {
            anyhow::bail!("Session integrity check failed: checksum mismatch. The file may have been tampered with or corrupted.");
        }

        let session = envelope.session;

        if session.version != SESSION_VERSION {
            anyhow::bail!(
                "Unsupported session version: {}. Current version is {}.",
                session.version,
                SESSION_VERSION
            );
        }

        session.check_consistency();
        Ok(session)
    }

    /// Warn about stored results that do not agree with each other.
    fn check_consistency(&self) {
        let analysis = &self.analysis;

        if self.settings.simple != analysis.clusters.is_none() {
            log::warn!(
                "Session settings say simple={} but clusters are {}",
                self.settings.simple,
                if analysis.clusters.is_some() {
                    "present"
                } else {
                    "absent"
                }
            );
        }

        if self.summary.duplicate_groups != analysis.duplicates.len() {
            log::warn!(
                "Session summary counts {} duplicate groups, results hold {}",
                self.summary.duplicate_groups,
                analysis.duplicates.len()
            );
        }

        let Some(ref clusters) = analysis.clusters else {
            return;
        };
        let known: HashSet<&str> = analysis
            .duplicates
            .values()
            .flatten()
            .map(|o| o.key.as_str())
            .collect();
        for cluster in clusters.iter() {
            for key in &cluster.keys {
                if !known.contains(key.as_str()) {
                    log::warn!(
                        "Key {} in set {:?} is not part of any duplicate group",
                        key,
                        cluster.prefix
                    );
                }
            }
        }
    }
}
