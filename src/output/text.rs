//! Human-readable text report.
//!
//! Two layouts, chosen by whether the analysis carries clusters:
//!
//! ```text
//! "etag-1":
//!   photos/a.jpg: LastModified: 2024-01-01T00:00:00+00:00 Size: 1024
//!   backup/a.jpg: LastModified: 2024-01-01T00:00:00+00:00 Size: 1024
//! ```
//!
//! ```text
//! "backup/photos":
//!   objects: 12
//!   size: 12288
//!   duplicates:
//!     - photos [12 objects]
//! ```
//!
//! An optional footer summarises the scan with human-readable sizes.

use std::io;

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{Analysis, ClusterSet, HashGroups, ScanSummary};

/// Text report formatter.
pub struct TextOutput<'a> {
    analysis: &'a Analysis,
    summary: &'a ScanSummary,
    color: bool,
    footer: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a plain report without footer.
    #[must_use]
    pub fn new(analysis: &'a Analysis, summary: &'a ScanSummary) -> Self {
        Self {
            analysis,
            summary,
            color: false,
            footer: false,
        }
    }

    /// Colour headings.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Append the summary footer.
    #[must_use]
    pub fn with_summary(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        match self.analysis.clusters {
            Some(ref clusters) => self.write_sets(&mut writer, clusters)?,
            None => self.write_simple(&mut writer, &self.analysis.duplicates)?,
        }
        if self.footer {
            self.write_footer(&mut writer)?;
        }
        writer.flush()
    }

    /// Render the report to a string.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the in-memory writer.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn heading(&self, text: String) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text
        }
    }

    fn write_simple<W: io::Write>(&self, writer: &mut W, groups: &HashGroups) -> io::Result<()> {
        for (hash, members) in groups {
            writeln!(writer, "{}", self.heading(format!("{hash}:")))?;
            for object in members {
                writeln!(
                    writer,
                    "  {}: LastModified: {} Size: {}",
                    object.key,
                    object.last_modified.to_rfc3339(),
                    object.size
                )?;
            }
        }
        Ok(())
    }

    fn write_sets<W: io::Write>(&self, writer: &mut W, clusters: &ClusterSet) -> io::Result<()> {
        for cluster in clusters.iter() {
            writeln!(writer, "{}", self.heading(format!("\"{}\":", cluster.prefix)))?;
            writeln!(writer, "  objects: {}", cluster.len())?;
            writeln!(writer, "  size: {}", cluster.total_size())?;
            writeln!(writer, "  duplicates:")?;
            for link in &cluster.cross_links {
                writeln!(writer, "    - {} [{} objects]", link.prefix, link.count)?;
            }
        }
        Ok(())
    }

    fn write_footer<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let s = self.summary;
        writeln!(writer)?;
        writeln!(
            writer,
            "{} objects ({}) listed, {} zero-size skipped",
            s.total_objects,
            s.total_size_display(),
            s.zero_size_objects
        )?;
        writeln!(
            writer,
            "{} duplicate groups, {} duplicate objects, {} reclaimable ({:.1}%)",
            s.duplicate_groups,
            s.duplicate_objects,
            ByteSize(s.reclaimable_space),
            s.wasted_percentage()
        )?;
        if self.analysis.clusters.is_some() {
            writeln!(writer, "{} duplicate sets", s.clusters)?;
        }
        Ok(())
    }
}
