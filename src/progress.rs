//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display progress in the terminal while a scan runs. Two phases are
//! reported:
//!
//! - `listing`: a spinner counting objects as pages arrive
//! - `clustering`: a bar over the adjacent key pairs being aligned

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("listing" or "clustering")
    /// * `total` - Total number of items to process (0 when unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `item` - Key or page being processed
    fn on_progress(&self, current: usize, item: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    listing: Mutex<Option<ProgressBar>>,
    clustering: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use s3dups::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            listing: Mutex::new(None),
            clustering: Mutex::new(None),
            quiet,
        }
    }

    fn listing_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} objects")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn clustering_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    /// The bar of whichever phase is active.
    fn active(&self) -> Option<ProgressBar> {
        if let Ok(guard) = self.clustering.lock() {
            if let Some(pb) = guard.as_ref() {
                return Some(pb.clone());
            }
        }
        self.listing.lock().ok().and_then(|guard| guard.clone())
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "listing" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::listing_style());
                pb.set_message("Listing objects");
                pb.enable_steady_tick(Duration::from_millis(100));
                if let Ok(mut listing) = self.listing.lock() {
                    *listing = Some(pb);
                }
            }
            "clustering" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::clustering_style());
                pb.set_message("Aligning keys");
                if let Ok(mut clustering) = self.clustering.lock() {
                    *clustering = Some(pb);
                }
            }
            other => log::debug!("No progress display for phase {}", other),
        }
    }

    fn on_progress(&self, current: usize, item: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.active() {
            // Pairs finish out of order under rayon; never move backwards.
            if current as u64 > pb.position() {
                pb.set_position(current as u64);
            }
            pb.set_message(truncate_key(item, 40));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let (slot, message) = match phase {
            "listing" => (&self.listing, "Listing complete"),
            "clustering" => (&self.clustering, "Clustering complete"),
            _ => return,
        };
        if let Some(pb) = slot.lock().ok().and_then(|mut guard| guard.take()) {
            pb.finish_with_message(message);
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.active() {
            pb.set_message(message.to_string());
        }
    }
}

/// Truncate a key for display in the progress bar, keeping its tail.
fn truncate_key(key: &str, max_chars: usize) -> String {
    let count = key.chars().count();
    if count <= max_chars {
        return key.to_string();
    }

    let tail: String = key.chars().skip(count - (max_chars - 3)).collect();
    format!("...{tail}")
}
