//! Listing-file object source.
//!
//! Reads the JSON produced by `aws s3api list-objects-v2`. Three layouts are
//! accepted:
//!
//! - a single response object (`{"Contents": [...], ...}`)
//! - an array of responses, one per page
//! - concatenated or line-delimited responses, one per page
//!
//! A response without `Contents` is an empty page. Keys outside the configured
//! prefix are skipped. Missing `ETag` values are passed through as empty
//! strings so the grouping phase can reject them as invalid records.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{ObjectRecord, ObjectSource, RecordPage, SourceError};

/// Path value meaning "read the listing from stdin".
pub const STDIN_PATH: &str = "-";

/// One entry of a `Contents` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedObject {
    #[serde(default)]
    key: String,
    #[serde(default, rename = "ETag")]
    etag: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    last_modified: DateTime<Utc>,
    #[serde(default)]
    storage_class: Option<String>,
}

impl From<ListedObject> for ObjectRecord {
    fn from(obj: ListedObject) -> Self {
        Self {
            key: obj.key,
            content_hash: obj.etag,
            size: obj.size,
            last_modified: obj.last_modified,
            storage_class: obj.storage_class,
        }
    }
}

/// One `list-objects-v2` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListPage {
    #[serde(default)]
    contents: Vec<ListedObject>,
}

/// Object source backed by a saved listing file.
///
/// # Example
///
/// ```no_run
/// use s3dups::source::{ListingSource, ObjectSource};
///
/// let source = ListingSource::new("listing.json").with_prefix("photos/");
/// for page in source.pages() {
///     let page = page.unwrap();
///     println!("{} objects", page.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ListingSource {
    path: PathBuf,
    prefix: String,
}

impl ListingSource {
    /// Create a source reading from `path` (`-` for stdin).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prefix: String::new(),
        }
    }

    /// Only yield keys starting with `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The listing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The key prefix filter.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == STDIN_PATH
    }

    fn read_content(&self) -> Result<String, SourceError> {
        let mut content = String::new();
        let result = if self.is_stdin() {
            std::io::stdin().lock().read_to_string(&mut content)
        } else {
            std::fs::File::open(&self.path).and_then(|mut f| f.read_to_string(&mut content))
        };
        result.map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(content)
    }

    fn keep(&self, obj: &ListedObject) -> bool {
        if obj.key.starts_with(&self.prefix) {
            true
        } else {
            log::trace!("Skipping {} (outside prefix {:?})", obj.key, self.prefix);
            false
        }
    }

    fn to_page(&self, page: ListPage) -> RecordPage {
        page.contents
            .into_iter()
            .filter(|obj| self.keep(obj))
            .map(ObjectRecord::from)
            .collect()
    }
}

impl ObjectSource for ListingSource {
    fn describe(&self) -> String {
        let origin = if self.is_stdin() {
            "<stdin>".to_string()
        } else {
            self.path.display().to_string()
        };
        if self.prefix.is_empty() {
            origin
        } else {
            format!("{} (prefix {:?})", origin, self.prefix)
        }
    }

    fn pages(&self) -> Box<dyn Iterator<Item = Result<RecordPage, SourceError>> + '_> {
        let content = match self.read_content() {
            Ok(content) => content,
            Err(e) => return Box::new(std::iter::once(Err::<RecordPage, SourceError>(e))),
        };

        match parse_pages(&content) {
            Ok(pages) => {
                log::debug!("Listing {} holds {} page(s)", self.describe(), pages.len());
                Box::new(
                    pages
                        .into_iter()
                        .map(move |page| Ok::<RecordPage, SourceError>(self.to_page(page))),
                )
            }
            Err(source) => Box::new(std::iter::once(Err::<RecordPage, SourceError>(
                SourceError::Parse {
                    origin: self.describe(),
                    source,
                },
            ))),
        }
    }
}

/// Parse every page in a listing document.
fn parse_pages(content: &str) -> Result<Vec<ListPage>, serde_json::Error> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content);
    }

    serde_json::Deserializer::from_str(content)
        .into_iter::<ListPage>()
        .collect()
}
