//! Session module for persisting scan results.
//!
//! This module provides functionality to save a scan and reload it later
//! without re-reading the listing, for example to render another report
//! format.
//!
//! # Features
//!
//! * **Persistence**: Save the analysis, summary, and scan settings to JSON.
//! * **Integrity**: Each session file is wrapped in an envelope with a SHA256 checksum.
//! * **Versioning**: Sessions from another format version are rejected.
//!
//! # Architecture
//!
//! * [`data`]: Serializable models for sessions and settings.
//! * [`io`]: Logic for saving, loading, and verifying session files.

pub mod data;
pub mod io;

pub use data::{Session, SessionSettings, SESSION_VERSION};
