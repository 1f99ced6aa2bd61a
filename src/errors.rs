//! Error types for the fallible edges of a scan session.
//!
//! Scanning itself never fails; only reading files does.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A source unit could not be scanned.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read source unit '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A unit list could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read unit list '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
