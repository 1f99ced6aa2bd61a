//! Scan sessions.
//!
//! A [`Scanner`] owns one database, feeds it any number of source units in
//! order and hands it back resolved.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::{ScanOptions, SourceList};
use crate::database::{Database, Resolution};
use crate::errors::ScanError;
use crate::parser::Parser;

/// Which units of a [`SourceList`] were scanned.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub scanned: Vec<PathBuf>,
    pub failed: Vec<ScanError>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Scanner {
    options: ScanOptions,
    database: Database,
}

impl Scanner {
    /// A scanner over a database seeded with the built-in types.
    pub fn new(options: ScanOptions) -> Self {
        Self::with_database(options, Database::with_builtins())
    }

    pub fn with_database(options: ScanOptions, database: Database) -> Self {
        Scanner { options, database }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn scan_source(&mut self, source: &str) {
        Parser::new(source, &mut self.database, &self.options).parse_unit();
    }

    pub fn scan_file(&mut self, path: &Path) -> Result<(), ScanError> {
        let source = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("scanning '{}'", path.display());
        self.scan_source(&source);
        Ok(())
    }

    /// Scan every unit in order. A unit that cannot be read is reported and
    /// skipped; the rest are still scanned.
    pub fn scan_units(&mut self, units: &SourceList) -> ScanReport {
        let mut report = ScanReport::default();
        for path in units.units() {
            match self.scan_file(path) {
                Ok(()) => report.scanned.push(path.clone()),
                Err(err) => {
                    warn!("{}", err);
                    report.failed.push(err);
                }
            }
        }
        info!(
            "scanned {} of {} units",
            report.scanned.len(),
            units.len()
        );
        report
    }

    /// Run the resolution pass and return the finished database.
    pub fn finish(self) -> Database {
        self.finish_with_resolution().0
    }

    pub fn finish_with_resolution(mut self) -> (Database, Resolution) {
        let resolution = self.database.resolve();
        (self.database, resolution)
    }
}
