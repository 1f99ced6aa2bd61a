//! Scan configuration: scanner options and the list of units to scan.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rustc_hash::FxHashSet;

use crate::errors::ConfigError;

const DEFAULT_API_DECLARATIONS: &[&str] = &["DLL_EXPORT"];
const DEFAULT_CALLING_CONVENTIONS: &[&str] =
    &["__cdecl", "__stdcall", "__fastcall", "__thiscall", "__vectorcall"];

/// Knobs that change what the scanner records.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Record private and protected members too.
    pub include_private: bool,
    /// Export macros that may precede a type or member name.
    pub api_declarations: FxHashSet<String>,
    /// Calling-convention words that may precede a function name.
    pub calling_conventions: FxHashSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            include_private: false,
            api_declarations: DEFAULT_API_DECLARATIONS.iter().map(|s| s.to_string()).collect(),
            calling_conventions: DEFAULT_CALLING_CONVENTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScanOptions {
    pub fn with_private(mut self, include_private: bool) -> Self {
        self.include_private = include_private;
        self
    }

    pub fn with_api_declaration(mut self, word: impl Into<String>) -> Self {
        self.api_declarations.insert(word.into());
        self
    }
}

/// Ordered list of source units.
///
/// The list file holds one path per line. Blank lines and lines starting with
/// `//` are ignored; relative paths are taken relative to the list file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    units: Vec<PathBuf>,
}

impl SourceList {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&text, path.parent());
        debug!("{} units listed in '{}'", list.len(), path.display());
        Ok(list)
    }

    pub fn parse(text: &str, base: Option<&Path>) -> Self {
        let units = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(|line| match base {
                Some(base) if Path::new(line).is_relative() => base.join(line),
                _ => PathBuf::from(line),
            })
            .collect();
        SourceList { units }
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.units.push(path.into());
    }

    pub fn units(&self) -> &[PathBuf] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SourceList {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        SourceList {
            units: iter.into_iter().map(Into::into).collect(),
        }
    }
}
