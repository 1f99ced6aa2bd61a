//! # Introduction
//!
//! typescan reads C++ headers whose declarations carry reflection annotations
//! (`REFLECTED`, `PROPERTY`, `METHOD_CMD`, ...) and builds a model of the
//! annotated types, their fields, methods and enum values. Code generators
//! consume the resolved model to emit serialization, script bindings and
//! similar boilerplate.
//!
//! ## Scanning pipeline
//!
//! ```text
//! Source → Lexer → TokenStream → Scanner → Database → resolve() → Orderings
//! ```
//!
//! 1. [`parser`]: tokenises a unit and records annotated declarations,
//!    creating placeholders for types referenced before they are declared.
//! 2. [`database`]: the arena of types. [`Database::resolve`] points every
//!    placeholder at its canonical type and fills derived-type lists.
//! 3. [`ordering`]: emission orders in which each type follows the types it
//!    depends on.
//! 4. [`scanner`] and [`config`]: scan sessions over lists of source units.
//!
//! ```
//! use typescan::{ScanOptions, Scanner};
//!
//! let mut scanner = Scanner::new(ScanOptions::default());
//! scanner.scan_source("REFLECTED() struct Point { float x; float y; };");
//! let db = scanner.finish();
//! assert_eq!(db.find("Point").unwrap().properties.len(), 2);
//! ```

pub mod config;
pub mod database;
pub mod errors;
pub mod ordering;
pub mod parser;
pub mod scanner;

pub use config::{ScanOptions, SourceList};
pub use database::{Database, Resolution, TypeId};
pub use errors::{ConfigError, ScanError};
pub use ordering::OrderStrategy;
pub use scanner::{ScanReport, Scanner};
