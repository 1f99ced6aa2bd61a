//! Annotated header scanner
//!
//! This module turns C++ header text into records in a [`Database`](crate::Database):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`stream`]: Token cursor with checkpoints, block skipping and verbatim capture
//! - `parse`, `declarations`, `members`, `type_expr`: the scanner itself
//!
//! # Supported Subset
//!
//! Only annotated declarations are modelled:
//! - Types: structs, classes and enums after `REFLECTED(...)`, nested or not
//! - Members: fields of known types, annotated fields of any type, annotated methods
//! - Free functions and globals after `METHOD_CMD(...)` / `REFLECT_GLOBAL(...)`
//! - Hand-written `REFLECT_FAKE ... END_FAKE` type blocks
//!
//! Templates, pointers, references, default arguments and enum value
//! expressions are understood well enough to describe a member. Function
//! bodies, initializer lists and anything unrecognised are skipped whole.
//!
//! # Scanner Implementation
//!
//! Hand-written and best effort: the scanner never reports an error, it
//! resynchronises at the next statement boundary instead.

pub mod lexer;
pub mod stream;

mod declarations;
mod members;
mod parse;
mod type_expr;

pub(crate) use parse::Parser;
