//! Scanner coordinator
//!
//! This module provides the [`Parser`] struct, the [`Scope`] context that is
//! passed down through nested declarations, and the annotation trait reader.
//!
//! # Organisation
//!
//! Scanning methods are split across files using `impl Parser` blocks:
//! - This module: Parser state, scopes, annotation markers, trait lists
//! - `declarations`: top-level dispatch, struct/class bodies, enums, fake types
//! - `members`: fields, methods, arrays and free functions
//! - `type_expr`: a single type reference (`const std::vector<Foo*>&`)
//!
//! The parser never fails. Anything it does not understand is skipped up to the
//! next statement boundary and scanning carries on.

use crate::config::ScanOptions;
use crate::database::{Database, Traits, TypeId, Visibility};
use crate::parser::lexer::TokenKind;
use crate::parser::stream::TokenStream;

pub(crate) const REFLECTED: &str = "REFLECTED";
pub(crate) const PROPERTY: &str = "PROPERTY";
pub(crate) const METHOD_CMD: &str = "METHOD_CMD";
pub(crate) const REFLECT_GLOBAL: &str = "REFLECT_GLOBAL";
pub(crate) const REFLECT_FAKE: &str = "REFLECT_FAKE";
pub(crate) const END_FAKE: &str = "END_FAKE";
pub(crate) const VIRTUAL_PROPERTY: &str = "VIRTUAL_PROPERTY";
pub(crate) const BITFIELD_FLAGS: &str = "BITFIELD_FLAGS";
pub(crate) const NO_REFLECT: &str = "NO_REFLECT";

/// Where a declaration sits: the enclosing type (none at top level), the
/// visibility in effect and how deeply nested it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scope {
    pub enclosing: Option<TypeId>,
    pub visibility: Visibility,
    pub depth: usize,
}

impl Scope {
    pub fn top_level() -> Self {
        Scope {
            enclosing: None,
            visibility: Visibility::Public,
            depth: 0,
        }
    }

    pub fn nested(self, owner: TypeId, visibility: Visibility) -> Self {
        Scope {
            enclosing: Some(owner),
            visibility,
            depth: self.depth + 1,
        }
    }

    pub fn with_visibility(self, visibility: Visibility) -> Self {
        Scope { visibility, ..self }
    }
}

/// Scans one source unit into a database.
pub(crate) struct Parser<'a> {
    pub(crate) stream: TokenStream,
    pub(crate) db: &'a mut Database,
    pub(crate) options: &'a ScanOptions,
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, db: &'a mut Database, options: &'a ScanOptions) -> Self {
        Self {
            stream: TokenStream::new(source),
            db,
            options,
        }
    }

    /// Consume an API decoration word (`DLL_EXPORT`) if one is next.
    pub(crate) fn take_api_decl(&mut self) -> Option<String> {
        let word = self.stream.peek().ident()?;
        if self.options.api_declarations.contains(word) {
            self.stream.take_ident()
        } else {
            None
        }
    }

    /// Consume any calling-convention words and return the last one.
    pub(crate) fn take_calling_convention(&mut self) -> Option<String> {
        let mut found = None;
        while let Some(word) = self.stream.peek().ident() {
            if !self.options.calling_conventions.contains(word) {
                break;
            }
            found = self.stream.take_ident();
        }
        found
    }

    /// Read a parenthesised `key[=value], ...` list following an annotation
    /// marker. A marker written without parentheses has no traits.
    pub(crate) fn read_traits(&mut self) -> Traits {
        let mut traits = Traits::new();
        if !self.stream.match_punct('(') {
            return traits;
        }

        loop {
            let kind = self.stream.peek().kind.clone();
            match kind {
                TokenKind::Eof => break,
                TokenKind::Punct(')') => {
                    self.stream.advance();
                    break;
                }
                TokenKind::Ident(key) | TokenKind::StringLiteral(key) => {
                    self.stream.advance();
                    let value = if self.stream.match_punct('=') {
                        self.read_trait_value()
                    } else {
                        None
                    };
                    traits.push(key, value);
                }
                TokenKind::Punct('(') => self.stream.eat_block('(', ')'),
                _ => {
                    self.stream.advance();
                }
            }
        }
        traits
    }

    fn read_trait_value(&mut self) -> Option<String> {
        let negative = self.stream.match_punct('-');
        let mut value = match self.stream.peek().kind.clone() {
            TokenKind::StringLiteral(text) => {
                self.stream.advance();
                text.replace("``", "\"")
            }
            TokenKind::Ident(_) | TokenKind::IntLiteral(_) | TokenKind::FloatLiteral(_) => {
                self.stream.take_text()
            }
            _ => return None,
        };

        while self.stream.check_scope_separator() {
            self.stream.advance();
            self.stream.advance();
            match self.stream.take_ident() {
                Some(part) => {
                    value.push_str("::");
                    value.push_str(&part);
                }
                None => break,
            }
        }

        if negative {
            value.insert(0, '-');
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traits_of(source: &str) -> Traits {
        let mut db = Database::new();
        let options = ScanOptions::default();
        let mut parser = Parser::new(source, &mut db, &options);
        parser.read_traits()
    }

    #[test]
    fn test_trait_list_forms() {
        let traits = traits_of(
            r#"(name = "Max Speed", hidden, step = 0.5f, low = -2, kind = Mode::Fast)"#,
        );
        assert_eq!(traits.get("name"), Some("Max Speed"));
        assert!(traits.has("hidden"));
        assert_eq!(traits.get("step"), Some("0.5f"));
        assert_eq!(traits.get_int("low", 0), -2);
        assert_eq!(traits.get("kind"), Some("Mode::Fast"));
        assert_eq!(traits.len(), 5);
    }

    #[test]
    fn test_marker_without_parentheses() {
        assert!(traits_of("int x;").is_empty());
    }

    #[test]
    fn test_unterminated_trait_list() {
        let traits = traits_of("(a = 1, b");
        assert_eq!(traits.get("a"), Some("1"));
        assert!(traits.has("b"));
    }

    #[test]
    fn test_scope_nesting() {
        let scope = Scope::top_level().nested(TypeId(3), Visibility::Private);
        assert_eq!(scope.enclosing, Some(TypeId(3)));
        assert_eq!(scope.depth, 1);
        assert_eq!(scope.with_visibility(Visibility::Public).depth, 1);
    }
}
