//! Cursor over a lexed token buffer
//!
//! The scanner never builds a syntax tree for regions it does not care about;
//! it walks this cursor, saving and restoring positions for speculative reads
//! and skipping balanced regions (function bodies, initializer lists) wholesale.

use super::lexer::{Lexer, SourceLocation, Token, TokenKind};

/// A saved cursor position, see [`TokenStream::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

pub struct TokenStream {
    chars: Vec<char>,
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        Self {
            chars: lexer.into_chars(),
            tokens,
            position: 0,
        }
    }

    /// The current (not yet consumed) token.
    pub fn peek(&self) -> &Token {
        // tokenize() always ends with Eof and position never passes it.
        &self.tokens[self.position]
    }

    /// Look `n` tokens past the current one; clamps to the trailing Eof.
    pub fn peek_ahead(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> &Token {
        let current = self.position;
        if !self.is_at_end() {
            self.position += 1;
        }
        &self.tokens[current]
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    pub fn check_punct(&self, ch: char) -> bool {
        self.peek().is_punct(ch)
    }

    pub fn check_ident(&self, word: &str) -> bool {
        self.peek().is_ident(word)
    }

    pub fn match_punct(&mut self, ch: char) -> bool {
        if self.check_punct(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn match_ident(&mut self, word: &str) -> bool {
        if self.check_ident(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is an identifier and return its text.
    pub fn take_ident(&mut self) -> Option<String> {
        let name = self.peek().ident()?.to_string();
        self.advance();
        Some(name)
    }

    /// Consume the current token and return its source text.
    pub fn take_text(&mut self) -> String {
        let token = self.advance();
        let (start, end) = (token.start, token.end);
        self.chars[start..end].iter().collect()
    }

    /// True when the next two tokens spell `::`.
    pub fn check_scope_separator(&self) -> bool {
        self.check_punct(':') && self.peek_ahead(1).is_punct(':')
    }

    pub fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub fn save(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0;
    }

    /// Skip a balanced `open ... close` region starting at the current token,
    /// tracking nesting of the same pair. Does nothing unless the current token
    /// is `open`. Stops at end of input if the region never closes.
    pub fn eat_block(&mut self, open: char, close: char) {
        if !self.check_punct(open) {
            return;
        }

        let mut depth = 0usize;
        while !self.is_at_end() {
            let token = self.advance();
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
    }

    /// Resynchronise after a statement: consume through the next top-level `;`,
    /// or through one balanced `{}` block (and a `;` straight after it).
    /// A `}` that closes the enclosing body is left in place.
    pub fn skip_statement(&mut self) {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::Punct(';') => {
                    self.advance();
                    return;
                }
                TokenKind::Punct('}') => return,
                TokenKind::Punct('{') => {
                    self.eat_block('{', '}');
                    self.match_punct(';');
                    return;
                }
                TokenKind::Punct('(') => self.eat_block('(', ')'),
                TokenKind::Punct('[') => self.eat_block('[', ']'),
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Copy source text verbatim from the current token up to (not including)
    /// the first `stops` symbol found outside any `()`, `[]` or `{}` nesting.
    /// An unmatched closing bracket also ends the capture. The cursor is left
    /// on the stop token. Returns `None` when nothing was captured.
    pub fn capture_until(&mut self, stops: &[char]) -> Option<String> {
        let start = self.peek().start;
        let mut end = start;
        let mut depth = 0usize;

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Punct(ch) => {
                    if depth == 0 && (stops.contains(&ch) || matches!(ch, ')' | ']' | '}')) {
                        break;
                    }
                    match ch {
                        '(' | '[' | '{' => depth += 1,
                        ')' | ']' | '}' => depth -= 1,
                        _ => {}
                    }
                }
                _ => {}
            }
            end = token.end;
            self.advance();
        }

        let text: String = self.chars[start..end].iter().collect();
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}
