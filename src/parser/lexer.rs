//! Lexer (tokenizer) for annotated C++ headers
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! [`TokenStream`](super::stream::TokenStream). The lexer never fails: characters
//! it does not recognise become single-character punctuation, and unterminated
//! strings or comments simply run to the end of the input. Preprocessor lines
//! are skipped, matching the scanner's no-preprocessor policy.

use std::fmt;

/// Source location information for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token categories produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    /// Quoted text with the quotes removed; escapes are left as written.
    StringLiteral(String),
    Punct(char),
    /// `<<`
    ShiftLeft,
    Eof,
}

/// A token plus the char span it was read from.
///
/// `start..end` index into the lexer's char buffer, which lets the scanner copy
/// default-value expressions out of the source verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub location: SourceLocation,
}

impl Token {
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct(ch)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s == word)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::IntLiteral(n) => write!(f, "int literal {}", n),
            TokenKind::FloatLiteral(n) => write!(f, "float literal {}", n),
            TokenKind::StringLiteral(s) => write!(f, "string literal \"{}\"", s),
            TokenKind::Punct(c) => write!(f, "'{}'", c),
            TokenKind::ShiftLeft => write!(f, "'<<'"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// Lexer for C++ header text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Consume the lexer, returning the char buffer the token spans refer to.
    pub fn into_chars(self) -> Vec<char> {
        self.input
    }

    /// Tokenize the entire input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    start: self.position,
                    end: self.position,
                    location: self.current_location(),
                });
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            tokens.push(self.next_token());
        }

        normalize_compound_primitives(tokens)
    }

    fn next_token(&mut self) -> Token {
        let loc = self.current_location();
        let start = self.position;
        // Callers guarantee we are not at the end.
        let ch = self.advance().unwrap_or('\0');

        let kind = match ch {
            '"' | '\'' => self.string_literal(ch),
            '0'..='9' => self.number_literal(ch),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier(ch),
            '<' if self.peek() == Some('<') => {
                self.advance();
                TokenKind::ShiftLeft
            }
            other => TokenKind::Punct(other),
        };

        Token {
            kind,
            start,
            end: self.position,
            location: loc,
        }
    }

    /// Parse a quoted literal. Single-quoted character literals share the kind.
    fn string_literal(&mut self, quote: char) -> TokenKind {
        let mut string = String::new();

        while let Some(ch) = self.advance() {
            if ch == quote {
                break;
            }
            string.push(ch);
            if ch == '\\' {
                if let Some(escaped) = self.advance() {
                    string.push(escaped);
                }
            }
        }

        TokenKind::StringLiteral(string)
    }

    /// Parse a numeric literal: decimal or hex integers, floats with optional
    /// exponent. Type suffixes (`u`, `l`, `f`, ...) are consumed and dropped.
    fn number_literal(&mut self, first_digit: char) -> TokenKind {
        let mut num_str = String::new();
        num_str.push(first_digit);

        if first_digit == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut hex = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_hexdigit() {
                    hex.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            self.skip_number_suffix();
            let value = u64::from_str_radix(&hex, 16).unwrap_or(0);
            return TokenKind::IntLiteral(value as i64);
        }

        let mut is_float = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                is_float = true;
                num_str.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && matches!(
                    self.peek_ahead(1),
                    Some(d) if d.is_ascii_digit() || d == '-' || d == '+'
                )
            {
                is_float = true;
                num_str.push(ch);
                self.advance();
                if let Some(sign) = self.peek() {
                    num_str.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('f') | Some('F')) {
            is_float = true;
        }
        self.skip_number_suffix();

        if is_float {
            TokenKind::FloatLiteral(num_str.trim_end_matches('.').parse().unwrap_or(0.0))
        } else {
            let value = num_str
                .parse::<i64>()
                .unwrap_or_else(|_| num_str.parse::<u64>().map(|v| v as i64).unwrap_or(0));
            TokenKind::IntLiteral(value)
        }
    }

    fn skip_number_suffix(&mut self) {
        while let Some('u' | 'U' | 'l' | 'L' | 'f' | 'F') = self.peek() {
            self.advance();
        }
    }

    fn identifier(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Ident(ident)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */); an unterminated one ends the input.
    fn skip_block_comment(&mut self) {
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
    }

    /// Skip a preprocessor directive, honouring `\` line continuations.
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\\' && self.peek() == Some('\n') {
                self.advance();
                continue;
            }
            if ch == '\n' {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Fold multi-word primitive spellings into the fixed-width names the type
/// registry knows (`unsigned int` → `uint32_t`, `long` → `int64_t`, ...).
fn normalize_compound_primitives(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(mut token) = iter.next() {
        let replacement = match token.ident() {
            Some("unsigned") => match iter.peek().and_then(Token::ident) {
                Some("char") => Some("uint8_t"),
                Some("short") => Some("uint16_t"),
                Some("int") => Some("uint32_t"),
                Some("long") => Some("uint64_t"),
                _ => None,
            },
            Some("signed") => match iter.peek().and_then(Token::ident) {
                Some("char") => Some("int8_t"),
                _ => None,
            },
            Some("short") => {
                token.kind = TokenKind::Ident("int16_t".to_string());
                None
            }
            Some("long") => {
                token.kind = TokenKind::Ident("int64_t".to_string());
                if iter.peek().is_some_and(|t| t.is_ident("long")) {
                    if let Some(second) = iter.next() {
                        token.end = second.end;
                    }
                }
                None
            }
            _ => None,
        };

        if let Some(name) = replacement {
            if let Some(second) = iter.next() {
                token.end = second.end;
                // `unsigned long long`
                if second.is_ident("long") && iter.peek().is_some_and(|t| t.is_ident("long")) {
                    if let Some(third) = iter.next() {
                        token.end = third.end;
                    }
                }
            }
            token.kind = TokenKind::Ident(name.to_string());
        }

        out.push(token);
    }

    out
}
