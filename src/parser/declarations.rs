//! Declaration scanning
//!
//! This module handles the annotated declarations of a source unit:
//!
//! - Types: `REFLECTED(...) struct|class [api] Name [final|abstract] [: bases] { body };`
//! - Enums: `REFLECTED(...) enum [class] Name [: underlying] { A, B = expr, ... };`
//! - Free functions and globals: `METHOD_CMD(...)` / `REFLECT_GLOBAL(...)` members
//! - Fake types: `REFLECT_FAKE(name=...) PROPERTY(...)* END_FAKE`
//!
//! Everything else at top level is skipped token by token.
//!
//! # Enum values
//!
//! ```text
//! value   ::= operand (("<<" | "|") operand)*
//! operand ::= ["-"] integer | name ("::" name)* | "FLAG" "(" operand ")" | "(" operand ")"
//! ```
//!
//! Names resolve against entries of the enum being read first, then against
//! every enum registered so far. Unknown names read as 0.

use log::{debug, trace, warn};

use crate::database::{EnumValue, Property, TypeDef, TypeId, Traits, Visibility};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{
    Parser, Scope, END_FAKE, METHOD_CMD, PROPERTY, REFLECTED, REFLECT_FAKE, REFLECT_GLOBAL,
    VIRTUAL_PROPERTY,
};
use crate::parser::stream::TokenStream;

impl Parser<'_> {
    /// Scan the whole unit.
    pub(crate) fn parse_unit(&mut self) {
        let scope = Scope::top_level();
        while !self.stream.is_at_end() {
            let word = self.stream.peek().ident().map(str::to_string);
            match word.as_deref() {
                Some(REFLECTED) => {
                    self.stream.advance();
                    let traits = self.read_traits();
                    self.scan_reflected(traits, scope);
                }
                Some(METHOD_CMD) | Some(REFLECT_GLOBAL) => self.read_member(scope),
                Some(REFLECT_FAKE) => {
                    self.stream.advance();
                    self.scan_fake_type();
                }
                _ => {
                    self.stream.advance();
                }
            }
        }
    }

    /// The declaration following a `REFLECTED(...)` marker.
    fn scan_reflected(&mut self, traits: Traits, scope: Scope) -> Option<TypeId> {
        let scanned = if self.stream.check_ident("struct") {
            self.scan_struct(false, scope)
        } else if self.stream.check_ident("class") {
            self.scan_struct(true, scope)
        } else if self.stream.check_ident("enum") {
            self.scan_enum()
        } else {
            trace!(
                "REFLECTED not followed by a type at {}",
                self.stream.current_location()
            );
            None
        };
        let id = scanned?;
        self.db.get_mut(id).traits.extend(traits);
        Some(id)
    }

    fn scan_struct(&mut self, is_class: bool, scope: Scope) -> Option<TypeId> {
        let location = self.stream.current_location();
        self.stream.advance(); // struct / class
        let api_decl = self.take_api_decl();

        let Some(name) = self.stream.take_ident() else {
            warn!("malformed declaration at {}: type without a name", location);
            self.stream.skip_statement();
            return None;
        };
        if self.stream.match_punct(';') {
            trace!("forward declaration of '{}' ignored", name);
            return None;
        }

        let mut def = TypeDef::new(name);
        def.flags.is_class = is_class;
        def.api_decl = api_decl;
        // Registered before the body so members may refer to it.
        let id = self.db.register(def);

        loop {
            if self.stream.match_ident("final") {
                self.db.get_mut(id).flags.is_final = true;
            } else if self.stream.match_ident("abstract") {
                self.db.get_mut(id).flags.is_abstract = true;
            } else {
                break;
            }
        }

        if self.stream.match_punct(':') {
            self.read_base_list(id);
        }
        if !self.stream.match_punct('{') {
            self.stream.skip_statement();
            return Some(id);
        }

        let visibility = if is_class {
            Visibility::Private
        } else {
            Visibility::Public
        };
        self.scan_body(scope.nested(id, visibility));
        self.stream.match_punct(';');
        Some(id)
    }

    /// `public Base, private ns::Other<T>, ...` up to the body.
    fn read_base_list(&mut self, id: TypeId) {
        loop {
            while ["public", "protected", "private", "virtual"]
                .iter()
                .any(|word| self.stream.check_ident(word))
            {
                self.stream.advance();
            }

            let Some(mut name) = self.stream.take_ident() else {
                break;
            };
            while self.stream.check_scope_separator()
                && self.stream.peek_ahead(2).ident().is_some()
            {
                self.stream.advance();
                self.stream.advance();
                if let Some(part) = self.stream.take_ident() {
                    name.push_str("::");
                    name.push_str(&part);
                }
            }
            self.stream.eat_block('<', '>');

            let base = self.db.reference(&name);
            self.db.get_mut(id).bases.push(base);

            if !self.stream.match_punct(',') {
                break;
            }
        }
    }

    /// Members up to and including the closing `}`.
    fn scan_body(&mut self, scope: Scope) {
        let Some(owner) = scope.enclosing else {
            return;
        };
        let mut scope = scope;

        loop {
            match self.stream.peek().kind.clone() {
                TokenKind::Eof => {
                    warn!("unterminated body of '{}'", self.db.name(owner));
                    return;
                }
                TokenKind::Punct('}') => {
                    self.stream.advance();
                    return;
                }
                TokenKind::Punct(';') => {
                    self.stream.advance();
                }
                TokenKind::Punct('{') => self.stream.eat_block('{', '}'),
                TokenKind::Ident(word) => match word.as_str() {
                    "public" | "protected" | "private"
                        if self.stream.peek_ahead(1).is_punct(':') =>
                    {
                        let visibility = match word.as_str() {
                            "public" => Visibility::Public,
                            "protected" => Visibility::Protected,
                            _ => Visibility::Private,
                        };
                        scope = scope.with_visibility(visibility);
                        self.stream.advance();
                        self.stream.advance();
                    }
                    REFLECTED => {
                        self.stream.advance();
                        let traits = self.read_traits();
                        if let Some(child) = self.scan_reflected(traits, scope) {
                            self.db.get_mut(child).containing = Some(owner);
                            self.db.get_mut(owner).sub_types.push(child);
                        }
                    }
                    VIRTUAL_PROPERTY => {
                        self.stream.advance();
                        let traits = self.read_traits();
                        if let Some(property) = self.trait_property(traits, true) {
                            self.db.get_mut(owner).properties.push(property);
                        }
                        self.stream.match_punct(';');
                    }
                    "friend" | "using" | "typedef" | "static_assert" => {
                        self.stream.skip_statement()
                    }
                    "template" => {
                        self.stream.advance();
                        self.stream.eat_block('<', '>');
                    }
                    _ => self.read_visible_member(scope),
                },
                _ => self.read_visible_member(scope),
            }
        }
    }

    fn read_visible_member(&mut self, scope: Scope) {
        if scope.visibility == Visibility::Public || self.options.include_private {
            self.read_member(scope);
        } else {
            self.stream.skip_statement();
        }
    }

    /// A property described entirely by traits: `name=...`, `type="..."`.
    /// The remaining traits stay on the property.
    fn trait_property(&mut self, traits: Traits, is_virtual: bool) -> Option<Property> {
        let location = self.stream.current_location();
        let name = traits.get("name").unwrap_or_default().to_string();
        let Some(type_text) = traits.get("type").filter(|text| !text.is_empty()) else {
            warn!("property '{}' at {} has no type", name, location);
            return None;
        };

        let mut sub = Parser {
            stream: TokenStream::new(type_text),
            db: &mut *self.db,
            options: self.options,
        };
        let expr = sub.read_type_expr(None);
        if expr.is_empty() {
            warn!("property '{}' at {} has an unreadable type '{}'", name, location, type_text);
            return None;
        }

        let mut property = expr.into_property(self.db, name);
        property.modifiers.visibility = Visibility::Public;
        property.modifiers.decorations.is_virtual = is_virtual;
        property.traits = traits;
        Some(property)
    }

    /// `REFLECT_FAKE(name=...)` up to `END_FAKE`; the marker is consumed.
    fn scan_fake_type(&mut self) {
        let location = self.stream.current_location();
        let traits = self.read_traits();
        let name = match traits.get("name") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                warn!("malformed declaration at {}: fake type without a name", location);
                while !self.stream.is_at_end() && !self.stream.match_ident(END_FAKE) {
                    self.stream.advance();
                }
                return;
            }
        };

        let mut def = TypeDef::new(name);
        def.traits = traits;
        let id = self.db.register(def);

        loop {
            let is_virtual = if self.stream.match_ident(PROPERTY) {
                false
            } else if self.stream.match_ident(VIRTUAL_PROPERTY) {
                true
            } else if self.stream.match_ident(END_FAKE) || self.stream.is_at_end() {
                break;
            } else {
                warn!(
                    "unexpected {} in fake type '{}'",
                    self.stream.peek(),
                    self.db.name(id)
                );
                break;
            };

            let traits = self.read_traits();
            if let Some(property) = self.trait_property(traits, is_virtual) {
                self.db.get_mut(id).properties.push(property);
            }
            self.stream.match_punct(';');
        }
    }

    fn scan_enum(&mut self) -> Option<TypeId> {
        let location = self.stream.current_location();
        self.stream.advance(); // enum
        let is_scoped = self.stream.match_ident("class") || self.stream.match_ident("struct");

        let Some(name) = self.stream.take_ident() else {
            warn!("malformed declaration at {}: enum without a name", location);
            self.stream.skip_statement();
            return None;
        };

        let mut underlying = None;
        if self.stream.match_punct(':') {
            let expr = self.read_type_expr(None);
            if !expr.is_empty() {
                underlying = Some(expr.into_property(self.db, "").ty);
            }
        }

        while !self.stream.is_at_end() && !self.stream.check_punct('{') {
            if self.stream.match_punct(';') {
                trace!("opaque enum '{}' ignored", name);
                return None;
            }
            self.stream.advance();
        }
        if !self.stream.match_punct('{') {
            return None;
        }

        let values = self.read_enum_entries();
        self.stream.match_punct(';');
        if values.is_empty() {
            debug!("enum '{}' has no values and is not registered", name);
            return None;
        }

        let mut def = TypeDef::new(name);
        def.flags.is_scoped_enum = is_scoped;
        def.enum_underlying = underlying;
        def.enum_values = values;
        Some(self.db.register(def))
    }

    /// Entries through the closing `}`.
    fn read_enum_entries(&mut self) -> Vec<EnumValue> {
        let mut values: Vec<EnumValue> = Vec::new();
        let mut next = 0i64;

        loop {
            match self.stream.peek().kind.clone() {
                TokenKind::Eof => break,
                TokenKind::Punct('}') => {
                    self.stream.advance();
                    break;
                }
                TokenKind::Ident(name) => {
                    self.stream.advance();
                    let value = if self.stream.match_punct('=') {
                        self.read_enum_value(&values).unwrap_or(next)
                    } else {
                        next
                    };
                    values.push(EnumValue { name, value });
                    next = value.wrapping_add(1);
                    self.skip_enum_entry();
                }
                _ => {
                    self.stream.advance();
                }
            }
        }
        values
    }

    /// Skip to the `,` ending an entry (consumed) or the closing `}` (kept).
    fn skip_enum_entry(&mut self) {
        loop {
            match self.stream.peek().kind {
                TokenKind::Eof | TokenKind::Punct('}') => return,
                TokenKind::Punct(',') => {
                    self.stream.advance();
                    return;
                }
                TokenKind::Punct('(') => self.stream.eat_block('(', ')'),
                _ => {
                    self.stream.advance();
                }
            }
        }
    }

    fn read_enum_value(&mut self, prior: &[EnumValue]) -> Option<i64> {
        let mut value: Option<i64> = None;
        loop {
            match self.stream.peek().kind.clone() {
                TokenKind::Eof | TokenKind::Punct(',') | TokenKind::Punct('}') => break,
                TokenKind::ShiftLeft => {
                    self.stream.advance();
                    let shift = self.read_enum_operand(prior);
                    value = value.map(|base| shift_left(base, shift));
                }
                TokenKind::Punct('|') => {
                    self.stream.advance();
                    let rhs = self.read_enum_operand(prior);
                    value = Some(value.unwrap_or(0) | rhs);
                }
                TokenKind::Punct(')') => {
                    self.stream.advance();
                }
                TokenKind::IntLiteral(_)
                | TokenKind::Ident(_)
                | TokenKind::Punct('-')
                | TokenKind::Punct('(') => {
                    value = Some(self.read_enum_operand(prior));
                }
                other => {
                    trace!("ignoring {:?} in enum value", other);
                    self.stream.advance();
                }
            }
        }
        value
    }

    fn read_enum_operand(&mut self, prior: &[EnumValue]) -> i64 {
        match self.stream.peek().kind.clone() {
            TokenKind::IntLiteral(value) => {
                self.stream.advance();
                value
            }
            TokenKind::Punct('-') => {
                self.stream.advance();
                self.read_enum_operand(prior).wrapping_neg()
            }
            TokenKind::Punct('(') => {
                self.stream.advance();
                let value = self.read_enum_value_until_close(prior);
                self.stream.match_punct(')');
                value
            }
            TokenKind::Ident(word) if word == "FLAG" => {
                self.stream.advance();
                let bit = if self.stream.match_punct('(') {
                    let bit = self.read_enum_value_until_close(prior);
                    self.stream.match_punct(')');
                    bit
                } else {
                    0
                };
                shift_left(1, bit)
            }
            TokenKind::Ident(first) => {
                self.stream.advance();
                let mut name = first;
                while self.stream.check_scope_separator()
                && self.stream.peek_ahead(2).ident().is_some()
            {
                    self.stream.advance();
                    self.stream.advance();
                    if let Some(part) = self.stream.take_ident() {
                        name = part;
                    }
                }
                self.named_literal(&name, prior)
            }
            _ => 0,
        }
    }

    /// A value inside parentheses, stopping before the matching `)`.
    fn read_enum_value_until_close(&mut self, prior: &[EnumValue]) -> i64 {
        let mut value = self.read_enum_operand(prior);
        loop {
            match self.stream.peek().kind {
                TokenKind::ShiftLeft => {
                    self.stream.advance();
                    let shift = self.read_enum_operand(prior);
                    value = shift_left(value, shift);
                }
                TokenKind::Punct('|') => {
                    self.stream.advance();
                    value |= self.read_enum_operand(prior);
                }
                _ => return value,
            }
        }
    }

    fn named_literal(&self, name: &str, prior: &[EnumValue]) -> i64 {
        if let Some(entry) = prior.iter().find(|entry| entry.name == name) {
            return entry.value;
        }
        match self.db.literal(name) {
            Some(value) => value,
            None => {
                trace!("unknown enum literal '{}' reads as 0", name);
                0
            }
        }
    }
}

fn shift_left(value: i64, shift: i64) -> i64 {
    match u32::try_from(shift) {
        Ok(shift) if shift < 64 => value.wrapping_shl(shift),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScanOptions;
    use crate::database::{Database, Visibility};
    use crate::parser::parse::Parser;

    fn scan(source: &str) -> Database {
        scan_with(source, &ScanOptions::default())
    }

    fn scan_with(source: &str, options: &ScanOptions) -> Database {
        let mut db = Database::with_builtins();
        Parser::new(source, &mut db, options).parse_unit();
        db
    }

    fn values(db: &Database, name: &str) -> Vec<(String, i64)> {
        db.find(name)
            .unwrap()
            .enum_values
            .iter()
            .map(|v| (v.name.clone(), v.value))
            .collect()
    }

    #[test]
    fn test_enum_auto_increment() {
        let db = scan("REFLECTED() enum class E { X, Y = 10, Z };");
        assert_eq!(
            values(&db, "E"),
            vec![("X".into(), 0), ("Y".into(), 10), ("Z".into(), 11)]
        );
        assert!(db.find("E").unwrap().flags.is_scoped_enum);
    }

    #[test]
    fn test_enum_expressions() {
        let db = scan(
            "REFLECTED() enum Base { ONE = 1, FOUR = 4 };
             REFLECTED() enum F { A = FLAG(0), B = FLAG(1), C = 1 << 3, D = A | B, E = FOUR, G = Base::FOUR << 1, H = -2, I, J = FLAG(ONE) };",
        );
        assert_eq!(
            values(&db, "F"),
            vec![
                ("A".into(), 1),
                ("B".into(), 2),
                ("C".into(), 8),
                ("D".into(), 3),
                ("E".into(), 4),
                ("G".into(), 8),
                ("H".into(), -2),
                ("I".into(), -1),
                ("J".into(), 2),
            ]
        );
    }

    #[test]
    fn test_enum_underlying_and_empty() {
        let db = scan("REFLECTED() enum class Small : uint8_t { A }; REFLECTED() enum Empty { };");
        let small = db.find("Small").unwrap();
        assert_eq!(db.name(small.enum_underlying.unwrap()), "uint8_t");
        assert!(db.find("Empty").is_none());
    }

    #[test]
    fn test_struct_visibility_and_markers() {
        let db = scan(
            "REFLECTED() class Secret final : public Base { int hidden; public: int shown; protected: int guarded; };",
        );
        let secret = db.find("Secret").unwrap();
        assert!(secret.flags.is_class);
        assert!(secret.flags.is_final);
        let names: Vec<_> = secret.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["shown"]);
        assert_eq!(secret.properties[0].modifiers.visibility, Visibility::Public);
    }

    #[test]
    fn test_include_private() {
        let mut options = ScanOptions::default();
        options.include_private = true;
        let db = scan_with(
            "REFLECTED() class Secret { int hidden; protected: int guarded; };",
            &options,
        );
        let secret = db.find("Secret").unwrap();
        assert_eq!(secret.properties.len(), 2);
        assert_eq!(secret.properties[0].modifiers.visibility, Visibility::Private);
        assert_eq!(secret.properties[1].modifiers.visibility, Visibility::Protected);
    }

    #[test]
    fn test_nested_types_are_linked() {
        let db = scan(
            "REFLECTED() struct Outer { REFLECTED() struct Inner { int x; }; REFLECTED() enum Mode { On, Off }; Inner inner; };",
        );
        let outer = db.lookup("Outer").unwrap();
        let inner = db.lookup("Inner").unwrap();
        let mode = db.lookup("Mode").unwrap();
        assert_eq!(db.get(outer).sub_types, vec![inner, mode]);
        assert_eq!(db.get(inner).containing, Some(outer));
        assert_eq!(db.get(outer).properties[0].ty, inner);
        assert_eq!(db.get(inner).properties.len(), 1);
    }

    #[test]
    fn test_virtual_property_in_body() {
        let db = scan(
            r#"REFLECTED() struct Light { VIRTUAL_PROPERTY(name = "Brightness", type = "float", get = GetBrightness); };"#,
        );
        let light = db.find("Light").unwrap();
        let property = &light.properties[0];
        assert_eq!(property.name, "Brightness");
        assert_eq!(db.name(property.ty), "float");
        assert!(property.modifiers.decorations.is_virtual);
        assert_eq!(property.traits.get("get"), Some("GetBrightness"));
    }

    #[test]
    fn test_fake_type_block() {
        let db = scan(
            r#"REFLECT_FAKE(name = "Handle")
               PROPERTY(name = "id", type = "uint32_t")
               VIRTUAL_PROPERTY(name = "items", type = "std::vector<Handle*>")
               END_FAKE
               REFLECTED() struct After { int a; };"#,
        );
        let handle = db.find("Handle").unwrap();
        assert_eq!(handle.properties.len(), 2);
        assert!(!handle.properties[0].modifiers.decorations.is_virtual);
        assert!(handle.properties[1].modifiers.decorations.is_virtual);
        assert_eq!(handle.properties[1].template_args.len(), 1);
        assert!(db.find("After").is_some());
    }

    #[test]
    fn test_free_functions_and_globals() {
        let db = scan(
            "METHOD_CMD() int Add(int a, int b); REFLECT_GLOBAL() float gravity = 9.8f; int ignored(int);",
        );
        assert_eq!(db.free_functions.len(), 1);
        assert_eq!(db.free_functions[0].declaring, None);
        assert_eq!(db.free_properties.len(), 1);
        assert_eq!(db.free_properties[0].default_value.as_deref(), Some("9.8f"));
    }

    #[test]
    fn test_malformed_declarations_are_dropped() {
        let db = scan(
            "REFLECTED() struct; REFLECTED() enum { A }; REFLECTED() struct Later; REFLECTED() struct Ok { };",
        );
        assert!(db.find("Later").is_none());
        assert!(db.find("Ok").is_some());
        assert_eq!(db.user_types().len(), 1);
    }
}
