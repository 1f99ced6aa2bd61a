//! Member parsing
//!
//! A member statement is one of:
//!
//! ```text
//! member  ::= [annotation] ["BITFIELD_FLAGS" "(" name ")"] [api_decl]
//!             type_expr [calling_convention*] name (method | array | field)
//! method  ::= "(" params ")" specifier* (body | ";")
//! array   ::= "[" (integer | name ("::" name)*) "]" ";"
//! field   ::= ["=" default | "{" init "}"] ("," "*"* name ...)* ";"
//! ```
//!
//! Methods are recorded only when an annotation asks for binding. Fields of
//! known types are always recorded.

use log::{debug, trace};

use crate::database::{Method, Modifiers, Property, Traits, TypeId, Visibility};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{
    Parser, Scope, BITFIELD_FLAGS, METHOD_CMD, NO_REFLECT, PROPERTY, REFLECT_GLOBAL,
};
use crate::parser::type_expr::TypeExpr;

/// Everything read in front of a member's name.
struct MemberHead {
    expr: TypeExpr,
    name: String,
    traits: Traits,
    bit_source: Option<TypeId>,
    api_decl: Option<String>,
    calling_convention: Option<String>,
}

impl Parser<'_> {
    /// Read one member statement in `scope` and record what it declares.
    /// The statement is always consumed, recognised or not.
    pub(crate) fn read_member(&mut self, scope: Scope) {
        if self.stream.match_ident(NO_REFLECT) {
            self.stream.skip_statement();
            return;
        }

        let mut traits = Traits::new();
        let mut bind = false;
        let annotated = [PROPERTY, METHOD_CMD, REFLECT_GLOBAL]
            .iter()
            .any(|marker| self.stream.check_ident(marker));
        if annotated {
            self.stream.advance();
            traits = self.read_traits();
            bind = true;
        }

        let bit_source = if self.stream.match_ident(BITFIELD_FLAGS) {
            self.read_bit_source()
        } else {
            None
        };
        let api_decl = self.take_api_decl();

        let location = self.stream.current_location();
        let expr = self.read_type_expr(scope.enclosing);
        if expr.is_empty() || (expr.ty.is_none() && !bind) {
            trace!("skipping statement at {}", location);
            self.stream.skip_statement();
            return;
        }

        let decorations = expr.modifiers.decorations;
        let is_special = decorations.is_constructor || decorations.is_destructor;
        let (name, calling_convention) = if is_special {
            (expr.name.clone(), None)
        } else {
            let calling_convention = self.take_calling_convention();
            match self.read_member_name() {
                Some(name) => (name, calling_convention),
                None => {
                    trace!("no member name after type '{}' at {}", expr.name, location);
                    self.stream.skip_statement();
                    return;
                }
            }
        };

        let head = MemberHead {
            expr,
            name,
            traits,
            bit_source,
            api_decl,
            calling_convention,
        };

        if self.stream.check_punct('(') {
            if bind {
                self.read_method(scope, head);
            } else {
                trace!("unannotated callable '{}' skipped", head.name);
                self.stream.eat_block('(', ')');
                self.stream.skip_statement();
            }
        } else if self.stream.check_punct('[') {
            self.read_array_field(scope, head);
        } else {
            self.read_fields(scope, head);
        }
    }

    /// `(EnumName)` after `BITFIELD_FLAGS`.
    fn read_bit_source(&mut self) -> Option<TypeId> {
        if !self.stream.match_punct('(') {
            return None;
        }
        let source = self.stream.take_ident().map(|name| self.db.reference(&name));
        while !self.stream.is_at_end() && !self.stream.match_punct(')') {
            self.stream.advance();
        }
        source
    }

    /// A plain identifier, or an `operator` name with its symbol appended
    /// (`operator==`, `operator()`, `operator[]`).
    fn read_member_name(&mut self) -> Option<String> {
        let mut name = self.stream.take_ident()?;
        if name != "operator" {
            return Some(name);
        }

        if self.stream.check_punct('(') && self.stream.peek_ahead(1).is_punct(')') {
            self.stream.advance();
            self.stream.advance();
            name.push_str("()");
        }
        while !self.stream.is_at_end()
            && !self.stream.check_punct('(')
            && !self.stream.check_punct(';')
        {
            name.push_str(&self.stream.take_text());
        }
        Some(name)
    }

    fn member_modifiers(&self, scope: Scope, modifiers: Modifiers) -> Modifiers {
        let visibility = match scope.enclosing {
            Some(_) => scope.visibility,
            None => Visibility::Public,
        };
        Modifiers {
            visibility,
            ..modifiers
        }
    }

    fn read_method(&mut self, scope: Scope, head: MemberHead) {
        let MemberHead {
            expr,
            name,
            traits,
            api_decl,
            calling_convention,
            ..
        } = head;

        let mut modifiers = self.member_modifiers(scope, Modifiers::default());
        let decorations = expr.modifiers.decorations;
        modifiers.decorations.is_virtual = decorations.is_virtual;
        modifiers.decorations.is_constructor = decorations.is_constructor;
        modifiers.decorations.is_destructor = decorations.is_destructor;

        let mut return_value = expr.into_property(self.db, "");
        return_value.modifiers.decorations = Default::default();
        if return_value.modifiers.qualifiers.is_constexpr {
            return_value.modifiers.qualifiers.is_constexpr = false;
            modifiers.qualifiers.is_constexpr = true;
        }

        let mut method = Method::new(name, scope.enclosing, return_value);
        method.traits = traits;
        method.api_decl = api_decl;
        method.calling_convention = calling_convention;

        self.stream.advance(); // (
        self.read_parameters(&mut method);
        self.read_method_specifiers(&mut modifiers);
        method.modifiers = modifiers;

        if self.stream.check_punct('{') {
            self.stream.eat_block('{', '}');
            self.stream.match_punct(';');
        } else {
            self.stream.skip_statement();
        }

        debug!(
            "method '{}' with {} parameters bound at depth {}",
            method.name,
            method.params.len(),
            scope.depth
        );
        match scope.enclosing {
            Some(owner) => self.db.get_mut(owner).methods.push(method),
            None => self.db.free_functions.push(method),
        }
    }

    /// Parameters through the closing `)`.
    fn read_parameters(&mut self, method: &mut Method) {
        loop {
            if self.stream.is_at_end() || self.stream.check_punct(';') {
                return;
            }
            if self.stream.match_punct(')') {
                return;
            }
            let before = self.stream.save();

            if self.stream.check_ident("void") && self.stream.peek_ahead(1).is_punct(')') {
                self.stream.advance();
                continue;
            }

            let expr = self.read_type_expr(None);
            if !expr.is_empty() {
                let name = self.stream.take_ident();
                let mut param = expr.into_property(self.db, name.clone().unwrap_or_default());
                if self.stream.check_punct('[') {
                    self.stream.eat_block('[', ']');
                    param.modifiers.shape.pointer_depth += 1;
                }
                let default = if self.stream.match_punct('=') {
                    self.stream.capture_until(&[',', ';', ')'])
                } else {
                    None
                };
                param.default_value = default.clone();
                method.params.push(param);
                method.param_names.push(name);
                method.defaults.push(default);
            }

            self.finish_parameter();
            if self.stream.save() == before {
                self.stream.advance();
            }
        }
    }

    /// Skip whatever is left of a parameter, through its `,`.
    fn finish_parameter(&mut self) {
        loop {
            match self.stream.peek().kind {
                TokenKind::Eof | TokenKind::Punct(')') | TokenKind::Punct(';') => return,
                TokenKind::Punct(',') => {
                    self.stream.advance();
                    return;
                }
                TokenKind::Punct('(') => self.stream.eat_block('(', ')'),
                TokenKind::Punct('[') => self.stream.eat_block('[', ']'),
                TokenKind::Punct('{') => self.stream.eat_block('{', '}'),
                _ => {
                    self.stream.advance();
                }
            }
        }
    }

    fn read_method_specifiers(&mut self, modifiers: &mut Modifiers) {
        loop {
            if self.stream.match_ident("const") {
                modifiers.qualifiers.is_const = true;
            } else if self.stream.match_ident("override") {
                modifiers.decorations.is_override = true;
            } else if self.stream.match_ident("final") {
                modifiers.decorations.is_final = true;
            } else if self.stream.match_ident("abstract") {
                modifiers.decorations.is_abstract = true;
            } else if self.stream.match_ident("noexcept") {
                self.stream.eat_block('(', ')');
            } else if self.stream.match_punct('=') {
                match self.stream.peek().kind {
                    TokenKind::IntLiteral(0) => modifiers.decorations.is_abstract = true,
                    TokenKind::Ident(_) => {} // default / delete
                    _ => break,
                }
                self.stream.advance();
            } else {
                break;
            }
        }
    }

    /// `T name[N];` where N is an integer or an enum entry (`Slot::COUNT`).
    fn read_array_field(&mut self, scope: Scope, head: MemberHead) {
        self.stream.advance(); // [
        let len = match self.stream.peek().kind.clone() {
            TokenKind::IntLiteral(value) => {
                self.stream.advance();
                usize::try_from(value).unwrap_or(0)
            }
            TokenKind::Ident(first) => {
                self.stream.advance();
                let mut last = first;
                while self.stream.check_scope_separator() {
                    self.stream.advance();
                    self.stream.advance();
                    match self.stream.take_ident() {
                        Some(part) => last = part,
                        None => break,
                    }
                }
                match self.db.literal(&last) {
                    Some(value) => usize::try_from(value).unwrap_or(0),
                    None => {
                        debug!("array size '{}' of '{}' is not a known literal", last, head.name);
                        0
                    }
                }
            }
            _ => 0,
        };
        while !self.stream.is_at_end()
            && !self.stream.check_punct(';')
            && !self.stream.match_punct(']')
        {
            self.stream.advance();
        }

        let mut property = self.member_property(
            scope,
            head.expr,
            head.name,
            &head.traits,
            head.bit_source,
        );
        property.array_len = Some(len);
        if self.stream.match_punct('=') {
            property.default_value = self.stream.capture_until(&[';']);
        }
        self.push_property(scope, property);
        self.stream.skip_statement();
    }

    /// One or more declarators sharing a type: `int a = 1, *b;`.
    fn read_fields(&mut self, scope: Scope, head: MemberHead) {
        let MemberHead {
            mut expr,
            mut name,
            traits,
            bit_source,
            ..
        } = head;

        loop {
            let mut property = self.member_property(scope, expr.clone(), name, &traits, bit_source);
            if self.stream.match_punct('=') || self.stream.check_punct('{') {
                property.default_value = self.stream.capture_until(&[',', ';']);
            }
            self.push_property(scope, property);

            if !self.stream.match_punct(',') {
                break;
            }
            let mut pointer_depth = 0;
            while self.stream.match_punct('*') {
                pointer_depth += 1;
            }
            let is_reference = self.stream.match_punct('&');
            match self.stream.take_ident() {
                Some(next) => name = next,
                None => break,
            }
            expr.modifiers.shape = Default::default();
            expr.modifiers.shape.pointer_depth = pointer_depth;
            expr.modifiers.shape.is_reference = is_reference;
        }
        self.stream.skip_statement();
    }

    fn member_property(
        &mut self,
        scope: Scope,
        expr: TypeExpr,
        name: String,
        traits: &Traits,
        bit_source: Option<TypeId>,
    ) -> Property {
        let modifiers = self.member_modifiers(scope, expr.modifiers);
        let mut property = expr.into_property(self.db, name);
        property.modifiers = modifiers;
        property.traits = traits.clone();
        property.bit_source = bit_source;
        property
    }

    fn push_property(&mut self, scope: Scope, property: Property) {
        trace!("property '{}' at depth {}", property.name, scope.depth);
        match scope.enclosing {
            Some(owner) => self.db.get_mut(owner).properties.push(property),
            None => self.db.free_properties.push(property),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScanOptions;
    use crate::database::{Database, TypeDef, TypeId, Visibility};
    use crate::parser::parse::{Parser, Scope};

    fn scan_members(source: &str) -> (Database, TypeId) {
        let mut db = Database::with_builtins();
        let owner = db.register(TypeDef::new("Owner"));
        let options = ScanOptions::default();
        let scope = Scope::top_level().nested(owner, Visibility::Public);
        let mut parser = Parser::new(source, &mut db, &options);
        while !parser.stream.is_at_end() {
            parser.read_member(scope);
        }
        (db, owner)
    }

    #[test]
    fn test_default_captured_verbatim() {
        let (db, owner) = scan_members("int x = Compute(1, 2);");
        let x = &db.get(owner).properties[0];
        assert_eq!(x.name, "x");
        assert_eq!(x.default_value.as_deref(), Some("Compute(1, 2)"));
    }

    #[test]
    fn test_brace_initializer_default() {
        let (db, owner) = scan_members("Vector2 size { 1.0f, 2.0f };");
        let size = &db.get(owner).properties[0];
        assert_eq!(size.default_value.as_deref(), Some("{ 1.0f, 2.0f }"));
    }

    #[test]
    fn test_unannotated_method_is_skipped() {
        let (db, owner) = scan_members("void Update(float dt) { step(dt); } int after;");
        let def = db.get(owner);
        assert!(def.methods.is_empty());
        assert_eq!(def.properties.len(), 1);
        assert_eq!(def.properties[0].name, "after");
    }

    #[test]
    fn test_annotated_method_signature() {
        let (db, owner) = scan_members(
            "METHOD_CMD(script) virtual constexpr int Resize(int width, const String& label = \"a, b\", float = 0.5f) const override;",
        );
        let method = &db.get(owner).methods[0];
        assert_eq!(method.name, "Resize");
        assert_eq!(method.params.len(), 3);
        assert_eq!(method.param_names[2], None);
        assert_eq!(method.defaults[1].as_deref(), Some("\"a, b\""));
        assert_eq!(method.defaults[2].as_deref(), Some("0.5f"));
        assert!(method.params[1].modifiers.shape.is_reference);
        assert!(method.modifiers.qualifiers.is_const);
        assert!(method.modifiers.qualifiers.is_constexpr);
        assert!(!method.return_value.modifiers.qualifiers.is_constexpr);
        assert!(method.modifiers.decorations.is_virtual);
        assert!(method.modifiers.decorations.is_override);
        assert!(method.traits.has("script"));
        assert_eq!(method.declaring, Some(owner));
    }

    #[test]
    fn test_abstract_and_void_parameter_list() {
        let (db, owner) = scan_members("PROPERTY() virtual void Draw(void) = 0;");
        let method = &db.get(owner).methods[0];
        assert!(method.params.is_empty());
        assert!(method.modifiers.decorations.is_abstract);
    }

    #[test]
    fn test_constructor_and_destructor_are_tagged() {
        let (db, owner) = scan_members(
            "METHOD_CMD() Owner(int size) : size_(size) {} METHOD_CMD() ~Owner(); Owner(const Owner&) = default;",
        );
        let methods = &db.get(owner).methods;
        assert_eq!(methods.len(), 2);
        assert!(methods[0].is_constructor());
        assert_eq!(methods[0].params.len(), 1);
        assert!(methods[1].is_destructor());
        assert_eq!(methods[1].name, "~Owner");
        assert_eq!(db.name(methods[1].return_value.ty), "void");
    }

    #[test]
    fn test_operator_names() {
        let (db, owner) = scan_members(
            "METHOD_CMD() bool operator==(const Owner& rhs) const; METHOD_CMD() int operator()(int a);",
        );
        let methods = &db.get(owner).methods;
        assert_eq!(methods[0].name, "operator==");
        assert_eq!(methods[1].name, "operator()");
        assert_eq!(methods[1].params.len(), 1);
    }

    #[test]
    fn test_array_sizes() {
        let mut db = Database::with_builtins();
        let mut slots = TypeDef::new("Slot");
        slots.enum_values.push(crate::database::EnumValue {
            name: "COUNT".to_string(),
            value: 6,
        });
        db.register(slots);
        let owner = db.register(TypeDef::new("Owner"));
        let options = ScanOptions::default();
        let scope = Scope::top_level().nested(owner, Visibility::Public);
        let mut parser = Parser::new(
            "float weights[4]; int slots[Slot::COUNT]; int odd[UNKNOWN];",
            &mut db,
            &options,
        );
        while !parser.stream.is_at_end() {
            parser.read_member(scope);
        }

        let lens: Vec<_> = db.get(owner).properties.iter().map(|p| p.array_len).collect();
        assert_eq!(lens, vec![Some(4), Some(6), Some(0)]);
    }

    #[test]
    fn test_multiple_declarators_and_unknown_types() {
        let (db, owner) = scan_members(
            "int a, *b; Mystery hidden; PROPERTY() Mystery shown; NO_REFLECT int skipped;",
        );
        let def = db.get(owner);
        let names: Vec<_> = def.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "shown"]);
        assert_eq!(def.properties[1].modifiers.shape.pointer_depth, 1);
        assert!(!db.is_complete(def.properties[2].ty));
    }

    #[test]
    fn test_bitfield_source_and_calling_convention() {
        let (db, owner) = scan_members(
            "BITFIELD_FLAGS(Layer) unsigned mask; METHOD_CMD() DLL_EXPORT int __stdcall Count();",
        );
        let def = db.get(owner);
        assert_eq!(db.name(def.properties[0].bit_source.unwrap()), "Layer");
        let method = &def.methods[0];
        assert_eq!(method.api_decl.as_deref(), Some("DLL_EXPORT"));
        assert_eq!(method.calling_convention.as_deref(), Some("__stdcall"));
    }
}
