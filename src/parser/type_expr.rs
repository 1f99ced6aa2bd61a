//! Type-reference parsing
//!
//! ```text
//! type_expr ::= ["class" | "struct" | "typename"] ["virtual"] ["~"]
//!               qualifier* name ("::" name)* ["<" template_arg ("," template_arg)* ">"]
//!               ["const"] "*"* ["const"] ["&" ["&"]]
//! template_arg ::= ["-"] integer | type_expr
//! ```

use log::trace;

use crate::database::{Database, Modifiers, Property, TemplateParam, TypeId};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

/// Words that start a statement and can never name a type.
const NON_TYPE_WORDS: &[&str] = &[
    "typedef",
    "using",
    "friend",
    "template",
    "namespace",
    "return",
    "operator",
    "enum",
    "union",
    "public",
    "private",
    "protected",
    "static_assert",
];

/// A parsed type reference.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeExpr {
    /// The registered type, if the name is known.
    pub ty: Option<TypeId>,
    /// Name as written, including `::` qualification and a leading `~`.
    pub name: String,
    pub modifiers: Modifiers,
    pub template_args: Vec<TemplateParam>,
}

impl TypeExpr {
    /// No name could be read.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.ty.is_none()
    }

    /// Build a property slot, turning an unknown name into a placeholder.
    pub fn into_property(self, db: &mut Database, name: impl Into<String>) -> Property {
        let ty = match self.ty {
            Some(id) => id,
            None => db.placeholder(&self.name),
        };
        let mut property = Property::new(name, ty);
        property.modifiers = self.modifiers;
        property.template_args = self.template_args;
        property
    }
}

impl Parser<'_> {
    /// Read one type reference.
    ///
    /// `context` is the type whose body is being scanned. A name equal to it
    /// and followed by `(` is a constructor (or destructor after `~`): the
    /// result is the `void` type with the matching decoration set.
    pub(crate) fn read_type_expr(&mut self, context: Option<TypeId>) -> TypeExpr {
        let mut expr = TypeExpr::default();

        if self.stream.check_ident("class")
            || self.stream.check_ident("struct")
            || self.stream.check_ident("typename")
        {
            self.stream.advance();
        }
        if self.stream.match_ident("virtual") {
            expr.modifiers.decorations.is_virtual = true;
        }
        let is_destructor = self.stream.match_punct('~');

        self.read_qualifiers(&mut expr.modifiers);

        let word = match self.stream.peek().ident() {
            Some(word) if !NON_TYPE_WORDS.iter().any(|w| *w == word) => word.to_string(),
            _ => return expr,
        };
        self.stream.advance();

        expr.ty = self.db.lookup(&word);
        expr.name = word;

        if context.is_some() && expr.ty == context && self.stream.check_punct('(') {
            if is_destructor {
                expr.modifiers.decorations.is_destructor = true;
                expr.name.insert(0, '~');
            } else {
                expr.modifiers.decorations.is_constructor = true;
            }
            expr.ty = self.db.lookup("void");
            if expr.ty.is_none() {
                expr.ty = Some(self.db.placeholder("void"));
            }
            return expr;
        }
        if is_destructor {
            expr.name.insert(0, '~');
        }

        while self.stream.check_scope_separator() && self.stream.peek_ahead(2).ident().is_some() {
            self.stream.advance();
            self.stream.advance();
            let Some(part) = self.stream.take_ident() else {
                break;
            };
            expr.name.push_str("::");
            expr.name.push_str(&part);
            expr.ty = self.db.lookup(&expr.name).or_else(|| self.db.lookup(&part));
        }

        if self.stream.match_punct('<') {
            expr.template_args = self.read_template_args();
        }

        if self.stream.match_ident("const") {
            expr.modifiers.qualifiers.is_const = true;
        }
        while self.stream.match_punct('*') {
            expr.modifiers.shape.pointer_depth += 1;
        }
        if expr.modifiers.shape.is_pointer() && self.stream.match_ident("const") {
            expr.modifiers.shape.is_const_pointer = true;
        }
        if self.stream.match_punct('&') {
            expr.modifiers.shape.is_reference = true;
            // rvalue reference
            self.stream.match_punct('&');
        }

        expr
    }

    fn read_qualifiers(&mut self, modifiers: &mut Modifiers) {
        while let Some(word) = self.stream.peek().ident() {
            let qualifiers = &mut modifiers.qualifiers;
            match word {
                "static" => qualifiers.is_static = true,
                "const" => qualifiers.is_const = true,
                "constexpr" => qualifiers.is_constexpr = true,
                "mutable" => qualifiers.is_mutable = true,
                "volatile" => qualifiers.is_volatile = true,
                "transient" => qualifiers.is_transient = true,
                "virtual" => modifiers.decorations.is_virtual = true,
                "inline" | "explicit" | "extern" => {}
                _ => break,
            }
            self.stream.advance();
        }
    }

    /// Arguments after an opening `<`, through the matching `>`.
    fn read_template_args(&mut self) -> Vec<TemplateParam> {
        let mut args = Vec::new();
        loop {
            match self.stream.peek().kind.clone() {
                TokenKind::Eof => break,
                TokenKind::Punct('>') => {
                    self.stream.advance();
                    break;
                }
                TokenKind::IntLiteral(value) => {
                    self.stream.advance();
                    args.push(TemplateParam::Integer(value));
                }
                TokenKind::Punct('-') => {
                    self.stream.advance();
                    if let TokenKind::IntLiteral(value) = self.stream.peek().kind.clone() {
                        self.stream.advance();
                        args.push(TemplateParam::Integer(-value));
                    }
                }
                TokenKind::Ident(_) => {
                    let before = self.stream.save();
                    let inner = self.read_type_expr(None);
                    if inner.is_empty() {
                        if self.stream.save() == before {
                            self.stream.advance();
                        }
                        continue;
                    }
                    args.push(TemplateParam::Type(inner.into_property(self.db, "")));
                }
                other => {
                    trace!("ignoring {:?} in template argument list", other);
                    self.stream.advance();
                }
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanOptions;
    use crate::database::TypeDef;

    fn read(db: &mut Database, source: &str, context: Option<TypeId>) -> TypeExpr {
        let options = ScanOptions::default();
        let mut parser = Parser::new(source, db, &options);
        parser.read_type_expr(context)
    }

    #[test]
    fn test_const_reference() {
        let mut db = Database::with_builtins();
        let foo = db.register(TypeDef::new("Foo"));
        let expr = read(&mut db, "const Foo& bar", None);
        assert_eq!(expr.ty, Some(foo));
        assert!(expr.modifiers.qualifiers.is_const);
        assert!(expr.modifiers.shape.is_reference);
        assert_eq!(expr.modifiers.shape.pointer_depth, 0);
    }

    #[test]
    fn test_const_pointer() {
        let mut db = Database::with_builtins();
        db.register(TypeDef::new("Foo"));
        let expr = read(&mut db, "Foo* const bar", None);
        let shape = expr.modifiers.shape;
        assert!(shape.is_pointer());
        assert_eq!(shape.pointer_depth, 1);
        assert!(shape.is_const_pointer);
        assert!(!shape.is_reference);
        assert!(!expr.modifiers.qualifiers.is_const);
    }

    #[test]
    fn test_nested_template_arguments() {
        let mut db = Database::with_builtins();
        let expr = read(&mut db, "std::map<String, std::vector<Item*>> items", None);
        assert_eq!(expr.ty, db.lookup("std::map"));
        assert_eq!(expr.template_args.len(), 2);

        let TemplateParam::Type(inner) = &expr.template_args[1] else {
            panic!("expected a type argument");
        };
        assert_eq!(db.name(inner.ty), "std::vector");
        let TemplateParam::Type(item) = &inner.template_args[0] else {
            panic!("expected a type argument");
        };
        assert_eq!(db.name(item.ty), "Item");
        assert!(!db.is_complete(item.ty));
        assert_eq!(item.modifiers.shape.pointer_depth, 1);
    }

    #[test]
    fn test_integer_template_arguments() {
        let mut db = Database::with_builtins();
        let expr = read(&mut db, "std::array<float, 4>", None);
        assert!(matches!(expr.template_args[1], TemplateParam::Integer(4)));
        let expr = read(&mut db, "Offset<-3>", None);
        assert!(matches!(expr.template_args[0], TemplateParam::Integer(-3)));
        assert_eq!(expr.ty, None);
        assert_eq!(expr.name, "Offset");
    }

    #[test]
    fn test_constructor_and_destructor() {
        let mut db = Database::with_builtins();
        let widget = db.register(TypeDef::new("Widget"));
        let void = db.lookup("void");

        let ctor = read(&mut db, "Widget(int size)", Some(widget));
        assert!(ctor.modifiers.decorations.is_constructor);
        assert_eq!(ctor.ty, void);

        let dtor = read(&mut db, "~Widget()", Some(widget));
        assert!(dtor.modifiers.decorations.is_destructor);
        assert_eq!(dtor.name, "~Widget");

        // Returning the enclosing type is not a constructor.
        let clone = read(&mut db, "Widget Clone()", Some(widget));
        assert!(!clone.modifiers.decorations.is_constructor);
        assert_eq!(clone.ty, Some(widget));
    }

    #[test]
    fn test_qualifiers_and_namespaces() {
        let mut db = Database::with_builtins();
        let expr = read(&mut db, "static constexpr inline std::string name", None);
        assert!(expr.modifiers.qualifiers.is_static);
        assert!(expr.modifiers.qualifiers.is_constexpr);
        assert_eq!(expr.ty, db.lookup("std::string"));

        let node = db.register(TypeDef::new("Node"));
        let expr = read(&mut db, "scene::Node*", None);
        assert_eq!(expr.ty, Some(node));
        assert_eq!(expr.name, "scene::Node");
    }

    #[test]
    fn test_statement_words_are_not_types() {
        let mut db = Database::with_builtins();
        assert!(read(&mut db, "typedef int Alias;", None).is_empty());
        assert!(read(&mut db, "; int", None).is_empty());
    }
}
