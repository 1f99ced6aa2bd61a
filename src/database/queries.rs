//! Read-only questions generators ask of a resolved database.

use rustc_hash::FxHashSet;

use super::{Database, Method, Property, TemplateParam, TypeId};

const NUMERIC: &[&str] = &[
    "short", "int", "unsigned", "uint32_t", "int8_t", "uint8_t", "int16_t", "uint16_t", "int64_t",
    "uint64_t", "float", "double", "size_t",
];

const LIST_TYPES: &[&str] = &["std::array", "std::vector", "ResourceRefList"];
const TABLE_TYPES: &[&str] = &["std::map", "std::unordered_map"];
const RESOURCE_TYPES: &[&str] = &["ResourceRef", "ResourceRefList"];

fn is_named(names: &[&str], name: &str) -> bool {
    names.iter().any(|candidate| *candidate == name)
}

impl Database {
    pub fn primary_base(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).primary_base().map(|base| self.canonical(base))
    }

    /// Primary-base chain from `id` upwards, nearest first. Stops on a cycle.
    fn primary_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(self.canonical(id));
        let mut current = self.primary_base(id);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.primary_base(base);
        }
        chain
    }

    /// The top of the primary-base chain; a type without bases is its own root.
    pub fn root_base(&self, id: TypeId) -> TypeId {
        self.primary_chain(id)
            .last()
            .copied()
            .unwrap_or_else(|| self.canonical(id))
    }

    /// Number of primary bases above `id`.
    pub fn base_depth(&self, id: TypeId) -> usize {
        self.primary_chain(id).len()
    }

    /// Every ancestor through all bases, each ancestor before its descendants.
    pub fn inheritance_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(self.canonical(id));
        self.collect_ancestors(id, &mut seen, &mut out);
        out
    }

    fn collect_ancestors(&self, id: TypeId, seen: &mut FxHashSet<TypeId>, out: &mut Vec<TypeId>) {
        for &base in &self.get(id).bases {
            let base = self.canonical(base);
            if seen.insert(base) {
                self.collect_ancestors(base, seen, out);
                out.push(base);
            }
        }
    }

    pub fn inherits(&self, id: TypeId, target: TypeId) -> bool {
        let target = self.canonical(target);
        self.inheritance_chain(id).contains(&target)
    }

    /// Whether any ancestor is named `base_name`.
    pub fn extends(&self, id: TypeId, base_name: &str) -> bool {
        self.inheritance_chain(id)
            .into_iter()
            .any(|base| self.name(base) == base_name)
    }

    pub fn has_method(&self, id: TypeId, name: &str) -> bool {
        self.get(id).method(name).is_some()
    }

    /// Whether the type or any primary base declares a method.
    pub fn has_any_functions(&self, id: TypeId) -> bool {
        std::iter::once(self.canonical(id))
            .chain(self.primary_chain(id))
            .any(|ty| !self.get(ty).methods.is_empty())
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        is_named(NUMERIC, self.name(id))
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        self.get(id).is_enum()
    }

    pub fn is_list(&self, property: &Property) -> bool {
        is_named(LIST_TYPES, self.name(property.ty))
    }

    pub fn is_table(&self, property: &Property) -> bool {
        is_named(TABLE_TYPES, self.name(property.ty))
    }

    pub fn is_resource(&self, property: &Property) -> bool {
        is_named(RESOURCE_TYPES, self.name(property.ty))
    }

    /// C++ spelling of a property's type, e.g. `const std::vector<Foo*>&`.
    /// Without modifiers only the name and template arguments are written.
    pub fn full_type_name(&self, property: &Property, with_modifiers: bool) -> String {
        let mut text = String::new();
        let modifiers = &property.modifiers;
        if with_modifiers && modifiers.qualifiers.is_const {
            text.push_str("const ");
        }
        text.push_str(self.name(property.ty));

        if !property.template_args.is_empty() {
            let args: Vec<String> = property
                .template_args
                .iter()
                .map(|arg| match arg {
                    TemplateParam::Integer(value) => value.to_string(),
                    TemplateParam::Type(inner) => self.full_type_name(inner, with_modifiers),
                })
                .collect();
            text.push('<');
            text.push_str(&args.join(", "));
            text.push('>');
        }

        if with_modifiers {
            for _ in 0..modifiers.shape.pointer_depth {
                text.push('*');
            }
            if modifiers.shape.is_reference {
                text.push('&');
            }
            if modifiers.shape.is_const_pointer {
                text.push_str(" const");
            }
        }
        text
    }

    pub fn return_text(&self, method: &Method) -> String {
        self.full_type_name(&method.return_value, true)
    }

    /// Parameter list as written in a function pointer type: `(int, const Foo&) const`.
    pub fn call_signature(&self, method: &Method) -> String {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|param| self.full_type_name(param, true))
            .collect();
        let mut text = format!("({})", params.join(", "));
        if method.modifiers.qualifiers.is_const {
            text.push_str(" const");
        }
        text
    }

    pub fn same_property_signature(&self, a: &Property, b: &Property) -> bool {
        a.modifiers.qualifiers == b.modifiers.qualifiers
            && a.modifiers.shape == b.modifiers.shape
            && self.same(a.ty, b.ty)
            && a.template_args.len() == b.template_args.len()
            && a.template_args
                .iter()
                .zip(&b.template_args)
                .all(|pair| match pair {
                    (TemplateParam::Integer(x), TemplateParam::Integer(y)) => x == y,
                    (TemplateParam::Type(x), TemplateParam::Type(y)) => {
                        self.same_property_signature(x, y)
                    }
                    _ => false,
                })
    }

    pub fn same_signature(&self, a: &Method, b: &Method) -> bool {
        a.modifiers.qualifiers.is_const == b.modifiers.qualifiers.is_const
            && self.same_property_signature(&a.return_value, &b.return_value)
            && a.params.len() == b.params.len()
            && a.params
                .iter()
                .zip(&b.params)
                .all(|(x, y)| self.same_property_signature(x, y))
    }

    /// For a virtual method, the matching declaration in the nearest direct
    /// base that has one; otherwise the method itself.
    pub fn base_method<'a>(&'a self, method: &'a Method) -> &'a Method {
        let Some(declaring) = method.declaring else {
            return method;
        };
        if !method.modifiers.decorations.is_virtual {
            return method;
        }
        self.get(declaring)
            .bases
            .iter()
            .flat_map(|&base| self.get(base).methods.iter())
            .find(|candidate| {
                candidate.name == method.name && self.same_signature(candidate, method)
            })
            .unwrap_or(method)
    }

    /// The type whose declaration a virtual method overrides.
    pub fn virtual_origin(&self, method: &Method) -> Option<TypeId> {
        self.base_method(method).declaring
    }
}

#[cfg(test)]
mod tests {
    use crate::database::{Database, Method, Modifiers, Property, TemplateParam, TypeDef};

    fn hierarchy() -> Database {
        let mut db = Database::with_builtins();
        let base = db.register(TypeDef::new("Object"));
        let mut middle = TypeDef::new("Component");
        middle.bases.push(base);
        let middle = db.register(middle);
        let mut leaf = TypeDef::new("Light");
        leaf.bases.push(middle);
        db.register(leaf);
        db.resolve();
        db
    }

    #[test]
    fn test_inheritance_queries() {
        let db = hierarchy();
        let object = db.lookup("Object").unwrap();
        let component = db.lookup("Component").unwrap();
        let light = db.lookup("Light").unwrap();

        assert_eq!(db.primary_base(light), Some(component));
        assert_eq!(db.root_base(light), object);
        assert_eq!(db.root_base(object), object);
        assert_eq!(db.base_depth(light), 2);
        assert_eq!(db.inheritance_chain(light), vec![object, component]);
        assert!(db.inherits(light, object));
        assert!(!db.inherits(object, light));
        assert!(db.extends(light, "Object"));
    }

    #[test]
    fn test_cyclic_bases_terminate() {
        let mut db = Database::new();
        let mut a = TypeDef::new("A");
        a.bases.push(db.reference("B"));
        let a = db.register(a);
        let mut b = TypeDef::new("B");
        b.bases.push(a);
        db.register(b);
        db.resolve();
        assert_eq!(db.base_depth(a), 1);
        assert_eq!(db.inheritance_chain(a).len(), 1);
    }

    #[test]
    fn test_full_type_name() {
        let mut db = Database::with_builtins();
        let foo = db.register(TypeDef::new("Foo"));
        let mut inner = Property::new("", foo);
        inner.modifiers.shape.pointer_depth = 1;
        let mut property = Property::new("items", db.lookup("std::vector").unwrap());
        property.template_args.push(TemplateParam::Type(inner));
        property.modifiers.qualifiers.is_const = true;
        property.modifiers.shape.is_reference = true;

        assert_eq!(db.full_type_name(&property, true), "const std::vector<Foo*>&");
        assert_eq!(db.full_type_name(&property, false), "std::vector<Foo>");
        assert!(db.is_list(&property));
        assert!(!db.is_table(&property));
    }

    #[test]
    fn test_virtual_base_method() {
        let mut db = Database::with_builtins();
        let void = db.lookup("void").unwrap();
        let base = db.register(TypeDef::new("Base"));
        let mut derived = TypeDef::new("Derived");
        derived.bases.push(base);
        let derived = db.register(derived);

        let mut original = Method::new("Update", Some(base), Property::new("", void));
        original.modifiers.decorations.is_virtual = true;
        db.get_mut(base).methods.push(original);

        let mut overriding = Method::new("Update", Some(derived), Property::new("", void));
        overriding.modifiers = Modifiers::public();
        overriding.modifiers.decorations.is_virtual = true;
        db.get_mut(derived).methods.push(overriding.clone());

        assert_eq!(db.virtual_origin(&overriding), Some(base));
        assert_eq!(db.call_signature(&overriding), "()");
        assert_eq!(db.return_text(&overriding), "void");
        assert!(db.has_any_functions(derived));
        assert!(db.has_method(base, "Update"));
    }
}
