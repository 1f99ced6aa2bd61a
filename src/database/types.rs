//! Records stored in the type database

use super::modifiers::Modifiers;
use super::traits::Traits;

/// Handle to a type in the database arena.
///
/// Handles stay valid for the whole scan session. A handle taken before
/// resolution may name a placeholder; [`crate::Database::get`] follows the
/// indirection table to the canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub(crate) fn from_index(index: usize) -> Self {
        TypeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeFlags {
    /// False for placeholders created by forward references.
    pub is_complete: bool,
    pub is_class: bool,
    pub is_primitive: bool,
    /// Built in, never produced by scanning.
    pub is_internal: bool,
    pub is_template: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Math-style aggregate (vectors, rects, colors).
    pub is_vector: bool,
    /// `enum class` / `enum struct`
    pub is_scoped_enum: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub flags: TypeFlags,
    pub api_decl: Option<String>,
    /// Code used by variant-based bindings for built-in types.
    pub variant_type: Option<String>,
    /// First entry is the primary base.
    pub bases: Vec<TypeId>,
    /// Filled only by [`crate::Database::resolve`].
    pub derived: Vec<TypeId>,
    pub containing: Option<TypeId>,
    pub sub_types: Vec<TypeId>,
    pub template_element: Option<TypeId>,
    pub enum_underlying: Option<TypeId>,
    pub enum_values: Vec<EnumValue>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub traits: Traits,
}

impl TypeDef {
    /// A complete, empty type.
    pub fn new(name: impl Into<String>) -> Self {
        TypeDef {
            name: name.into(),
            flags: TypeFlags {
                is_complete: true,
                ..TypeFlags::default()
            },
            api_decl: None,
            variant_type: None,
            bases: Vec::new(),
            derived: Vec::new(),
            containing: None,
            sub_types: Vec::new(),
            template_element: None,
            enum_underlying: None,
            enum_values: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            traits: Traits::default(),
        }
    }

    /// An incomplete stand-in holding only a name.
    pub fn placeholder(name: impl Into<String>) -> Self {
        let mut def = TypeDef::new(name);
        def.flags.is_complete = false;
        def
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }

    pub fn primary_base(&self) -> Option<TypeId> {
        self.bases.first().copied()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn enum_value(&self, name: &str) -> Option<i64> {
        self.enum_values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value)
    }
}

/// A template argument: `Array<int, 4>` has one type and one integer argument.
#[derive(Debug, Clone)]
pub enum TemplateParam {
    Integer(i64),
    Type(Property),
}

/// A field, parameter or return slot.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub modifiers: Modifiers,
    pub template_args: Vec<TemplateParam>,
    /// Enum whose values name the bits of this field (`BITFIELD_FLAGS`).
    pub bit_source: Option<TypeId>,
    /// Fixed array length; 0 when the size expression could not be evaluated.
    pub array_len: Option<usize>,
    /// Initializer text as written in the source.
    pub default_value: Option<String>,
    pub traits: Traits,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Property {
            name: name.into(),
            ty,
            modifiers: Modifiers::default(),
            template_args: Vec::new(),
            bit_source: None,
            array_len: None,
            default_value: None,
            traits: Traits::default(),
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_len.is_some()
    }

    pub fn is_template(&self) -> bool {
        !self.template_args.is_empty()
    }

    pub fn is_pointer_pointer(&self) -> bool {
        self.modifiers.shape.pointer_depth > 1
    }

    /// Type handles of every nested template argument, depth first.
    pub fn template_types(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        collect_template_types(&self.template_args, &mut out);
        out
    }
}

fn collect_template_types(args: &[TemplateParam], out: &mut Vec<TypeId>) {
    for arg in args {
        if let TemplateParam::Type(inner) = arg {
            out.push(inner.ty);
            collect_template_types(&inner.template_args, out);
        }
    }
}

/// A bound method or free function.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    /// `None` for free functions.
    pub declaring: Option<TypeId>,
    pub return_value: Property,
    pub params: Vec<Property>,
    pub param_names: Vec<Option<String>>,
    pub defaults: Vec<Option<String>>,
    pub modifiers: Modifiers,
    pub traits: Traits,
    pub api_decl: Option<String>,
    pub calling_convention: Option<String>,
}

impl Method {
    pub fn new(name: impl Into<String>, declaring: Option<TypeId>, return_value: Property) -> Self {
        Method {
            name: name.into(),
            declaring,
            return_value,
            params: Vec::new(),
            param_names: Vec::new(),
            defaults: Vec::new(),
            modifiers: Modifiers::default(),
            traits: Traits::default(),
            api_decl: None,
            calling_convention: None,
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.modifiers.decorations.is_constructor
    }

    pub fn is_destructor(&self) -> bool {
        self.modifiers.decorations.is_destructor
    }

    /// Every type handle named by the signature, return value first.
    pub fn signature_types(&self) -> Vec<TypeId> {
        let mut out = vec![self.return_value.ty];
        out.extend(self.return_value.template_types());
        for param in &self.params {
            out.push(param.ty);
            out.extend(param.template_types());
        }
        out
    }
}
