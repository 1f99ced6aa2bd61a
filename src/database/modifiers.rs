//! Declaration modifiers, grouped by concern.
//!
//! A member's modifiers are four independent small sets rather than one wide
//! bitfield: who can see it, how it is stored, what shape the reference has,
//! and which C++ decorations were spelled on it.

/// Access level of a member. Free functions and globals are [`Visibility::Public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Default,
    Public,
    Protected,
    Private,
}

/// Storage and cv-qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_constexpr: bool,
    pub is_mutable: bool,
    pub is_volatile: bool,
    pub is_static: bool,
    /// The project-specific `transient` marker: excluded from serialization.
    pub is_transient: bool,
}

/// Pointer/reference shape of a type reference.
///
/// "Is a pointer" is derived from the depth, so a pointer flag without a depth
/// cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shape {
    pub pointer_depth: usize,
    pub is_reference: bool,
    /// `T* const`
    pub is_const_pointer: bool,
}

impl Shape {
    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }
}

/// Decorations on methods (and the virtual marker on virtual properties).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decorations {
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_constructor: bool,
    pub is_destructor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub qualifiers: Qualifiers,
    pub shape: Shape,
    pub decorations: Decorations,
}

impl Modifiers {
    pub fn public() -> Self {
        Modifiers {
            visibility: Visibility::Public,
            ..Modifiers::default()
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.shape.is_pointer()
    }

    pub fn is_reference(&self) -> bool {
        self.shape.is_reference
    }

    pub fn is_const(&self) -> bool {
        self.qualifiers.is_const
    }
}
