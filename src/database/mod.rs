//! The type database.
//!
//! Types live in an arena and are addressed by [`TypeId`]. Every id has a slot
//! in an indirection table; a forward reference gets its own placeholder id
//! that initially points at itself, and resolution redirects it to the
//! canonical registered type. Records are never moved or deleted, so an id
//! handed out during scanning stays meaningful for the whole session.

mod builtins;
pub mod modifiers;
mod queries;
mod resolve;
pub mod traits;
pub mod types;

use log::{debug, warn};
use rustc_hash::FxHashMap;

pub use modifiers::{Decorations, Modifiers, Qualifiers, Shape, Visibility};
pub use resolve::Resolution;
pub use traits::{NumericRange, Trait, TraitFill, Traits};
pub use types::{EnumValue, Method, Property, TemplateParam, TypeDef, TypeFlags, TypeId};

#[derive(Debug, Clone, Default)]
pub struct Database {
    types: Vec<TypeDef>,
    redirect: Vec<TypeId>,
    registry: FxHashMap<String, TypeId>,
    registration_order: Vec<TypeId>,
    /// One placeholder per unknown name.
    placeholders: FxHashMap<String, TypeId>,
    /// (replaced, replacement) pairs from duplicate registrations.
    superseded: Vec<(TypeId, TypeId)>,
    /// Enum entry name -> value, filled as enums are registered.
    literals: FxHashMap<String, i64>,
    pub free_functions: Vec<Method>,
    pub free_properties: Vec<Property>,
}

impl Database {
    /// An empty database with no built-in types.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(def);
        self.redirect.push(id);
        id
    }

    /// Register `def` under its name and return its id.
    ///
    /// A second registration of the same name replaces the first: lookups
    /// return the new id from now on, and resolution redirects every handle to
    /// the old record onto the new one.
    pub fn register(&mut self, def: TypeDef) -> TypeId {
        let name = def.name.clone();
        let is_enum = def.is_enum();
        let id = self.alloc(def);

        if is_enum {
            self.define_literals(id);
        }

        if let Some(previous) = self.registry.insert(name.clone(), id) {
            warn!("type '{}' registered twice, the later declaration wins", name);
            self.superseded.push((previous, id));
            self.registration_order.retain(|&other| other != previous);
        }
        self.registration_order.push(id);
        debug!("registered type '{}' as {:?}", name, id);
        id
    }

    fn define_literals(&mut self, id: TypeId) {
        let values = &self.types[id.index()].enum_values;
        for entry in values {
            self.literals.entry(entry.name.clone()).or_insert(entry.value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.registry.get(name).copied()
    }

    /// The registered type for `name`, or a (shared) incomplete placeholder.
    pub fn reference(&mut self, name: &str) -> TypeId {
        match self.lookup(name) {
            Some(id) => id,
            None => self.placeholder(name),
        }
    }

    /// The incomplete placeholder for `name`, created on first use.
    pub fn placeholder(&mut self, name: &str) -> TypeId {
        if let Some(&id) = self.placeholders.get(name) {
            return id;
        }
        let id = self.alloc(TypeDef::placeholder(name));
        self.placeholders.insert(name.to_string(), id);
        debug!("forward reference to '{}' as placeholder {:?}", name, id);
        id
    }

    /// Follow the indirection table to the id that currently stands for `id`.
    pub fn canonical(&self, id: TypeId) -> TypeId {
        let mut current = id;
        // Redirect chains are short; the bound guards against a cycle.
        for _ in 0..self.redirect.len() {
            let next = self.redirect[current.index()];
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.types[self.canonical(id).index()]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeDef {
        let index = self.canonical(id).index();
        &mut self.types[index]
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.get(id).name
    }

    /// Whether two handles stand for the same type.
    pub fn same(&self, a: TypeId, b: TypeId) -> bool {
        self.canonical(a) == self.canonical(b)
    }

    pub fn is_complete(&self, id: TypeId) -> bool {
        self.get(id).flags.is_complete
    }

    pub(crate) fn is_registered(&self, id: TypeId) -> bool {
        let id = self.canonical(id);
        self.registry.get(&self.types[id.index()].name) == Some(&id)
    }

    /// Value of a named enum entry from any enum registered so far.
    pub fn literal(&self, name: &str) -> Option<i64> {
        self.literals.get(name).copied()
    }

    /// Every registered type in registration order.
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.registration_order.iter().copied()
    }

    /// Registered types that came from scanned source: no primitives,
    /// templates or internal types.
    pub fn user_types(&self) -> Vec<TypeId> {
        self.types()
            .filter(|&id| {
                let flags = &self.get(id).flags;
                !flags.is_primitive && !flags.is_template && !flags.is_internal
            })
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&TypeDef> {
        self.lookup(name).map(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.registration_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registration_order.is_empty()
    }
}
