//! Emission orders over a resolved database.
//!
//! Generated code for a type must come after the code for every type it
//! names. A type depends on its bases, the types of its properties, the types
//! in its method signatures and every nested template argument of those.
//!
//! - [`sort_by_reference`]: pairwise reachability comparator
//! - [`sort_by_depth_leveling`]: bounded depth leveling, then a stable sort
//! - [`sort_by_inheritance_depth`]: primary-base chain length only

mod comparator;
mod leveling;

pub use comparator::sort_by_reference;
pub use leveling::{depth_levels, sort_by_depth_leveling};

use std::fmt;
use std::str::FromStr;

use crate::database::{Database, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStrategy {
    /// As registered.
    #[default]
    Registration,
    Comparator,
    Leveling,
    InheritanceDepth,
}

impl OrderStrategy {
    pub fn apply(self, db: &Database, types: &[TypeId]) -> Vec<TypeId> {
        match self {
            OrderStrategy::Registration => types.to_vec(),
            OrderStrategy::Comparator => sort_by_reference(db, types),
            OrderStrategy::Leveling => sort_by_depth_leveling(db, types),
            OrderStrategy::InheritanceDepth => sort_by_inheritance_depth(db, types),
        }
    }
}

impl FromStr for OrderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(OrderStrategy::Registration),
            "comparator" => Ok(OrderStrategy::Comparator),
            "leveling" => Ok(OrderStrategy::Leveling),
            "inheritance" => Ok(OrderStrategy::InheritanceDepth),
            other => Err(format!("unknown order '{}'", other)),
        }
    }
}

impl fmt::Display for OrderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OrderStrategy::Registration => "registration",
            OrderStrategy::Comparator => "comparator",
            OrderStrategy::Leveling => "leveling",
            OrderStrategy::InheritanceDepth => "inheritance",
        };
        write!(f, "{}", name)
    }
}

/// Stable order by number of primary bases, roots first.
pub fn sort_by_inheritance_depth(db: &Database, types: &[TypeId]) -> Vec<TypeId> {
    let mut ordered = types.to_vec();
    ordered.sort_by_key(|&id| db.base_depth(id));
    ordered
}

/// Direct dependencies of `id`, canonical and deduplicated, in discovery order.
pub(crate) fn dependencies(db: &Database, id: TypeId) -> Vec<TypeId> {
    let def = db.get(id);
    let mut out: Vec<TypeId> = Vec::new();
    let mut add = |ty: TypeId| {
        let ty = db.canonical(ty);
        if !out.contains(&ty) {
            out.push(ty);
        }
    };

    for &base in &def.bases {
        add(base);
    }
    for property in &def.properties {
        add(property.ty);
        for ty in property.template_types() {
            add(ty);
        }
    }
    for method in &def.methods {
        for ty in method.signature_types() {
            add(ty);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Property, TypeDef};

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in [
            OrderStrategy::Registration,
            OrderStrategy::Comparator,
            OrderStrategy::Leveling,
            OrderStrategy::InheritanceDepth,
        ] {
            assert_eq!(strategy.to_string().parse::<OrderStrategy>(), Ok(strategy));
        }
        assert!("random".parse::<OrderStrategy>().is_err());
    }

    #[test]
    fn test_inheritance_depth_order() {
        let mut db = Database::new();
        let mut leaf = TypeDef::new("Leaf");
        leaf.bases.push(db.reference("Mid"));
        let leaf = db.register(leaf);
        let mut mid = TypeDef::new("Mid");
        mid.bases.push(db.reference("Root"));
        let mid = db.register(mid);
        let root = db.register(TypeDef::new("Root"));
        db.resolve();

        let ordered = sort_by_inheritance_depth(&db, &[leaf, mid, root]);
        assert_eq!(ordered, vec![root, mid, leaf]);
    }

    #[test]
    fn test_dependencies_are_deduplicated() {
        let mut db = Database::new();
        let part = db.register(TypeDef::new("Part"));
        let mut whole = TypeDef::new("Whole");
        whole.properties.push(Property::new("a", part));
        whole.properties.push(Property::new("b", part));
        let whole = db.register(whole);
        assert_eq!(dependencies(&db, whole), vec![part]);
    }
}
