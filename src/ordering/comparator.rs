use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};

use super::dependencies;
use crate::database::{Database, TypeId};

/// Order `types` so that a type follows every type it reaches.
///
/// Two types are compared by reachability through dependency edges: if `a`
/// reaches `b` and `b` does not reach `a`, `b` goes first. Unrelated and
/// mutually reaching pairs compare equal, which makes the relation
/// non-transitive. Each type is inserted ahead of the first already placed
/// type that reaches it, and otherwise appended, so unrelated types keep
/// their input order. Mutually reaching types (cycles) can leave inversions.
pub fn sort_by_reference(db: &Database, types: &[TypeId]) -> Vec<TypeId> {
    let reach: FxHashMap<TypeId, FxHashSet<TypeId>> = types
        .iter()
        .map(|&id| {
            let id = db.canonical(id);
            (id, reachable(db, id))
        })
        .collect();

    let compare = |a: TypeId, b: TypeId| -> Ordering {
        let a = db.canonical(a);
        let b = db.canonical(b);
        let a_reaches_b = reach.get(&a).is_some_and(|set| set.contains(&b));
        let b_reaches_a = reach.get(&b).is_some_and(|set| set.contains(&a));
        match (a_reaches_b, b_reaches_a) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        }
    };

    // Insertion sort: slice::sort_by may panic on a comparator that is not a
    // total order.
    let mut ordered: Vec<TypeId> = Vec::with_capacity(types.len());
    for &id in types {
        let slot = ordered
            .iter()
            .position(|&placed| compare(placed, id) == Ordering::Greater)
            .unwrap_or(ordered.len());
        ordered.insert(slot, id);
    }
    ordered
}

/// Every type reachable from `id` through one or more dependency edges.
fn reachable(db: &Database, id: TypeId) -> FxHashSet<TypeId> {
    let mut seen = FxHashSet::default();
    let mut stack = dependencies(db, id);
    while let Some(next) = stack.pop() {
        if seen.insert(next) {
            stack.extend(dependencies(db, next));
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Method, Property, TemplateParam, TypeDef};

    #[test]
    fn test_dependency_moves_first() {
        let mut db = Database::with_builtins();
        let mut user = TypeDef::new("User");
        user.properties.push(Property::new("part", db.reference("Part")));
        let user = db.register(user);
        let part = db.register(TypeDef::new("Part"));
        let other = db.register(TypeDef::new("Other"));
        db.resolve();

        let ordered = sort_by_reference(&db, &[user, other, part]);
        let pos = |id| ordered.iter().position(|&x| x == id).unwrap();
        assert!(pos(part) < pos(user));
        assert_eq!(ordered.len(), 3);
    }

    #[test]
    fn test_unrelated_type_between_dependent_and_dependency() {
        let mut db = Database::with_builtins();
        let mut user = TypeDef::new("User");
        user.properties.push(Property::new("part", db.reference("Part")));
        let user = db.register(user);
        let other = db.register(TypeDef::new("Other"));
        let part = db.register(TypeDef::new("Part"));
        db.resolve();

        assert_eq!(
            sort_by_reference(&db, &[user, other, part]),
            vec![part, user, other]
        );
    }

    #[test]
    fn test_transitive_reach_through_templates_and_methods() {
        let mut db = Database::with_builtins();
        let leaf = db.register(TypeDef::new("Leaf"));

        let mut middle = TypeDef::new("Middle");
        let void = db.lookup("void").unwrap();
        let mut method = Method::new("Make", None, Property::new("", void));
        method.params.push(Property::new("leaf", leaf));
        middle.methods.push(method);
        let middle = db.register(middle);

        let mut top = TypeDef::new("Top");
        let mut list = Property::new("items", db.lookup("std::vector").unwrap());
        list.template_args
            .push(TemplateParam::Type(Property::new("", middle)));
        top.properties.push(list);
        let top = db.register(top);

        let reach = reachable(&db, top);
        assert!(reach.contains(&middle));
        assert!(reach.contains(&leaf));

        let ordered = sort_by_reference(&db, &[top, middle, leaf]);
        assert_eq!(ordered, vec![leaf, middle, top]);
    }

    #[test]
    fn test_cycles_terminate() {
        let mut db = Database::new();
        let mut a = TypeDef::new("A");
        a.properties.push(Property::new("b", db.reference("B")));
        let a = db.register(a);
        let mut b = TypeDef::new("B");
        b.properties.push(Property::new("a", a));
        let b = db.register(b);
        db.resolve();

        assert_eq!(sort_by_reference(&db, &[a, b]), vec![a, b]);
    }
}
