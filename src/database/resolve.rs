use log::{debug, info};

use super::{Database, TypeId};

/// Outcome of [`Database::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Handles redirected onto a canonical type by this call.
    pub substituted: usize,
    /// Names still only known as placeholders (external or never scanned).
    pub unresolved: Vec<String>,
}

impl Database {
    /// Point every placeholder at the registered type of the same name, then
    /// record derived-type back-references on the canonical bases.
    ///
    /// Placeholders named `ns::Name` fall back to a type registered as `Name`.
    /// Names that were never registered stay incomplete. Running the pass again
    /// without new registrations substitutes nothing and adds no duplicates.
    pub fn resolve(&mut self) -> Resolution {
        let mut substituted = 0;

        for index in 0..self.types.len() {
            let id = TypeId::from_index(index);
            if self.redirect[index] != id || self.types[index].flags.is_complete {
                continue;
            }
            if let Some(target) = self.resolve_name(&self.types[index].name) {
                if target != id {
                    self.redirect[index] = target;
                    substituted += 1;
                }
            }
        }

        for (replaced, replacement) in self.superseded.clone() {
            if self.redirect[replaced.index()] == replaced {
                self.redirect[replaced.index()] = replacement;
                substituted += 1;
            }
        }

        // Only after all substitutions, so back-references land on canonical
        // instances.
        self.link_derived();

        let mut unresolved: Vec<String> = self
            .placeholders
            .values()
            .filter(|&&id| !self.is_complete(id))
            .map(|&id| self.name(id).to_string())
            .collect();
        unresolved.sort();

        info!(
            "resolved {} forward references, {} names left external",
            substituted,
            unresolved.len()
        );
        if !unresolved.is_empty() {
            debug!("external types: {}", unresolved.join(", "));
        }

        Resolution {
            substituted,
            unresolved,
        }
    }

    fn resolve_name(&self, name: &str) -> Option<TypeId> {
        let found = self.lookup(name).or_else(|| {
            let (_, tail) = name.rsplit_once("::")?;
            self.lookup(tail)
        })?;
        Some(self.canonical(found))
    }

    fn link_derived(&mut self) {
        for id in self.registration_order.clone() {
            let bases = self.types[id.index()].bases.clone();
            for base in bases {
                let base = self.canonical(base);
                if base == id || !self.is_registered(base) {
                    continue;
                }
                let derived = &mut self.types[base.index()].derived;
                if !derived.contains(&id) {
                    derived.push(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::database::{Database, Property, TemplateParam, TypeDef};

    #[test]
    fn test_forward_base_resolves_to_canonical() {
        let mut db = Database::new();
        let mut child = TypeDef::new("Child");
        child.bases.push(db.reference("Parent"));
        let child = db.register(child);
        let parent = db.register(TypeDef::new("Parent"));

        let resolution = db.resolve();
        assert_eq!(resolution.substituted, 1);
        assert!(resolution.unresolved.is_empty());

        let base = db.get(child).bases[0];
        assert!(db.same(base, parent));
        assert!(db.is_complete(base));
        assert_eq!(db.get(parent).derived, vec![child]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut db = Database::new();
        let mut child = TypeDef::new("Child");
        child.bases.push(db.reference("Parent"));
        let mut field = Property::new("items", db.reference("List"));
        field
            .template_args
            .push(TemplateParam::Type(Property::new("", db.reference("Parent"))));
        child.properties.push(field);
        db.register(child);
        let parent = db.register(TypeDef::new("Parent"));

        let first = db.resolve();
        assert_eq!(first.substituted, 1);
        assert_eq!(first.unresolved, vec!["List".to_string()]);

        let second = db.resolve();
        assert_eq!(second.substituted, 0);
        assert_eq!(db.get(parent).derived.len(), 1);
    }

    #[test]
    fn test_qualified_placeholder_falls_back_to_tail() {
        let mut db = Database::new();
        let handle = db.reference("engine::Node");
        let node = db.register(TypeDef::new("Node"));
        db.resolve();
        assert!(db.same(handle, node));
    }

    #[test]
    fn test_unresolved_names_stay_placeholders() {
        let mut db = Database::new();
        let handle = db.reference("Elsewhere");
        let resolution = db.resolve();
        assert!(!db.is_complete(handle));
        assert_eq!(resolution.unresolved, vec!["Elsewhere".to_string()]);
    }
}
