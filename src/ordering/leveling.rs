use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use super::dependencies;
use crate::database::{Database, TypeId};

/// Depth of each entry of `types`: strictly greater than the depth of every
/// listed, non-primitive type it depends on.
///
/// Depths start at 0 and are raised in rounds. The number of rounds is one
/// more than the largest fan-in (how many listed types reference one type).
/// This is an approximation: a chain longer than the round count, listed
/// dependents first, can end with a type at the same depth as one it depends
/// on, and a reference cycle stops climbing when the rounds run out.
pub fn depth_levels(db: &Database, types: &[TypeId]) -> Vec<usize> {
    let mut index: FxHashMap<TypeId, usize> = FxHashMap::default();
    for (i, &id) in types.iter().enumerate() {
        index.entry(db.canonical(id)).or_insert(i);
    }

    let edges: Vec<Vec<usize>> = types
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            dependencies(db, id)
                .into_iter()
                .filter(|&dep| !db.get(dep).flags.is_primitive)
                .filter_map(|dep| index.get(&dep).copied())
                .filter(|&j| j != i)
                .collect()
        })
        .collect();

    let mut touches: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); types.len()];
    for (i, deps) in edges.iter().enumerate() {
        for &j in deps {
            touches[j].insert(i);
        }
    }
    let max_fan_in = touches.iter().map(|set| set.len()).max().unwrap_or(0);
    let rounds = max_fan_in + 1;

    let mut depths = vec![0usize; types.len()];
    for round in 0..rounds {
        let mut changed = false;
        for (i, deps) in edges.iter().enumerate() {
            for &j in deps {
                if depths[i] <= depths[j] {
                    depths[i] = depths[j] + 1;
                    changed = true;
                }
            }
        }
        if !changed {
            debug!("depth leveling settled after {} of {} rounds", round + 1, rounds);
            break;
        }
    }
    depths
}

/// `types` in ascending depth; equal depths keep their input order.
pub fn sort_by_depth_leveling(db: &Database, types: &[TypeId]) -> Vec<TypeId> {
    let depths = depth_levels(db, types);
    let mut order: Vec<usize> = (0..types.len()).collect();
    order.sort_by_key(|&i| depths[i]);
    order.into_iter().map(|i| types[i]).collect()
}
