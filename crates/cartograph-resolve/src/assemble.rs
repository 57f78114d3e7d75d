//! Graph assembly: roots and brokenness.
//!
//! Runs strictly after resolution; the flat maps are immutable from here on.
//! Root classification is purely structural — an entity is a root iff no
//! other loaded entity references it. Whether a root is *interesting* (has a
//! display label, say) is the caller's filter, not the assembler's.

use roaring::RoaringTreemap;

use cartograph_model::EntityKind;

use crate::flat::FlatMaps;
use crate::graph::ResolvedGraph;

/// Assemble the flat maps into a classified graph.
pub fn assemble(maps: FlatMaps) -> ResolvedGraph {
    let broken_paths = broken_paths(&maps);
    let broken_groups = broken_groups(&maps, &broken_paths);

    // Membership sets: ids referenced (and resolved) by some loaded
    // container. Roots are the loaded ids outside these sets.
    let mut member_points = RoaringTreemap::new();
    let mut member_paths = RoaringTreemap::new();
    let mut member_groups = RoaringTreemap::new();
    for path in maps.paths.values() {
        for &point_id in &path.point_ids {
            if maps.contains(EntityKind::Point, point_id) {
                member_points.insert(point_id);
            }
        }
    }
    for group in maps.groups.values() {
        for member in &group.members {
            if !maps.contains(member.kind, member.id) {
                continue;
            }
            match member.kind {
                EntityKind::Point => member_points.insert(member.id),
                EntityKind::Path => member_paths.insert(member.id),
                EntityKind::Group => member_groups.insert(member.id),
            };
        }
    }

    let root_points: Vec<_> = (&maps.loaded().points - &member_points).iter().collect();
    let root_paths: Vec<_> = (&maps.loaded().paths - &member_paths).iter().collect();
    let root_groups: Vec<_> = (&maps.loaded().groups - &member_groups).iter().collect();

    tracing::debug!(
        roots = root_points.len() + root_paths.len() + root_groups.len(),
        broken_paths = broken_paths.len(),
        broken_groups = broken_groups.len(),
        "graph assembled"
    );

    ResolvedGraph {
        maps,
        broken_paths,
        broken_groups,
        root_points,
        root_paths,
        root_groups,
    }
}

/// A path is broken iff at least one of its point references is unloaded.
fn broken_paths(maps: &FlatMaps) -> RoaringTreemap {
    let mut broken = RoaringTreemap::new();
    for path in maps.paths.values() {
        let dangling = path
            .point_ids
            .iter()
            .any(|id| !maps.contains(EntityKind::Point, *id));
        if dangling {
            broken.insert(path.id);
        }
    }
    broken
}

/// Group brokenness, cycle-safe and linear.
///
/// A group is *directly* broken when a member reference dangles or a loaded
/// path member is broken. Brokenness then propagates upward along reverse
/// group-membership edges: every group that (transitively) contains a broken
/// group is broken. Reverse BFS over an id-keyed worklist handles arbitrary
/// group cycles without recursion; each edge is traversed at most once.
fn broken_groups(maps: &FlatMaps, broken_paths: &RoaringTreemap) -> RoaringTreemap {
    let mut broken = RoaringTreemap::new();
    let mut parents_of: ahash::AHashMap<u64, Vec<u64>> = ahash::AHashMap::new();
    let mut worklist: Vec<u64> = Vec::new();

    for group in maps.groups.values() {
        let mut directly_broken = false;
        for member in &group.members {
            if !maps.contains(member.kind, member.id) {
                directly_broken = true;
                continue;
            }
            match member.kind {
                EntityKind::Point => {}
                EntityKind::Path => {
                    if broken_paths.contains(member.id) {
                        directly_broken = true;
                    }
                }
                EntityKind::Group => {
                    parents_of.entry(member.id).or_default().push(group.id);
                }
            }
        }
        if directly_broken && broken.insert(group.id) {
            worklist.push(group.id);
        }
    }

    while let Some(child) = worklist.pop() {
        let Some(parents) = parents_of.get(&child) else {
            continue;
        };
        for &parent in parents {
            if broken.insert(parent) {
                worklist.push(parent);
            }
        }
    }

    broken
}
