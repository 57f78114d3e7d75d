//! Closure resolution over a real corpus file.

mod common;

use cartograph_checkpoint::MemoryStore;
use cartograph_model::EntityKind;
use cartograph_resolve::{resolve_root, resolve_selection};
use common::*;
use tempfile::tempdir;

#[test]
fn resolves_full_closure_from_a_group_seed() {
    let dir = tempdir().unwrap();
    let source = corpus_with(
        dir.path(),
        vec![
            point(1),
            point(2),
            point(3),
            path(10, &[1, 2]),
            group(
                20,
                vec![
                    member(EntityKind::Path, 10, "outer"),
                    member(EntityKind::Point, 3, "label"),
                ],
            ),
        ],
    );
    let store = MemoryStore::new();

    let (graph, found) =
        resolve_root(&source, &store, "island", EntityKind::Group, 20, 0).unwrap();
    assert!(found);
    assert!(graph.contains(EntityKind::Group, 20));
    assert!(graph.contains(EntityKind::Path, 10));
    assert!(graph.contains(EntityKind::Point, 1));
    assert!(graph.contains(EntityKind::Point, 3));

    let groups = graph.complete_root_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id(), 20);
    assert!(!groups[0].is_broken());
    assert_eq!(groups[0].members().len(), 2);
    assert!(graph.broken_root_groups().is_empty());
    assert!(graph.missing_point_ids().is_empty());
}

#[test]
fn dangling_point_breaks_path_and_containing_group() {
    // G1 -> [P1], P1 -> (N1, N2, N3); the corpus lacks N3.
    let dir = tempdir().unwrap();
    let source = corpus_with(
        dir.path(),
        vec![
            point(1),
            point(2),
            path(100, &[1, 2, 3]),
            group(200, vec![member(EntityKind::Path, 100, "outer")]),
        ],
    );
    let store = MemoryStore::new();

    let (graph, found) =
        resolve_root(&source, &store, "broken-island", EntityKind::Group, 200, 0).unwrap();
    assert!(found);

    assert!(graph.is_path_broken(100));
    assert!(graph.is_group_broken(200));

    let broken = graph.broken_root_groups();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].id(), 200);
    assert!(graph.complete_root_groups().is_empty());

    assert_eq!(graph.missing_point_ids(), vec![3]);
    assert!(graph.missing_path_ids().is_empty());
    assert!(graph.missing_group_ids().is_empty());

    // The path still resolved what it could, in reference order.
    let path_view = graph.path(100).unwrap();
    let resolved: Vec<_> = path_view.resolved_points().iter().map(|p| p.id).collect();
    assert_eq!(resolved, vec![1, 2]);
}

#[test]
fn pass_limit_one_returns_only_directly_loaded_entities() {
    let dir = tempdir().unwrap();
    let source = corpus_with(
        dir.path(),
        vec![
            point(1),
            path(10, &[1]),
            group(20, vec![member(EntityKind::Path, 10, "")]),
        ],
    );
    let store = MemoryStore::new();

    let (graph, found) =
        resolve_root(&source, &store, "shallow", EntityKind::Group, 20, 1).unwrap();
    assert!(found);
    assert!(graph.contains(EntityKind::Group, 20));
    // Expansion never ran: the referenced path was neither loaded nor
    // requested, so it is not missing either.
    assert!(!graph.contains(EntityKind::Path, 10));
    assert!(graph.missing_path_ids().is_empty());
}

#[test]
fn unfound_seed_id_is_reported_missing() {
    let dir = tempdir().unwrap();
    let source = corpus_with(dir.path(), vec![point(1)]);
    let store = MemoryStore::new();

    let (graph, found) =
        resolve_root(&source, &store, "ghost", EntityKind::Point, 999, 0).unwrap();
    assert!(!found);
    assert_eq!(graph.missing_point_ids(), vec![999]);
    assert_eq!(graph.maps().entity_count(), 0);
}

#[test]
fn predicate_selection_seeds_every_match() {
    let dir = tempdir().unwrap();
    let source = corpus_with(
        dir.path(),
        vec![
            point(1),
            point(2),
            path(10, &[1]),
            group_tagged(
                20,
                &[("place", "island")],
                vec![member(EntityKind::Path, 10, "outer")],
            ),
            group_tagged(
                21,
                &[("place", "island")],
                vec![member(EntityKind::Point, 2, "label")],
            ),
            group_tagged(22, &[("place", "city")], vec![]),
        ],
    );
    let store = MemoryStore::new();

    let graph = resolve_selection(
        &source,
        &store,
        "islands",
        &|raw| raw.tag("place") == Some("island"),
        0,
    )
    .unwrap();

    assert!(graph.contains(EntityKind::Group, 20));
    assert!(graph.contains(EntityKind::Group, 21));
    assert!(!graph.contains(EntityKind::Group, 22));
    assert!(graph.contains(EntityKind::Path, 10));
    assert!(graph.contains(EntityKind::Point, 1));
    assert!(graph.missing_point_ids().is_empty());

    let roots: Vec<_> = graph.complete_root_groups().iter().map(|g| g.id()).collect();
    assert_eq!(roots, vec![20, 21]);
}

#[test]
fn closure_is_complete_and_roots_partition_the_graph() {
    let dir = tempdir().unwrap();
    let source = corpus_with(
        dir.path(),
        vec![
            point(1),
            point(2),
            point(3),
            path(10, &[1, 2]),
            path(11, &[2, 3]),
            group(20, vec![member(EntityKind::Path, 10, "")]),
            group(
                21,
                vec![
                    member(EntityKind::Group, 20, "sub"),
                    member(EntityKind::Path, 11, ""),
                ],
            ),
        ],
    );
    let store = MemoryStore::new();

    let (graph, _) = resolve_root(&source, &store, "nested", EntityKind::Group, 21, 0).unwrap();

    // Closure completeness: every resolved reference appears in the raw refs.
    for id in [10, 11] {
        let view = graph.path(id).unwrap();
        for p in view.resolved_points() {
            assert!(view.raw().point_ids.contains(&p.id));
        }
    }

    // Root partition: exactly one root (the seed), and everything loaded is
    // reachable from it.
    assert_eq!(graph.root_points().count(), 0);
    assert!(graph.complete_root_paths().is_empty());
    let roots = graph.complete_root_groups();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id(), 21);

    let mut reachable = std::collections::BTreeSet::new();
    let mut stack = vec![(EntityKind::Group, 21u64)];
    while let Some((kind, id)) = stack.pop() {
        if !reachable.insert((kind, id)) {
            continue;
        }
        match kind {
            EntityKind::Point => {}
            EntityKind::Path => {
                let view = graph.path(id).unwrap();
                stack.extend(
                    view.resolved_points()
                        .iter()
                        .map(|p| (EntityKind::Point, p.id)),
                );
            }
            EntityKind::Group => {
                let view = graph.group(id).unwrap();
                stack.extend(view.members().iter().map(|m| (m.entity.kind(), m.entity.id())));
            }
        }
    }
    assert_eq!(reachable.len(), graph.maps().entity_count());
}

#[test]
fn large_fully_resolvable_group_converges_with_unlimited_passes() {
    // One tagged group with >100 direct members, every reference present.
    let dir = tempdir().unwrap();
    let mut entities: Vec<_> = (1..=150u64).map(point).collect();
    let members: Vec<_> = (1..=150u64)
        .map(|id| member(EntityKind::Point, id, "shore"))
        .collect();
    entities.push(group_tagged(500, &[("place", "island")], members));
    let source = corpus_with(dir.path(), entities);
    let store = MemoryStore::new();

    let graph = resolve_selection(
        &source,
        &store,
        "big-island",
        &|raw| raw.tag("place") == Some("island"),
        0,
    )
    .unwrap();

    let groups = graph.complete_root_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members().len(), 150);
    assert!(!groups[0].is_broken());
    assert!(graph.missing_point_ids().is_empty());
    assert!(graph.missing_path_ids().is_empty());
    assert!(graph.missing_group_ids().is_empty());
}

#[test]
fn empty_selection_name_is_rejected() {
    let dir = tempdir().unwrap();
    let source = corpus_with(dir.path(), vec![point(1)]);
    let store = MemoryStore::new();

    let err = resolve_root(&source, &store, "  ", EntityKind::Point, 1, 0).unwrap_err();
    assert!(matches!(
        err,
        cartograph_model::CartographError::InvalidArgument(_)
    ));
}

#[test]
fn missing_source_without_checkpoints_is_fatal() {
    let dir = tempdir().unwrap();
    let source = cartograph_source::FileSource::new(dir.path().join("absent.cgr"));
    let store = MemoryStore::new();

    let err = resolve_root(&source, &store, "nowhere", EntityKind::Point, 1, 0).unwrap_err();
    assert!(matches!(
        err,
        cartograph_model::CartographError::SourceNotFound(_)
    ));
}
