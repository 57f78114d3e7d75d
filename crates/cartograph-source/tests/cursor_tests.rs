//! The id-filtered scan and its ascending-kind cursor contract.

use std::collections::BTreeSet;

use cartograph_model::{
    CartographError, EntityKind, Group, MemberRef, Path, Point, RawEntity, Tags,
};
use cartograph_source::{
    corpus::corpus_stats, write_corpus, CorpusWriter, FileSource, IdSelection, PrimitiveSource,
};
use proptest::prelude::*;
use tempfile::tempdir;

fn point(id: u64) -> RawEntity {
    RawEntity::Point(Point {
        id,
        tags: Tags::new(),
        lat: 0.0,
        lon: 0.0,
    })
}

fn path(id: u64) -> RawEntity {
    RawEntity::Path(Path {
        id,
        tags: Tags::new(),
        point_ids: vec![],
    })
}

fn group(id: u64) -> RawEntity {
    RawEntity::Group(Group {
        id,
        tags: Tags::new(),
        members: vec![MemberRef {
            kind: EntityKind::Point,
            id: 1,
            role: String::new(),
        }],
    })
}

fn source_with(dir: &std::path::Path, entities: Vec<RawEntity>) -> FileSource {
    let path = dir.join("corpus.cgr");
    write_corpus(&path, entities).unwrap();
    FileSource::new(path)
}

#[test]
fn matches_requested_ids_across_all_three_kinds_in_one_scan() {
    let dir = tempdir().unwrap();
    let source = source_with(
        dir.path(),
        vec![point(1), point(2), path(10), path(11), group(20)],
    );

    let mut request = IdSelection::new();
    request.insert(EntityKind::Point, 2);
    request.insert(EntityKind::Path, 10);
    request.insert(EntityKind::Group, 20);

    let got = source.scan_by_ids(&request).unwrap();
    let keys: BTreeSet<_> = got.iter().map(|e| (e.kind(), e.id())).collect();
    assert_eq!(
        keys,
        BTreeSet::from([
            (EntityKind::Point, 2),
            (EntityKind::Path, 10),
            (EntityKind::Group, 20),
        ])
    );
}

#[test]
fn ids_are_kind_scoped_not_global() {
    // Same numeric id exists as a point and as a path; only the requested
    // kind may match.
    let dir = tempdir().unwrap();
    let source = source_with(dir.path(), vec![point(7), path(7)]);

    let request = IdSelection::single(EntityKind::Path, 7);
    let got = source.scan_by_ids(&request).unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].kind(), EntityKind::Path);

    let request = IdSelection::single(EntityKind::Point, 7);
    let got = source.scan_by_ids(&request).unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].kind(), EntityKind::Point);
}

#[test]
fn unmatched_ids_of_a_passed_kind_never_match_later() {
    // The corpus has no point 5; once the scan reaches paths, the point set
    // can no longer be satisfied and the request comes back short.
    let dir = tempdir().unwrap();
    let source = source_with(dir.path(), vec![point(1), path(5), group(20)]);

    let mut request = IdSelection::new();
    request.insert(EntityKind::Point, 5);
    request.insert(EntityKind::Group, 20);

    let got = source.scan_by_ids(&request).unwrap();
    let keys: Vec<_> = got.iter().map(|e| (e.kind(), e.id())).collect();
    assert_eq!(keys, vec![(EntityKind::Group, 20)]);
}

#[test]
fn in_kind_id_order_is_irrelevant() {
    let dir = tempdir().unwrap();
    // Points deliberately unsorted by id within the kind block.
    let source = source_with(dir.path(), vec![point(3), point(1), point(2)]);

    let mut request = IdSelection::new();
    request.insert(EntityKind::Point, 1);
    request.insert(EntityKind::Point, 3);

    let got = source.scan_by_ids(&request).unwrap();
    let ids: BTreeSet<_> = got.iter().map(RawEntity::id).collect();
    assert_eq!(ids, BTreeSet::from([1, 3]));
}

#[test]
fn empty_request_does_not_even_open_the_corpus() {
    let source = FileSource::new("/definitely/not/a/real/corpus.cgr");
    let got = source.scan_by_ids(&IdSelection::new()).unwrap();
    assert!(got.is_empty());
}

#[test]
fn missing_corpus_is_source_not_found() {
    let source = FileSource::new("/definitely/not/a/real/corpus.cgr");
    let err = source
        .scan_by_ids(&IdSelection::single(EntityKind::Point, 1))
        .unwrap_err();
    assert!(matches!(err, CartographError::SourceNotFound(_)));
}

#[test]
fn writer_rejects_descending_kind_order() {
    let mut writer = CorpusWriter::new(Vec::new()).unwrap();
    writer.append(&group(20)).unwrap();
    let err = writer.append(&point(1)).unwrap_err();
    assert!(matches!(err, CartographError::InvalidArgument(_)));
}

#[test]
fn garbage_header_is_a_serialization_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("junk.cgr");
    std::fs::write(&path, b"PNG\x00not a corpus").unwrap();

    let err = FileSource::new(&path)
        .scan_matching(&|_| true)
        .unwrap_err();
    assert!(matches!(err, CartographError::Serialization(_)));
}

#[test]
fn stats_count_per_kind() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus.cgr");
    write_corpus(&corpus, vec![point(1), point(2), path(10), group(20)]).unwrap();

    let stats = corpus_stats(&corpus).unwrap();
    assert_eq!((stats.points, stats.paths, stats.groups), (2, 1, 1));
    assert_eq!(stats.total(), 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any corpus and any request, `scan_by_ids` returns exactly the
    /// requested ids that exist, each exactly once, regardless of in-kind
    /// order.
    #[test]
    fn scan_by_ids_returns_exactly_the_present_requested_ids(
        present_points in proptest::collection::btree_set(1u64..40, 0..12),
        present_paths in proptest::collection::btree_set(1u64..40, 0..12),
        present_groups in proptest::collection::btree_set(1u64..40, 0..12),
        requested_points in proptest::collection::btree_set(1u64..40, 0..12),
        requested_paths in proptest::collection::btree_set(1u64..40, 0..12),
        requested_groups in proptest::collection::btree_set(1u64..40, 0..12),
        seed in any::<u64>(),
    ) {
        let dir = tempdir().unwrap();

        // Shuffle ids within each kind block (cheap LCG keyed by `seed`).
        let shuffled = |ids: &BTreeSet<u64>| {
            let mut v: Vec<u64> = ids.iter().copied().collect();
            let mut state = seed | 1;
            for i in (1..v.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                v.swap(i, (state % (i as u64 + 1)) as usize);
            }
            v
        };

        let mut entities = Vec::new();
        entities.extend(shuffled(&present_points).into_iter().map(point));
        entities.extend(shuffled(&present_paths).into_iter().map(path));
        entities.extend(shuffled(&present_groups).into_iter().map(group));
        let source = source_with(dir.path(), entities);

        let mut request = IdSelection::new();
        for &id in &requested_points { request.insert(EntityKind::Point, id); }
        for &id in &requested_paths { request.insert(EntityKind::Path, id); }
        for &id in &requested_groups { request.insert(EntityKind::Group, id); }

        let got = source.scan_by_ids(&request).unwrap();

        let got_keys: Vec<_> = got.iter().map(|e| (e.kind(), e.id())).collect();
        let unique: BTreeSet<_> = got_keys.iter().copied().collect();
        prop_assert_eq!(got_keys.len(), unique.len(), "no id may match twice");

        let mut expected = BTreeSet::new();
        expected.extend(requested_points.intersection(&present_points).map(|&id| (EntityKind::Point, id)));
        expected.extend(requested_paths.intersection(&present_paths).map(|&id| (EntityKind::Path, id)));
        expected.extend(requested_groups.intersection(&present_groups).map(|&id| (EntityKind::Group, id)));
        prop_assert_eq!(unique, expected);
    }
}
