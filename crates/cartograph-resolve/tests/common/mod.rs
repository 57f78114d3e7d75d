#![allow(dead_code)]

use std::path::Path as StdPath;
use std::sync::atomic::{AtomicUsize, Ordering};

use cartograph_model::{
    EntityId, EntityKind, Group, MemberRef, Path, Point, RawEntity, Result, Tags,
};
use cartograph_source::{write_corpus, FileSource, IdSelection, PrimitiveSource};

pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn point(id: EntityId) -> RawEntity {
    RawEntity::Point(Point {
        id,
        tags: Tags::new(),
        lat: id as f64 * 0.01,
        lon: id as f64 * -0.01,
    })
}

pub fn point_tagged(id: EntityId, pairs: &[(&str, &str)]) -> RawEntity {
    RawEntity::Point(Point {
        id,
        tags: tags(pairs),
        lat: 0.0,
        lon: 0.0,
    })
}

pub fn path(id: EntityId, point_ids: &[EntityId]) -> RawEntity {
    RawEntity::Path(Path {
        id,
        tags: Tags::new(),
        point_ids: point_ids.to_vec(),
    })
}

pub fn member(kind: EntityKind, id: EntityId, role: &str) -> MemberRef {
    MemberRef {
        kind,
        id,
        role: role.to_string(),
    }
}

pub fn group(id: EntityId, members: Vec<MemberRef>) -> RawEntity {
    RawEntity::Group(Group {
        id,
        tags: Tags::new(),
        members,
    })
}

pub fn group_tagged(id: EntityId, pairs: &[(&str, &str)], members: Vec<MemberRef>) -> RawEntity {
    RawEntity::Group(Group {
        id,
        tags: tags(pairs),
        members,
    })
}

/// Write a corpus file under `dir` and return a source over it.
pub fn corpus_with(dir: &StdPath, entities: Vec<RawEntity>) -> FileSource {
    let path = dir.join("corpus.cgr");
    write_corpus(&path, entities).expect("write corpus");
    FileSource::new(path)
}

/// Counts corpus scans so tests can assert zero-scan properties.
pub struct CountingSource<S> {
    inner: S,
    scans: AtomicUsize,
}

impl<S> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            scans: AtomicUsize::new(0),
        }
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl<S: PrimitiveSource> PrimitiveSource for CountingSource<S> {
    fn scan_matching(&self, predicate: &dyn Fn(&RawEntity) -> bool) -> Result<Vec<RawEntity>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_matching(predicate)
    }

    fn scan_by_ids(&self, request: &IdSelection) -> Result<Vec<RawEntity>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_by_ids(request)
    }
}
