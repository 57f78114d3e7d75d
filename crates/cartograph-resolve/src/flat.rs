//! Flat per-kind entity maps: the single owners of all loaded entity data.
//!
//! Resolved containers never copy entities; they look ids up here. The maps
//! double as the resolver's working state (loaded/missing id sets, candidate
//! computation) and as the assembled graph's arena.

use ahash::AHashMap;

use cartograph_model::{EntityId, EntityKind, Group, GraphSnapshot, Path, Point, RawEntity};
use cartograph_source::IdSelection;

#[derive(Debug, Default)]
pub struct FlatMaps {
    pub points: AHashMap<EntityId, Point>,
    pub paths: AHashMap<EntityId, Path>,
    pub groups: AHashMap<EntityId, Group>,
    loaded: IdSelection,
    missing: IdSelection,
}

impl FlatMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a pass's fetched entities. Re-merging the same entity (resume
    /// replays) overwrites in place and is harmless.
    pub fn merge_entities(&mut self, entities: Vec<RawEntity>) {
        for entity in entities {
            let (kind, id) = (entity.kind(), entity.id());
            match entity {
                RawEntity::Point(p) => {
                    self.points.insert(id, p);
                }
                RawEntity::Path(p) => {
                    self.paths.insert(id, p);
                }
                RawEntity::Group(g) => {
                    self.groups.insert(id, g);
                }
            }
            self.loaded.insert(kind, id);
        }
    }

    /// Record requested ids that no pass could resolve. Missing sets only
    /// ever grow.
    pub fn record_missing(&mut self, unresolved: &IdSelection) {
        self.missing.points |= &unresolved.points;
        self.missing.paths |= &unresolved.paths;
        self.missing.groups |= &unresolved.groups;
    }

    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.loaded.contains(kind, id)
    }

    pub fn loaded(&self) -> &IdSelection {
        &self.loaded
    }

    pub fn missing(&self) -> &IdSelection {
        &self.missing
    }

    pub fn entity_count(&self) -> usize {
        self.points.len() + self.paths.len() + self.groups.len()
    }

    /// Ids a request failed to resolve: the requested set minus everything
    /// now loaded.
    pub fn unresolved_of(&self, request: &IdSelection) -> IdSelection {
        let mut unresolved = request.clone();
        unresolved.points -= &self.loaded.points;
        unresolved.paths -= &self.loaded.paths;
        unresolved.groups -= &self.loaded.groups;
        unresolved
    }

    /// The next pass's candidate ids: every reference of every loaded path
    /// and group, minus ids already loaded and ids already known missing.
    pub fn candidates(&self) -> IdSelection {
        let mut cand = IdSelection::new();
        for path in self.paths.values() {
            for &point_id in &path.point_ids {
                cand.points.insert(point_id);
            }
        }
        for group in self.groups.values() {
            for member in &group.members {
                cand.insert(member.kind, member.id);
            }
        }
        cand.points -= &self.loaded.points;
        cand.points -= &self.missing.points;
        cand.paths -= &self.loaded.paths;
        cand.paths -= &self.missing.paths;
        cand.groups -= &self.loaded.groups;
        cand.groups -= &self.missing.groups;
        cand
    }

    /// Missing ids of one kind, deduplicated and sorted ascending.
    pub fn missing_sorted(&self, kind: EntityKind) -> Vec<EntityId> {
        self.missing.set(kind).iter().collect()
    }

    /// The final merged checkpoint form.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut points: Vec<Point> = self.points.values().cloned().collect();
        let mut paths: Vec<Path> = self.paths.values().cloned().collect();
        let mut groups: Vec<Group> = self.groups.values().cloned().collect();
        points.sort_by_key(|p| p.id);
        paths.sort_by_key(|p| p.id);
        groups.sort_by_key(|g| g.id);
        GraphSnapshot {
            points,
            paths,
            groups,
            missing_point_ids: self.missing_sorted(EntityKind::Point),
            missing_path_ids: self.missing_sorted(EntityKind::Path),
            missing_group_ids: self.missing_sorted(EntityKind::Group),
        }
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut maps = FlatMaps::default();
        let mut missing = IdSelection::new();
        for &id in &snapshot.missing_point_ids {
            missing.insert(EntityKind::Point, id);
        }
        for &id in &snapshot.missing_path_ids {
            missing.insert(EntityKind::Path, id);
        }
        for &id in &snapshot.missing_group_ids {
            missing.insert(EntityKind::Group, id);
        }
        maps.merge_entities(snapshot.into_entities());
        maps.record_missing(&missing);
        maps
    }
}
