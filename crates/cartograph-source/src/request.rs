//! Per-kind id request sets.

use cartograph_model::{EntityId, EntityKind};
use roaring::RoaringTreemap;

/// One id set per entity kind. Ids are 64-bit, hence treemaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdSelection {
    pub points: RoaringTreemap,
    pub paths: RoaringTreemap,
    pub groups: RoaringTreemap,
}

impl IdSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection holding a single id of the given kind.
    pub fn single(kind: EntityKind, id: EntityId) -> Self {
        let mut sel = Self::default();
        sel.insert(kind, id);
        sel
    }

    pub fn set(&self, kind: EntityKind) -> &RoaringTreemap {
        match kind {
            EntityKind::Point => &self.points,
            EntityKind::Path => &self.paths,
            EntityKind::Group => &self.groups,
        }
    }

    pub fn set_mut(&mut self, kind: EntityKind) -> &mut RoaringTreemap {
        match kind {
            EntityKind::Point => &mut self.points,
            EntityKind::Path => &mut self.paths,
            EntityKind::Group => &mut self.groups,
        }
    }

    pub fn insert(&mut self, kind: EntityKind, id: EntityId) {
        self.set_mut(kind).insert(id);
    }

    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.set(kind).contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.paths.is_empty() && self.groups.is_empty()
    }

    /// Total requested ids across kinds.
    pub fn len(&self) -> u64 {
        self.points.len() + self.paths.len() + self.groups.len()
    }

    /// The lowest kind with ids remaining, at or above `floor`.
    pub fn lowest_nonempty_kind_at_or_above(&self, floor: EntityKind) -> Option<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| *kind >= floor)
            .find(|kind| !self.set(*kind).is_empty())
    }

    /// The lowest kind with ids remaining.
    pub fn lowest_nonempty_kind(&self) -> Option<EntityKind> {
        self.lowest_nonempty_kind_at_or_above(EntityKind::Point)
    }
}
