//! Checkpoint snapshot shape.
//!
//! `GraphSnapshot` is the flat, serialization-friendly form of resolver
//! state: one list per kind plus the per-kind missing-id lists. Per-pass
//! checkpoints store just the fetched entities (missing lists empty, omitted
//! on the wire); the final merged checkpoint stores everything.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Group, Path, Point, RawEntity};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_point_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_path_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_group_ids: Vec<EntityId>,
}

impl GraphSnapshot {
    /// A snapshot of fetched entities only (per-pass checkpoint form).
    pub fn from_entities(entities: impl IntoIterator<Item = RawEntity>) -> Self {
        let mut snap = GraphSnapshot::default();
        for entity in entities {
            match entity {
                RawEntity::Point(p) => snap.points.push(p),
                RawEntity::Path(p) => snap.paths.push(p),
                RawEntity::Group(g) => snap.groups.push(g),
            }
        }
        snap
    }

    /// All entities, in ascending kind order.
    pub fn into_entities(self) -> Vec<RawEntity> {
        let mut out = Vec::with_capacity(self.points.len() + self.paths.len() + self.groups.len());
        out.extend(self.points.into_iter().map(RawEntity::Point));
        out.extend(self.paths.into_iter().map(RawEntity::Path));
        out.extend(self.groups.into_iter().map(RawEntity::Group));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.paths.is_empty() && self.groups.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.points.len() + self.paths.len() + self.groups.len()
    }
}
