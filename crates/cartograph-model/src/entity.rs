//! Entity kinds and their raw (unlinked) forms.
//!
//! Paths reference points by id; groups reference points, paths and other
//! groups by id. References are plain ids here — linking them against loaded
//! entities is the resolver's job, and a reference to an id the corpus never
//! yields is expected data, not an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CartographError;

/// Entity id: 64-bit, positive, unique within its kind.
pub type EntityId = u64;

/// Key/value tags. May be empty; serialized forms omit empty maps.
pub type Tags = BTreeMap<String, String>;

/// The three entity kinds.
///
/// The derived order (`Point < Path < Group`) is load-bearing: corpus files
/// store entities in ascending kind order and the id-filtered fetch cursor
/// promotes through kinds in this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Point,
    Path,
    Group,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Point, EntityKind::Path, EntityKind::Group];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Point => "point",
            EntityKind::Path => "path",
            EntityKind::Group => "group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CartographError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(EntityKind::Point),
            "path" => Ok(EntityKind::Path),
            "group" => Ok(EntityKind::Group),
            other => Err(CartographError::UnknownMemberKind(other.to_string())),
        }
    }
}

/// A point: a coordinate with tags. Never references anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    pub lat: f64,
    pub lon: f64,
}

/// A path: an ordered sequence of point references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    pub point_ids: Vec<EntityId>,
}

/// One member reference inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub kind: EntityKind,
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
}

/// A group: an ordered sequence of member references. Groups may reference
/// other groups, and those references may form cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    pub members: Vec<MemberRef>,
}

/// A decoded primitive entity as yielded by a corpus source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEntity {
    Point(Point),
    Path(Path),
    Group(Group),
}

impl RawEntity {
    pub fn id(&self) -> EntityId {
        match self {
            RawEntity::Point(p) => p.id,
            RawEntity::Path(p) => p.id,
            RawEntity::Group(g) => g.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            RawEntity::Point(_) => EntityKind::Point,
            RawEntity::Path(_) => EntityKind::Path,
            RawEntity::Group(_) => EntityKind::Group,
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            RawEntity::Point(p) => &p.tags,
            RawEntity::Path(p) => &p.tags,
            RawEntity::Group(g) => &g.tags,
        }
    }

    /// Convenience tag lookup.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags().get(key).map(String::as_str)
    }
}

impl From<Point> for RawEntity {
    fn from(p: Point) -> Self {
        RawEntity::Point(p)
    }
}

impl From<Path> for RawEntity {
    fn from(p: Path) -> Self {
        RawEntity::Path(p)
    }
}

impl From<Group> for RawEntity {
    fn from(g: Group) -> Self {
        RawEntity::Group(g)
    }
}
