//! The assembled graph: an id-keyed arena plus borrowing views.
//!
//! The flat maps own every entity exactly once. `PathView`/`GroupView`
//! resolve references against the arena on access, so a point shared by a
//! hundred paths exists once, and cyclic group references cannot create
//! ownership cycles.

use roaring::RoaringTreemap;

use cartograph_model::{EntityId, EntityKind, Group, Path, Point};

use crate::flat::FlatMaps;

/// The result of assembly: arena, root partition, brokenness classification.
#[derive(Debug)]
pub struct ResolvedGraph {
    pub(crate) maps: FlatMaps,
    pub(crate) broken_paths: RoaringTreemap,
    pub(crate) broken_groups: RoaringTreemap,
    pub(crate) root_points: Vec<EntityId>,
    pub(crate) root_paths: Vec<EntityId>,
    pub(crate) root_groups: Vec<EntityId>,
}

impl ResolvedGraph {
    pub fn maps(&self) -> &FlatMaps {
        &self.maps
    }

    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.maps.contains(kind, id)
    }

    pub fn point(&self, id: EntityId) -> Option<&Point> {
        self.maps.points.get(&id)
    }

    pub fn path(&self, id: EntityId) -> Option<PathView<'_>> {
        self.maps.paths.get(&id).map(|path| PathView { path, graph: self })
    }

    pub fn group(&self, id: EntityId) -> Option<GroupView<'_>> {
        self.maps
            .groups
            .get(&id)
            .map(|group| GroupView { group, graph: self })
    }

    /// A path is broken iff it resolved fewer points than it references.
    pub fn is_path_broken(&self, id: EntityId) -> bool {
        self.broken_paths.contains(id)
    }

    /// A group is broken iff it resolved fewer members than it references,
    /// or any path/group member is itself broken (transitively).
    pub fn is_group_broken(&self, id: EntityId) -> bool {
        self.broken_groups.contains(id)
    }

    /// Root points (never referenced by a loaded path or group), ascending.
    /// Points are always complete.
    pub fn root_points(&self) -> impl Iterator<Item = &Point> {
        self.root_points.iter().filter_map(|id| self.maps.points.get(id))
    }

    /// Complete root paths, ascending by id.
    pub fn complete_root_paths(&self) -> Vec<PathView<'_>> {
        self.root_path_views(false)
    }

    /// Broken root paths, ascending by id.
    pub fn broken_root_paths(&self) -> Vec<PathView<'_>> {
        self.root_path_views(true)
    }

    /// Complete root groups, ascending by id.
    pub fn complete_root_groups(&self) -> Vec<GroupView<'_>> {
        self.root_group_views(false)
    }

    /// Broken root groups, ascending by id.
    pub fn broken_root_groups(&self) -> Vec<GroupView<'_>> {
        self.root_group_views(true)
    }

    pub fn missing_point_ids(&self) -> Vec<EntityId> {
        self.maps.missing_sorted(EntityKind::Point)
    }

    pub fn missing_path_ids(&self) -> Vec<EntityId> {
        self.maps.missing_sorted(EntityKind::Path)
    }

    pub fn missing_group_ids(&self) -> Vec<EntityId> {
        self.maps.missing_sorted(EntityKind::Group)
    }

    fn root_path_views(&self, broken: bool) -> Vec<PathView<'_>> {
        self.root_paths
            .iter()
            .filter(|id| self.broken_paths.contains(**id) == broken)
            .filter_map(|id| self.path(*id))
            .collect()
    }

    fn root_group_views(&self, broken: bool) -> Vec<GroupView<'_>> {
        self.root_groups
            .iter()
            .filter(|id| self.broken_groups.contains(**id) == broken)
            .filter_map(|id| self.group(*id))
            .collect()
    }
}

/// A path with its references resolved against the arena.
#[derive(Clone, Copy)]
pub struct PathView<'a> {
    path: &'a Path,
    graph: &'a ResolvedGraph,
}

impl<'a> PathView<'a> {
    pub fn id(&self) -> EntityId {
        self.path.id
    }

    pub fn raw(&self) -> &'a Path {
        self.path
    }

    /// The ordered points this path could resolve; unresolvable references
    /// are dropped, never erroring. Length ≤ `raw().point_ids.len()`,
    /// strictly less iff the path is broken.
    pub fn resolved_points(&self) -> Vec<&'a Point> {
        self.path
            .point_ids
            .iter()
            .filter_map(|id| self.graph.maps.points.get(id))
            .collect()
    }

    pub fn is_broken(&self) -> bool {
        self.graph.is_path_broken(self.path.id)
    }
}

/// A group with its members resolved against the arena.
#[derive(Clone, Copy)]
pub struct GroupView<'a> {
    group: &'a Group,
    graph: &'a ResolvedGraph,
}

impl<'a> GroupView<'a> {
    pub fn id(&self) -> EntityId {
        self.group.id
    }

    pub fn raw(&self) -> &'a Group {
        self.group
    }

    /// The ordered members this group could resolve; unresolvable references
    /// are dropped. Length ≤ `raw().members.len()`, strictly less iff at
    /// least one reference dangled.
    pub fn members(&self) -> Vec<ResolvedMember<'a>> {
        self.group
            .members
            .iter()
            .filter_map(|member| {
                let entity = match member.kind {
                    EntityKind::Point => {
                        MemberView::Point(self.graph.maps.points.get(&member.id)?)
                    }
                    EntityKind::Path => MemberView::Path(self.graph.path(member.id)?),
                    EntityKind::Group => MemberView::Group(self.graph.group(member.id)?),
                };
                Some(ResolvedMember {
                    role: member.role.as_str(),
                    entity,
                })
            })
            .collect()
    }

    pub fn is_broken(&self) -> bool {
        self.graph.is_group_broken(self.group.id)
    }
}

/// One resolved group member.
pub struct ResolvedMember<'a> {
    pub role: &'a str,
    pub entity: MemberView<'a>,
}

/// A resolved member entity, by kind.
pub enum MemberView<'a> {
    Point(&'a Point),
    Path(PathView<'a>),
    Group(GroupView<'a>),
}

impl MemberView<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            MemberView::Point(_) => EntityKind::Point,
            MemberView::Path(_) => EntityKind::Path,
            MemberView::Group(_) => EntityKind::Group,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            MemberView::Point(p) => p.id,
            MemberView::Path(p) => p.id(),
            MemberView::Group(g) => g.id(),
        }
    }
}
