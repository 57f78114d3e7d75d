//! Report shapes for `extract` output.
//!
//! The JSON report mirrors the resolver's result: complete roots per kind,
//! broken root paths/groups, sorted missing-id lists. Labels come from the
//! tag utility; filtering unlabeled roots is a report option, never resolver
//! behavior.

use serde::Serialize;

use cartograph_model::label::display_label;
use cartograph_model::EntityId;
use cartograph_resolve::{GroupView, PathView, ResolvedGraph};

#[derive(Debug, Serialize)]
pub struct Report {
    pub selection: String,
    pub points: Vec<PointEntry>,
    pub paths: Vec<ContainerEntry>,
    pub groups: Vec<ContainerEntry>,
    pub broken_paths: Vec<ContainerEntry>,
    pub broken_groups: Vec<ContainerEntry>,
    pub missing_point_ids: Vec<EntityId>,
    pub missing_path_ids: Vec<EntityId>,
    pub missing_group_ids: Vec<EntityId>,
}

#[derive(Debug, Serialize)]
pub struct PointEntry {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct ContainerEntry {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Declared outgoing references.
    pub refs: usize,
    /// References that resolved against the loaded graph.
    pub resolved: usize,
}

fn path_entry(view: &PathView<'_>) -> ContainerEntry {
    ContainerEntry {
        id: view.id(),
        label: display_label(&view.raw().tags).map(str::to_string),
        refs: view.raw().point_ids.len(),
        resolved: view.resolved_points().len(),
    }
}

fn group_entry(view: &GroupView<'_>) -> ContainerEntry {
    ContainerEntry {
        id: view.id(),
        label: display_label(&view.raw().tags).map(str::to_string),
        refs: view.raw().members.len(),
        resolved: view.members().len(),
    }
}

impl Report {
    /// Build a report from a resolved graph. With `labeled_only`, roots
    /// without a derivable display label are left out (the caller-side
    /// "interesting" filter).
    pub fn from_graph(selection: &str, graph: &ResolvedGraph, labeled_only: bool) -> Self {
        let keep_point = |p: &&cartograph_model::Point| !labeled_only || display_label(&p.tags).is_some();
        let keep = |entry: &ContainerEntry| !labeled_only || entry.label.is_some();

        Report {
            selection: selection.to_string(),
            points: graph
                .root_points()
                .filter(keep_point)
                .map(|p| PointEntry {
                    id: p.id,
                    label: display_label(&p.tags).map(str::to_string),
                    lat: p.lat,
                    lon: p.lon,
                })
                .collect(),
            paths: graph
                .complete_root_paths()
                .iter()
                .map(path_entry)
                .filter(keep)
                .collect(),
            groups: graph
                .complete_root_groups()
                .iter()
                .map(group_entry)
                .filter(keep)
                .collect(),
            broken_paths: graph
                .broken_root_paths()
                .iter()
                .map(path_entry)
                .filter(keep)
                .collect(),
            broken_groups: graph
                .broken_root_groups()
                .iter()
                .map(group_entry)
                .filter(keep)
                .collect(),
            missing_point_ids: graph.missing_point_ids(),
            missing_path_ids: graph.missing_path_ids(),
            missing_group_ids: graph.missing_group_ids(),
        }
    }

    pub fn total_roots(&self) -> usize {
        self.points.len()
            + self.paths.len()
            + self.groups.len()
            + self.broken_paths.len()
            + self.broken_groups.len()
    }

    pub fn total_missing(&self) -> usize {
        self.missing_point_ids.len() + self.missing_path_ids.len() + self.missing_group_ids.len()
    }
}
