//! Reference-closure resolution and graph assembly.
//!
//! Given a seed selection — explicit ids or a predicate over the primitive
//! stream — this crate expands the seed into its full transitive reference
//! closure across bounded passes, checkpointing each pass's raw fetch so the
//! whole resolution is resumable and idempotent, then assembles the flat
//! per-kind maps into a linked object graph and classifies every root entity
//! as complete or broken.
//!
//! One resolution per invocation; working state is discarded afterwards
//! except for checkpoints. See `resolver` for the pass loop, `assemble` for
//! root/brokenness classification, `graph` for the arena-and-views result
//! form.

pub mod assemble;
pub mod flat;
pub mod graph;
pub mod resolver;

pub use assemble::assemble;
pub use flat::FlatMaps;
pub use graph::{GroupView, MemberView, PathView, ResolvedGraph, ResolvedMember};
pub use resolver::ClosureResolver;

use cartograph_checkpoint::CheckpointStore;
use cartograph_model::{EntityId, EntityKind, RawEntity, Result};
use cartograph_source::{IdSelection, PrimitiveSource};

/// Resolve the closure of a single root id.
///
/// The bool reports whether the seed id itself was found; the entity is
/// reachable through [`ResolvedGraph::point`]/[`ResolvedGraph::path`]/
/// [`ResolvedGraph::group`]. `pass_limit` of 0 means unlimited; 1 skips all
/// nested expansion.
pub fn resolve_root<S: PrimitiveSource, C: CheckpointStore>(
    source: &S,
    store: &C,
    selection_name: &str,
    kind: EntityKind,
    id: EntityId,
    pass_limit: u32,
) -> Result<(ResolvedGraph, bool)> {
    let resolver = ClosureResolver::new(source, store, selection_name)?;
    let maps = resolver.resolve_ids(&IdSelection::single(kind, id), pass_limit)?;
    let found = maps.contains(kind, id);
    Ok((assemble(maps), found))
}

/// Resolve the closure of every entity the predicate accepts.
///
/// The predicate runs once against the full corpus during pass 0 only;
/// later passes fetch by id.
pub fn resolve_selection<S: PrimitiveSource, C: CheckpointStore>(
    source: &S,
    store: &C,
    selection_name: &str,
    predicate: &dyn Fn(&RawEntity) -> bool,
    pass_limit: u32,
) -> Result<ResolvedGraph> {
    let resolver = ClosureResolver::new(source, store, selection_name)?;
    let maps = resolver.resolve_matching(predicate, pass_limit)?;
    Ok(assemble(maps))
}
