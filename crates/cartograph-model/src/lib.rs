//! Cartograph entity model
//!
//! The shared vocabulary of the workspace: the three map-data entity kinds
//! (points, paths, groups), the raw-entity form produced by corpus decoders,
//! the checkpoint snapshot shape, and the workspace error taxonomy.
//!
//! Everything here is plain data. Resolution and assembly live in
//! `cartograph-resolve`; corpus decoding lives in `cartograph-source`.

pub mod entity;
pub mod error;
pub mod label;
pub mod snapshot;

pub use entity::{EntityId, EntityKind, Group, MemberRef, Path, Point, RawEntity, Tags};
pub use error::{CartographError, Result};
pub use snapshot::GraphSnapshot;
