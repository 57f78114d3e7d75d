//! Primitive sources: the corpus-side boundary of cartograph.
//!
//! The resolver consumes this crate's `PrimitiveSource` trait and nothing
//! else; it never parses a corpus itself. Two fetch modes exist:
//!
//! - `scan_matching`: one full stream-filter with a caller predicate
//!   (pass-0 seeding by selection).
//! - `scan_by_ids`: one scan matching explicit per-kind id sets under the
//!   ascending-kind cursor contract — entries are kind-sorted in the corpus,
//!   ids within a kind are matched by set membership, and a kind below the
//!   cursor is never matched again. Cost is one scan per request, independent
//!   of how many ids are requested.
//!
//! `FileSource` implements the trait over the `.cgr` framed container
//! (`corpus` module). The corpus file is opened per fetch and closed before
//! the call returns; no handles survive across resolver passes.

pub mod corpus;
pub mod request;

pub use corpus::{write_corpus, CorpusReader, CorpusStats, CorpusWriter, FileSource};
pub use request::IdSelection;

use cartograph_model::{RawEntity, Result};

/// A streaming decoder over some corpus representation.
pub trait PrimitiveSource {
    /// Scan the whole corpus once, yielding entities the predicate accepts.
    fn scan_matching(&self, predicate: &dyn Fn(&RawEntity) -> bool) -> Result<Vec<RawEntity>>;

    /// Scan the corpus once, yielding exactly the requested ids that exist,
    /// each at most once, honoring the ascending-kind cursor contract.
    fn scan_by_ids(&self, request: &IdSelection) -> Result<Vec<RawEntity>>;
}
