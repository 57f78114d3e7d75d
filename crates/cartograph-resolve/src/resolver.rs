//! The multi-pass closure resolver.
//!
//! Pass 0 seeds the flat maps (explicit ids or a predicate stream-filter);
//! every later pass fetches exactly the candidate ids the previous merge
//! exposed, until no candidates remain or the pass limit is hit. Each pass's
//! raw fetch result is checkpointed under a per-pass key *before* merging,
//! and consulted *before* fetching, so an interrupted resolution resumes at
//! the first pass without a checkpoint. A completed resolution writes one
//! final merged snapshot under the selection name, which short-circuits
//! subsequent calls entirely.
//!
//! Passes are strictly sequential: pass k's candidates are a pure function
//! of the state merged through pass k-1.

use cartograph_checkpoint::CheckpointStore;
use cartograph_model::{CartographError, GraphSnapshot, RawEntity, Result};
use cartograph_source::{IdSelection, PrimitiveSource};

use crate::flat::FlatMaps;

pub struct ClosureResolver<'a, S, C> {
    source: &'a S,
    store: &'a C,
    selection: String,
}

impl<'a, S: PrimitiveSource, C: CheckpointStore> ClosureResolver<'a, S, C> {
    pub fn new(source: &'a S, store: &'a C, selection_name: &str) -> Result<Self> {
        if selection_name.trim().is_empty() {
            return Err(CartographError::InvalidArgument(
                "selection name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            source,
            store,
            selection: selection_name.to_string(),
        })
    }

    pub fn selection_name(&self) -> &str {
        &self.selection
    }

    fn final_key(&self) -> String {
        self.selection.clone()
    }

    fn pass_key(&self, pass: u32) -> String {
        format!("{}.pass{:04}", self.selection, pass)
    }

    /// Resolve from an explicit per-kind id seed.
    pub fn resolve_ids(&self, seed: &IdSelection, pass_limit: u32) -> Result<FlatMaps> {
        if seed.is_empty() {
            return Err(CartographError::InvalidArgument(
                "seed selection must contain at least one id".to_string(),
            ));
        }
        if let Some(maps) = self.load_final()? {
            return Ok(maps);
        }

        let mut maps = FlatMaps::new();
        let fetched = self.fetch_ids_checkpointed(0, seed)?;
        maps.merge_entities(fetched);
        let unresolved = maps.unresolved_of(seed);
        maps.record_missing(&unresolved);

        self.expand(&mut maps, pass_limit)?;
        self.write_final(&maps)?;
        Ok(maps)
    }

    /// Resolve from a predicate applied to the full primitive stream.
    ///
    /// The predicate runs during pass 0 only, and only when pass 0 is not
    /// already checkpointed. A predicate seed cannot miss anything.
    pub fn resolve_matching(
        &self,
        predicate: &dyn Fn(&RawEntity) -> bool,
        pass_limit: u32,
    ) -> Result<FlatMaps> {
        if let Some(maps) = self.load_final()? {
            return Ok(maps);
        }

        let mut maps = FlatMaps::new();
        let key = self.pass_key(0);
        let fetched = match self.store.get::<GraphSnapshot>(&key)? {
            Some(snapshot) => {
                tracing::debug!(selection = %self.selection, pass = 0, "pass served from checkpoint");
                snapshot.into_entities()
            }
            None => {
                let fetched = self.source.scan_matching(predicate)?;
                self.store.put(&key, &GraphSnapshot::from_entities(fetched.clone()))?;
                fetched
            }
        };
        tracing::debug!(
            selection = %self.selection,
            pass = 0,
            merged = fetched.len(),
            "seed pass merged"
        );
        maps.merge_entities(fetched);

        self.expand(&mut maps, pass_limit)?;
        self.write_final(&maps)?;
        Ok(maps)
    }

    /// Run expansion passes 1.. until the candidate sets drain or the pass
    /// limit is reached. `pass_limit` 0 is unlimited; 1 skips expansion.
    fn expand(&self, maps: &mut FlatMaps, pass_limit: u32) -> Result<()> {
        let mut pass: u32 = 1;
        loop {
            if pass_limit != 0 && pass >= pass_limit {
                tracing::info!(selection = %self.selection, pass_limit, "pass limit reached");
                return Ok(());
            }
            let request = maps.candidates();
            if request.is_empty() {
                tracing::info!(
                    selection = %self.selection,
                    passes = pass,
                    entities = maps.entity_count(),
                    "closure complete"
                );
                return Ok(());
            }
            tracing::debug!(
                selection = %self.selection,
                pass,
                candidates = request.len(),
                "expanding references"
            );
            let fetched = self.fetch_ids_checkpointed(pass, &request)?;
            maps.merge_entities(fetched);
            let unresolved = maps.unresolved_of(&request);
            maps.record_missing(&unresolved);
            pass += 1;
        }
    }

    /// One pass's id-filtered fetch: checkpoint-read before fetching,
    /// checkpoint-write before the caller merges.
    fn fetch_ids_checkpointed(&self, pass: u32, request: &IdSelection) -> Result<Vec<RawEntity>> {
        let key = self.pass_key(pass);
        if let Some(snapshot) = self.store.get::<GraphSnapshot>(&key)? {
            tracing::debug!(selection = %self.selection, pass, "pass served from checkpoint");
            return Ok(snapshot.into_entities());
        }
        let fetched = self.source.scan_by_ids(request)?;
        self.store.put(&key, &GraphSnapshot::from_entities(fetched.clone()))?;
        Ok(fetched)
    }

    fn load_final(&self) -> Result<Option<FlatMaps>> {
        match self.store.get::<GraphSnapshot>(&self.final_key())? {
            Some(snapshot) => {
                tracing::info!(
                    selection = %self.selection,
                    entities = snapshot.entity_count(),
                    "resolution served from final checkpoint"
                );
                Ok(Some(FlatMaps::from_snapshot(snapshot)))
            }
            None => Ok(None),
        }
    }

    fn write_final(&self, maps: &FlatMaps) -> Result<()> {
        self.store.put(&self.final_key(), &maps.to_snapshot())
    }
}
