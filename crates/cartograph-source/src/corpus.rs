//! The `.cgr` framed corpus container.
//!
//! Layout: an 8-byte header (`CGRF` magic, u16 LE format version, 2 reserved
//! bytes), then one frame per entity: u32 LE payload length followed by the
//! bincode-encoded `RawEntity`. Entities appear in ascending kind order —
//! all points, then all paths, then all groups; the writer enforces this and
//! the id-filtered reader depends on it. Ids within a kind carry no order
//! guarantee.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path as StdPath, PathBuf};

use cartograph_model::{CartographError, EntityKind, RawEntity, Result};

use crate::request::IdSelection;
use crate::PrimitiveSource;

pub const CORPUS_MAGIC: [u8; 4] = *b"CGRF";
pub const CORPUS_VERSION: u16 = 1;

fn decode_err(what: &str, err: impl ToString) -> CartographError {
    CartographError::Serialization(format!("{what}: {}", err.to_string()))
}

// ============================================================================
// Writer
// ============================================================================

/// Streaming corpus writer. Frames must be appended in ascending kind order.
pub struct CorpusWriter<W: Write> {
    out: W,
    last_kind: Option<EntityKind>,
    frames: u64,
}

impl CorpusWriter<BufWriter<File>> {
    pub fn create(path: &StdPath) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CorpusWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(&CORPUS_MAGIC)?;
        out.write_all(&CORPUS_VERSION.to_le_bytes())?;
        out.write_all(&[0u8; 2])?;
        Ok(Self {
            out,
            last_kind: None,
            frames: 0,
        })
    }

    pub fn append(&mut self, entity: &RawEntity) -> Result<()> {
        let kind = entity.kind();
        if let Some(last) = self.last_kind {
            if kind < last {
                return Err(CartographError::InvalidArgument(format!(
                    "corpus entities must be appended in ascending kind order \
                     ({kind} after {last})"
                )));
            }
        }
        let payload =
            bincode::serialize(entity).map_err(|e| decode_err("corpus frame encode", e))?;
        let len = payload.len() as u32;
        self.out.write_all(&len.to_le_bytes())?;
        self.out.write_all(&payload)?;
        self.last_kind = Some(kind);
        self.frames += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<u64> {
        self.out.flush()?;
        Ok(self.frames)
    }
}

/// Write a corpus file from entities in any order (stable-sorted by kind).
pub fn write_corpus(path: &StdPath, mut entities: Vec<RawEntity>) -> Result<u64> {
    entities.sort_by_key(RawEntity::kind);
    let mut writer = CorpusWriter::create(path)?;
    for entity in &entities {
        writer.append(entity)?;
    }
    writer.finish()
}

// ============================================================================
// Reader
// ============================================================================

/// Streaming corpus reader.
pub struct CorpusReader<R: Read> {
    input: R,
}

impl CorpusReader<BufReader<File>> {
    /// Open a corpus file. An empty path is `InvalidArgument`; a nonexistent
    /// one is `SourceNotFound`.
    pub fn open(path: &StdPath) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(CartographError::InvalidArgument(
                "corpus path must not be empty".to_string(),
            ));
        }
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CartographError::SourceNotFound(path.display().to_string())
            } else {
                e.into()
            }
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> CorpusReader<R> {
    pub fn new(mut input: R) -> Result<Self> {
        let mut header = [0u8; 8];
        input
            .read_exact(&mut header)
            .map_err(|e| decode_err("corpus header read", e))?;
        if header[0..4] != CORPUS_MAGIC {
            return Err(CartographError::Serialization(
                "corpus header: bad magic".to_string(),
            ));
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != CORPUS_VERSION {
            return Err(CartographError::Serialization(format!(
                "corpus header: unsupported version {version}"
            )));
        }
        Ok(Self { input })
    }

    /// The next entity, or `None` at end of corpus.
    pub fn next_entity(&mut self) -> Result<Option<RawEntity>> {
        let mut len_bytes = [0u8; 4];
        match self.input.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_bytes) as usize;
        let mut payload = vec![0u8; len];
        self.input
            .read_exact(&mut payload)
            .map_err(|e| decode_err("corpus frame read", e))?;
        let entity: RawEntity =
            bincode::deserialize(&payload).map_err(|e| decode_err("corpus frame decode", e))?;
        Ok(Some(entity))
    }
}

impl<R: Read> Iterator for CorpusReader<R> {
    type Item = Result<RawEntity>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entity().transpose()
    }
}

/// Per-kind entity counts for a corpus file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub points: u64,
    pub paths: u64,
    pub groups: u64,
}

impl CorpusStats {
    pub fn total(&self) -> u64 {
        self.points + self.paths + self.groups
    }
}

/// Count entities per kind with one scan.
pub fn corpus_stats(path: &StdPath) -> Result<CorpusStats> {
    let mut reader = CorpusReader::open(path)?;
    let mut stats = CorpusStats::default();
    while let Some(entity) = reader.next_entity()? {
        match entity.kind() {
            EntityKind::Point => stats.points += 1,
            EntityKind::Path => stats.paths += 1,
            EntityKind::Group => stats.groups += 1,
        }
    }
    Ok(stats)
}

// ============================================================================
// FileSource
// ============================================================================

/// `PrimitiveSource` over a `.cgr` file. Opens the file per fetch; no handle
/// survives the call.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &StdPath {
        &self.path
    }
}

impl PrimitiveSource for FileSource {
    fn scan_matching(&self, predicate: &dyn Fn(&RawEntity) -> bool) -> Result<Vec<RawEntity>> {
        let mut reader = CorpusReader::open(&self.path)?;
        let mut out = Vec::new();
        while let Some(entity) = reader.next_entity()? {
            if predicate(&entity) {
                out.push(entity);
            }
        }
        Ok(out)
    }

    fn scan_by_ids(&self, request: &IdSelection) -> Result<Vec<RawEntity>> {
        let mut remaining = request.clone();
        let Some(mut cursor) = remaining.lowest_nonempty_kind() else {
            return Ok(Vec::new());
        };

        let mut reader = CorpusReader::open(&self.path)?;
        let mut out = Vec::new();
        while let Some(entity) = reader.next_entity()? {
            let kind = entity.kind();
            if kind < cursor {
                continue;
            }
            if kind > cursor {
                // Kind-sorted corpus: ids still pending below this kind can
                // no longer appear. Promote the cursor past them.
                match remaining.lowest_nonempty_kind_at_or_above(kind) {
                    Some(next) => cursor = next,
                    None => break,
                }
                if kind < cursor {
                    continue;
                }
            }
            if remaining.set_mut(cursor).remove(entity.id()) {
                out.push(entity);
                if remaining.set(cursor).is_empty() {
                    match remaining.lowest_nonempty_kind_at_or_above(cursor) {
                        Some(next) => cursor = next,
                        None => break,
                    }
                }
            }
        }
        Ok(out)
    }
}
