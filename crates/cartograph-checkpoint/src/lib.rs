//! Keyed checkpoint persistence.
//!
//! The resolver checkpoints raw pass results and final merged snapshots so a
//! multi-pass resolution can resume without re-scanning the corpus. This
//! crate provides the store abstraction and two implementations:
//!
//! - `DirStore`: one CBOR file per key in a directory, written atomically
//!   (tmp sibling + rename) so a crash mid-write never leaves a readable but
//!   corrupt entry.
//! - `MemoryStore`: a mutex-guarded map of encoded values, for tests and
//!   embedding.
//!
//! Every stored value travels in a versioned, timestamped envelope. A key
//! that exists but fails to decode — wrong version included — is a fatal
//! `CorruptCheckpoint`, never a cache miss: silently refetching would mask
//! data loss.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use cartograph_model::{CartographError, Result};

pub const CHECKPOINT_VERSION_V1: &str = "cartograph_checkpoint_v1";

/// Keyed persistence of checkpoint values.
///
/// `put` overwrites any prior value for the key. `get` distinguishes absence
/// (`Ok(None)`) from corruption (`Err`).
pub trait CheckpointStore {
    fn has(&self, name: &str) -> bool;
    fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>>;
    fn put<T: Serialize>(&self, name: &str, value: &T) -> Result<()>;
    fn delete(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: String,
    created_at: DateTime<Utc>,
    payload: T,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = Envelope {
        version: CHECKPOINT_VERSION_V1.to_string(),
        created_at: Utc::now(),
        payload: value,
    };
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&envelope, &mut buf)
        .map_err(|e| CartographError::Serialization(format!("checkpoint encode: {e}")))?;
    Ok(buf)
}

fn decode<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T> {
    let envelope: Envelope<T> = ciborium::de::from_reader(bytes)
        .map_err(|e| CartographError::corrupt_checkpoint(name, e))?;
    if envelope.version != CHECKPOINT_VERSION_V1 {
        return Err(CartographError::corrupt_checkpoint(
            name,
            format!("unsupported envelope version '{}'", envelope.version),
        ));
    }
    Ok(envelope.payload)
}

/// Map a checkpoint name to a filesystem-safe key.
pub fn sanitize_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Directory-backed store
// ============================================================================

/// One CBOR file per key inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a checkpoint directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.cbor", sanitize_key(name)))
    }

    /// The (sanitized) keys currently present, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(".cbor") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl CheckpointStore for DirStore {
    fn has(&self, name: &str) -> bool {
        self.file_for(name).exists()
    }

    fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.file_for(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(name, &bytes).map(Some)
    }

    fn put<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = encode(value)?;
        let path = self.file_for(name);
        let tmp = path.with_extension("cbor.tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.file_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Mutex-guarded map of encoded values. Same envelope semantics as
/// `DirStore`, so corrupt-entry behavior can be exercised in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an entry with raw bytes (test hook for corruption).
    pub fn put_raw(&self, name: &str, bytes: Vec<u8>) {
        self.entries.lock().insert(name.to_string(), bytes);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CheckpointStore for MemoryStore {
    fn has(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let entries = self.entries.lock();
        let Some(bytes) = entries.get(name) else {
            return Ok(None);
        };
        decode(name, bytes).map(Some)
    }

    fn put<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = encode(value)?;
        self.entries.lock().insert(name.to_string(), bytes);
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.entries.lock().remove(name);
        Ok(())
    }
}
