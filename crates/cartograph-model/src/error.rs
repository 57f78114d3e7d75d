//! Workspace error taxonomy.
//!
//! Unresolved references are deliberately absent here: a path or group
//! pointing at an id the corpus does not contain is recorded in missing-id
//! lists and brokenness flags, never raised as an error.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum CartographError {
    /// A required parameter was null/empty. Fails fast, never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The corpus file does not exist and no checkpoint covers the request.
    #[error("source corpus not found: {0}")]
    SourceNotFound(String),

    /// A checkpoint exists but cannot be decoded into a valid value. Fatal;
    /// never treated as a cache miss.
    #[error("corrupt checkpoint '{name}': {reason}")]
    CorruptCheckpoint { name: String, reason: String },

    /// A group member declared a kind outside point/path/group.
    #[error("unknown member kind '{0}'")]
    UnknownMemberKind(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("(de)serialization error: {0}")]
    Serialization(String),
}

impl CartographError {
    pub fn corrupt_checkpoint(name: impl Into<String>, reason: impl ToString) -> Self {
        CartographError::CorruptCheckpoint {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<io::Error> for CartographError {
    fn from(src: io::Error) -> Self {
        CartographError::Io(format!("{} ({:?})", src, src.kind()))
    }
}

pub type Result<T> = std::result::Result<T, CartographError>;
