use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::stats::IndexStats;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression failed: {0}")]
    Compression(#[from] io::Error),
}

/// A failed entry-body or index-file write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn path(&self) -> &Path {
        match self {
            StoreError::Encode { path, .. } | StoreError::Io { path, .. } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum FlushError {
    /// Writer threads could not be started. Shards after the failing one
    /// were not written; `failures` holds the writes that failed before it.
    #[error("failed to spawn writer thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
        failures: Vec<StoreError>,
    },
    /// Every job ran, but some writes failed.
    #[error("{} writes failed during flush", failures.len())]
    Partial {
        stats: Box<IndexStats>,
        failures: Vec<StoreError>,
    },
}

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Flush(#[from] FlushError),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}
