use std::io;
use std::sync::Arc;

use kiokun_types::{DictKind, ShardClass};
use serde_json::Value;
use tracing::warn;

use crate::codec::{Codec, read_file};
use crate::error::ReadError;
use crate::layout::OutputLayout;
use crate::postings::{IndexEntry, MatchKind};
use crate::shard::body_file_stem;

/// An entry body found through a lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEntry {
    pub shard: ShardClass,
    pub kind: DictKind,
    pub match_kind: MatchKind,
    pub posting: i64,
    pub body: Value,
}

/// Postings for one key, kept apart per shard.
///
/// A posting only identifies an entry together with the shard it was read
/// from: non-Han `028` and Han2 `28` are both posting 28.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShardedPostings {
    pub shards: Vec<(ShardClass, IndexEntry)>,
}

impl ShardedPostings {
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    pub fn get(&self, shard: ShardClass) -> Option<&IndexEntry> {
        self.shards
            .iter()
            .find(|(s, _)| *s == shard)
            .map(|(_, entry)| entry)
    }

    /// Every shard folded into one entry. Equal postings from different
    /// shards collapse, so this view is for display only.
    pub fn merged(&self) -> IndexEntry {
        let mut merged = IndexEntry::default();
        for (_, entry) in &self.shards {
            merged.merge(entry);
        }
        merged
    }
}

/// Read side of the output tree.
#[derive(Clone, Debug)]
pub struct IndexReader {
    layout: OutputLayout,
    codec: Arc<dyn Codec>,
}

impl IndexReader {
    pub fn new(layout: OutputLayout, codec: Arc<dyn Codec>) -> Self {
        Self { layout, codec }
    }

    /// Postings for `key` in one shard; `None` when the shard has no such key.
    pub fn postings(&self, shard: ShardClass, key: &str) -> Result<Option<IndexEntry>, ReadError> {
        let path = self.layout.index_path(shard, key, self.codec.extension());
        match read_file(self.codec.as_ref(), &path) {
            Ok(entry) => Ok(Some(entry)),
            Err(ReadError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Postings for `key` from every shard that has it.
    ///
    /// An entry's keys live in the entry's own shard, so the exact match of
    /// a kanji and the contained matches of the words using it are usually
    /// in different shards.
    pub fn lookup(&self, key: &str) -> Result<ShardedPostings, ReadError> {
        let mut found = ShardedPostings::default();
        for shard in ShardClass::ALL {
            if let Some(entry) = self.postings(shard, key)? {
                found.shards.push((shard, entry));
            }
        }
        Ok(found)
    }

    /// Body of the `kind` entry with `posting` in `shard`; `None` when absent.
    pub fn entry(
        &self,
        shard: ShardClass,
        kind: DictKind,
        posting: i64,
    ) -> Result<Option<Value>, ReadError> {
        let stem = body_file_stem(shard, posting);
        let path = self
            .layout
            .body_path(shard, kind, &stem, self.codec.extension());
        match read_file(self.codec.as_ref(), &path) {
            Ok(body) => Ok(Some(body)),
            Err(ReadError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every entry listed under `key`, exact matches first. Postings whose
    /// body is missing are logged and skipped.
    pub fn resolve(&self, key: &str) -> Result<Vec<ResolvedEntry>, ReadError> {
        let postings = self.lookup(key)?;
        let mut out = Vec::new();
        for match_kind in [MatchKind::Exact, MatchKind::Contained] {
            for (shard, entry) in &postings.shards {
                for (kind, ids) in entry.side(match_kind) {
                    for &posting in ids {
                        match self.entry(*shard, *kind, posting)? {
                            Some(body) => out.push(ResolvedEntry {
                                shard: *shard,
                                kind: *kind,
                                match_kind,
                                posting,
                                body,
                            }),
                            None => warn!("{key}: no {kind} body for posting {posting} in shard {shard}"),
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}
