use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use kiokun_types::{DictKind, ShardClass};

use crate::postings::{IndexEntry, MatchKind};

/// Key → postings map of one shard.
pub type ShardIndex = HashMap<String, IndexEntry>;

/// In-memory postings for all four shards.
///
/// A single mutex guards every shard: each insert is a short map lookup and
/// a scan of one small postings list.
#[derive(Debug, Default)]
pub struct IndexAccumulator {
    shards: Mutex<[ShardIndex; 4]>,
}

impl IndexAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, [ShardIndex; 4]> {
        self.shards.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `id` under `key` in `shard`. Returns `false` if it was already there.
    pub fn insert(
        &self,
        shard: ShardClass,
        key: &str,
        dict: DictKind,
        id: i64,
        kind: MatchKind,
    ) -> bool {
        let mut shards = self.lock();
        let index = &mut shards[shard.index()];
        match index.get_mut(key) {
            Some(entry) => entry.add(dict, id, kind),
            None => {
                let mut entry = IndexEntry::default();
                entry.add(dict, id, kind);
                index.insert(key.to_string(), entry);
                true
            }
        }
    }

    /// Record all keys of one entry under a single lock acquisition.
    pub fn insert_keys(
        &self,
        shard: ShardClass,
        exact: &[String],
        contained: &[String],
        dict: DictKind,
        id: i64,
    ) -> usize {
        let mut shards = self.lock();
        let index = &mut shards[shard.index()];
        let mut added = 0;
        let keyed = exact
            .iter()
            .map(|k| (k, MatchKind::Exact))
            .chain(contained.iter().map(|k| (k, MatchKind::Contained)));
        for (key, kind) in keyed {
            if index.entry(key.clone()).or_default().add(dict, id, kind) {
                added += 1;
            }
        }
        added
    }

    /// Snapshot of the postings for `key` in `shard`.
    pub fn get(&self, shard: ShardClass, key: &str) -> Option<IndexEntry> {
        self.lock()[shard.index()].get(key).cloned()
    }

    /// Number of distinct keys across all shards.
    pub fn len(&self) -> usize {
        self.lock().iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shard_len(&self, shard: ShardClass) -> usize {
        self.lock()[shard.index()].len()
    }

    /// Take the accumulated maps, leaving the accumulator empty.
    pub fn take_shards(&self) -> [ShardIndex; 4] {
        std::mem::take(&mut *self.lock())
    }

    pub fn into_shards(self) -> [ShardIndex; 4] {
        self.shards
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
