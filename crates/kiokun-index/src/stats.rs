use std::fmt;

use kiokun_types::{DictKind, ShardClass};
use tracing::info;

use crate::accumulator::ShardIndex;
use crate::postings::MatchKind;

/// Postings and file counts for one shard.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShardStats {
    /// Exact postings per dictionary, indexed by [`DictKind::index`].
    pub exact: [usize; 5],
    /// Contained postings per dictionary, indexed by [`DictKind::index`].
    pub contained: [usize; 5],
    pub keys: usize,
    pub index_files: usize,
    pub entries: usize,
}

impl ShardStats {
    pub fn postings(&self, kind: DictKind, match_kind: MatchKind) -> usize {
        match match_kind {
            MatchKind::Exact => self.exact[kind.index()],
            MatchKind::Contained => self.contained[kind.index()],
        }
    }

    pub fn total_exact(&self) -> usize {
        self.exact.iter().sum()
    }

    pub fn total_contained(&self) -> usize {
        self.contained.iter().sum()
    }

    fn add(&mut self, other: &ShardStats) {
        for i in 0..5 {
            self.exact[i] += other.exact[i];
            self.contained[i] += other.contained[i];
        }
        self.keys += other.keys;
        self.index_files += other.index_files;
        self.entries += other.entries;
    }
}

impl fmt::Display for ShardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} keys, {} index files, {} entries;", self.keys, self.index_files, self.entries)?;
        for kind in DictKind::ALL {
            write!(
                f,
                " {}={}/{}",
                kind.tag(),
                self.exact[kind.index()],
                self.contained[kind.index()]
            )?;
        }
        Ok(())
    }
}

/// Statistics of one indexing run, per shard and overall.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexStats {
    pub shards: [ShardStats; 4],
}

impl IndexStats {
    /// Count the postings of every shard map.
    pub fn from_shards(shards: &[ShardIndex; 4]) -> Self {
        let mut stats = IndexStats::default();
        for shard in ShardClass::ALL {
            let out = &mut stats.shards[shard.index()];
            let index = &shards[shard.index()];
            out.keys = index.len();
            for entry in index.values() {
                for (kind, ids) in &entry.exact {
                    out.exact[kind.index()] += ids.len();
                }
                for (kind, ids) in &entry.contained {
                    out.contained[kind.index()] += ids.len();
                }
            }
        }
        stats
    }

    pub fn shard(&self, shard: ShardClass) -> &ShardStats {
        &self.shards[shard.index()]
    }

    pub fn shard_mut(&mut self, shard: ShardClass) -> &mut ShardStats {
        &mut self.shards[shard.index()]
    }

    pub fn overall(&self) -> ShardStats {
        let mut total = ShardStats::default();
        for shard in &self.shards {
            total.add(shard);
        }
        total
    }

    pub fn log(&self) {
        for shard in ShardClass::ALL {
            let stats = self.shard(shard);
            if stats.keys == 0 && stats.entries == 0 {
                continue;
            }
            info!("shard {shard}: {stats}");
        }
        let overall = self.overall();
        info!("overall: {overall}");
        info!(
            "total exact postings: {}, contained postings: {}",
            overall.total_exact(),
            overall.total_contained()
        );
    }
}
