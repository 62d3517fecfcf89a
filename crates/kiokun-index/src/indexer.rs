use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use kiokun_import::IdsTable;
use kiokun_types::Entry;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, warn};

use crate::accumulator::IndexAccumulator;
use crate::codec::Codec;
use crate::error::{FlushError, IndexerError, StoreError};
use crate::keys::keys_of;
use crate::layout::OutputLayout;
use crate::persist::{FlushConfig, flush};
use crate::shard::ShardedId;
use crate::stats::IndexStats;
use crate::store::EntryStore;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Clone, Debug)]
pub struct IndexerConfig {
    /// Threads processing entries.
    pub workers: usize,
    /// Entries handed to the pool at a time; progress is logged between batches.
    pub batch_size: usize,
    pub flush: FlushConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(4, |n| n.get()),
            batch_size: DEFAULT_BATCH_SIZE,
            flush: FlushConfig::default(),
        }
    }
}

/// Builds the sharded index for a stream of entries.
///
/// Keys go to the accumulator and bodies are written as entries arrive;
/// [`ShardedIndexer::finish`] flushes the postings and reports every
/// failed write.
pub struct ShardedIndexer {
    accumulator: IndexAccumulator,
    store: EntryStore,
    pool: ThreadPool,
    config: IndexerConfig,
    failures: Mutex<Vec<StoreError>>,
    processed: AtomicUsize,
}

impl ShardedIndexer {
    /// Create the output tree under `layout` and set up the worker pool.
    pub fn new(
        layout: OutputLayout,
        codec: Arc<dyn Codec>,
        ids: Arc<IdsTable>,
        config: IndexerConfig,
    ) -> Result<Self, IndexerError> {
        layout.create_all()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("indexer-{i}"))
            .build()?;
        Ok(Self {
            accumulator: IndexAccumulator::new(),
            store: EntryStore::new(layout, codec, ids),
            pool,
            config,
            failures: Mutex::new(Vec::new()),
            processed: AtomicUsize::new(0),
        })
    }

    /// Index one entry and write its body if this is the first time it is seen.
    pub fn process_entry(&self, entry: &Entry) -> Result<bool, StoreError> {
        let id = ShardedId::for_entry(entry);
        let keys = keys_of(entry);
        self.accumulator.insert_keys(
            id.shard(),
            &keys.exact,
            &keys.contained,
            entry.kind(),
            id.posting(),
        );
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.store.write_once(&id, entry)
    }

    /// Index `entries` on the worker pool. Body write failures are kept and
    /// reported by [`ShardedIndexer::finish`].
    pub fn process_entries(&self, entries: &[Entry]) {
        let total = entries.len();
        let batch_size = self.config.batch_size.max(1);
        let started = Instant::now();
        let mut done = 0usize;

        for (n, batch) in entries.chunks(batch_size).enumerate() {
            self.pool.install(|| {
                batch.par_iter().for_each(|entry| {
                    if let Err(err) = self.process_entry(entry) {
                        warn!("{err}");
                        self.failures
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(err);
                    }
                });
            });
            done += batch.len();
            if n % 10 == 0 || done == total {
                info!(
                    "processed {done}/{total} entries ({:.1}%)",
                    done as f64 * 100.0 / total as f64
                );
            }
        }

        let secs = started.elapsed().as_secs_f64();
        info!(
            "processed {total} entries in {secs:.2}s ({:.1} entries/s)",
            if secs > 0.0 { total as f64 / secs } else { 0.0 }
        );
    }

    pub fn accumulator(&self) -> &IndexAccumulator {
        &self.accumulator
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Write all index files. Body failures from processing are carried in
    /// whichever [`FlushError`] the flush ends with.
    pub fn finish(self) -> Result<IndexStats, IndexerError> {
        let failures = self
            .failures
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        info!(
            "flushing {} keys and {} entry bodies",
            self.accumulator.len(),
            self.store.written_count()
        );
        let flushed = flush(&self.accumulator, &self.store, &self.config.flush);
        Ok(with_body_failures(flushed, failures)?)
    }
}

/// Fold body write failures from processing into the flush result so no
/// error path drops them.
fn with_body_failures(
    flushed: Result<IndexStats, FlushError>,
    mut failures: Vec<StoreError>,
) -> Result<IndexStats, FlushError> {
    match flushed {
        Ok(stats) if failures.is_empty() => Ok(stats),
        Ok(stats) => Err(FlushError::Partial {
            stats: Box::new(stats),
            failures,
        }),
        Err(FlushError::Partial {
            stats,
            failures: index_failures,
        }) => {
            failures.extend(index_failures);
            Err(FlushError::Partial { stats, failures })
        }
        Err(FlushError::Spawn {
            source,
            failures: index_failures,
        }) => {
            failures.extend(index_failures);
            Err(FlushError::Spawn { source, failures })
        }
    }
}
