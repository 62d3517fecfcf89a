//! Flush accumulated postings to one file per key.
//!
//! Each shard is drained by a fixed pool of writer threads pulling
//! `(key, postings)` jobs from a bounded channel, while a ticker thread
//! reports progress. Failed writes are collected rather than aborting the
//! drain.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use kiokun_types::ShardClass;
use tracing::{info, warn};

use crate::accumulator::{IndexAccumulator, ShardIndex};
use crate::codec::{Codec, write_file};
use crate::error::{FlushError, StoreError};
use crate::layout::OutputLayout;
use crate::postings::IndexEntry;
use crate::stats::IndexStats;
use crate::store::EntryStore;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct FlushConfig {
    /// Writer threads per shard.
    pub writers: usize,
    /// Jobs buffered between the feeder and the writers.
    pub queue_depth: usize,
    pub progress_interval: Duration,
}

impl Default for FlushConfig {
    fn default() -> Self {
        let writers = thread::available_parallelism().map_or(4, |n| n.get());
        Self {
            writers,
            queue_depth: writers * 256,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

type Job = (String, IndexEntry);

/// Drain `accumulator` to disk and return the run statistics.
///
/// Entry bodies were already written through `store`; its counts are folded
/// into the returned statistics. When any index file fails to write, the
/// remaining files are still written and [`FlushError::Partial`] carries the
/// statistics together with every failure.
pub fn flush(
    accumulator: &IndexAccumulator,
    store: &EntryStore,
    config: &FlushConfig,
) -> Result<IndexStats, FlushError> {
    let shards = accumulator.take_shards();
    let mut stats = IndexStats::from_shards(&shards);
    let mut failures = Vec::new();

    for (shard, index) in ShardClass::ALL.into_iter().zip(shards) {
        let outcome =
            match flush_shard(shard, index, store.layout(), store.codec().as_ref(), config) {
                Ok(outcome) => outcome,
                Err(source) => return Err(FlushError::Spawn { source, failures }),
            };
        let shard_stats = stats.shard_mut(shard);
        shard_stats.index_files = outcome.written;
        shard_stats.entries = store.written_in(shard);
        failures.extend(outcome.failures);
    }

    stats.log();
    if failures.is_empty() {
        Ok(stats)
    } else {
        warn!("{} index files failed to write", failures.len());
        Err(FlushError::Partial {
            stats: Box::new(stats),
            failures,
        })
    }
}

struct ShardOutcome {
    written: usize,
    failures: Vec<StoreError>,
}

fn flush_shard(
    shard: ShardClass,
    index: ShardIndex,
    layout: &OutputLayout,
    codec: &dyn Codec,
    config: &FlushConfig,
) -> Result<ShardOutcome, io::Error> {
    let total = index.len();
    if total == 0 {
        return Ok(ShardOutcome {
            written: 0,
            failures: Vec::new(),
        });
    }

    let writers = config.writers.max(1);
    info!("shard {shard}: writing {total} index files with {writers} writers");
    let started = Instant::now();

    let (tx, rx) = mpsc::sync_channel::<Job>(config.queue_depth.max(1));
    let rx = Mutex::new(rx);
    let done = AtomicUsize::new(0);
    let finished = AtomicBool::new(false);
    let failures = Mutex::new(Vec::new());

    let spawn_result = thread::scope(|s| {
        let ticker = s.spawn(|| {
            loop {
                thread::park_timeout(config.progress_interval);
                if finished.load(Ordering::Acquire) {
                    break;
                }
                let n = done.load(Ordering::Relaxed);
                info!(
                    "shard {shard}: {n}/{total} index files ({:.1}s)",
                    started.elapsed().as_secs_f64()
                );
            }
        });

        let mut handles = Vec::with_capacity(writers);
        let mut spawn_error = None;
        for i in 0..writers {
            let spawned = thread::Builder::new()
                .name(format!("index-writer-{i}"))
                .spawn_scoped(s, || write_jobs(shard, &rx, layout, codec, &done, &failures));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        if spawn_error.is_none() {
            for job in index {
                if tx.send(job).is_err() {
                    break;
                }
            }
        }
        drop(tx);

        let mut panic = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                panic.get_or_insert(payload);
            }
        }
        // The ticker has to stop before a writer panic is re-raised or the scope never ends.
        finished.store(true, Ordering::Release);
        ticker.thread().unpark();
        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }
        spawn_error
    });

    if let Some(err) = spawn_result {
        return Err(err);
    }

    let written = done.into_inner();
    let failures = failures
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    info!(
        "shard {shard}: wrote {written}/{total} index files in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(ShardOutcome { written, failures })
}

fn write_jobs(
    shard: ShardClass,
    rx: &Mutex<Receiver<Job>>,
    layout: &OutputLayout,
    codec: &dyn Codec,
    done: &AtomicUsize,
    failures: &Mutex<Vec<StoreError>>,
) {
    loop {
        let job = rx.lock().unwrap_or_else(PoisonError::into_inner).recv();
        let Ok((key, mut entry)) = job else {
            break;
        };
        entry.optimize();
        if entry.is_empty() {
            continue;
        }
        let path = layout.index_path(shard, &key, codec.extension());
        match write_file(codec, &path, &entry) {
            Ok(()) => {
                done.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                warn!("{err}");
                failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(err);
            }
        }
    }
}
