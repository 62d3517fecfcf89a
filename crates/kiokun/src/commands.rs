use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use kiokun_import::Registry;
use kiokun_index::{
    FlushError, IndexReader, IndexerError, OutputLayout, ShardedIndexer, StoreError, apply_limit,
    apply_mode,
};
use serde_json::json;
use tracing::{error, info};

use crate::config::Options;

/// Failed paths listed individually before the rest are summarised.
const MAX_REPORTED_FAILURES: usize = 20;

pub fn build(opts: &Options) -> Result<()> {
    let started = Instant::now();
    info!("reading dictionaries from {}", opts.dict_dir.display());
    info!(
        "writing {} output to {}_* (mode: {})",
        opts.codec,
        opts.out_dir.display(),
        opts.mode
    );

    let selection = opts.selection();
    let mut imported = Registry::with_defaults(&opts.dict_dir)
        .import(&selection, opts.load_mode)
        .context("importing dictionaries")?;
    apply_mode(&mut imported.by_kind, opts.mode);
    if let Some(limit) = opts.limit {
        apply_limit(&mut imported.by_kind, limit);
    }
    for kind in selection.kinds() {
        info!("{kind}: {} entries to index", imported.count(kind));
    }
    info!("{} IDS records available", imported.ids.len());
    let (entries, ids) = imported.into_entries();

    let indexer = ShardedIndexer::new(
        OutputLayout::new(&opts.out_dir),
        opts.codec.build(opts.zstd_level),
        Arc::new(ids),
        opts.indexer_config(),
    )?;
    indexer.process_entries(&entries);

    match indexer.finish() {
        Ok(stats) => {
            info!(
                "indexed {} entries into {} index files in {:.2}s",
                stats.overall().entries,
                stats.overall().index_files,
                started.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Err(IndexerError::Flush(FlushError::Partial { stats, failures })) => {
            report_failures(&failures);
            bail!(
                "{} writes failed ({} index files and {} entries written)",
                failures.len(),
                stats.overall().index_files,
                stats.overall().entries
            )
        }
        Err(IndexerError::Flush(FlushError::Spawn { source, failures })) => {
            report_failures(&failures);
            Err(anyhow::Error::new(source).context("index writers could not be started"))
        }
        Err(err) => Err(err.into()),
    }
}

fn report_failures(failures: &[StoreError]) {
    for failure in failures.iter().take(MAX_REPORTED_FAILURES) {
        error!("{failure}");
    }
    if failures.len() > MAX_REPORTED_FAILURES {
        error!("... and {} more", failures.len() - MAX_REPORTED_FAILURES);
    }
}

/// Print the postings for `term` merged across shards as JSON, optionally
/// with the bodies. Each body is read from the shard its posting came from.
pub fn lookup(opts: &Options, term: &str, bodies: bool) -> Result<()> {
    let reader = IndexReader::new(
        OutputLayout::new(&opts.out_dir),
        opts.codec.build(opts.zstd_level),
    );
    let postings = reader
        .lookup(term)
        .with_context(|| format!("looking up {term}"))?;
    if postings.is_empty() {
        info!("no entries for {term}");
    }

    let mut out = json!({ "key": term, "postings": postings.merged() });
    if bodies {
        let resolved = reader
            .resolve(term)
            .with_context(|| format!("resolving entries for {term}"))?;
        out["entries"] = resolved
            .into_iter()
            .map(|r| {
                json!({
                    "shard": r.shard.to_string(),
                    "kind": r.kind,
                    "match": r.match_kind,
                    "id": r.posting,
                    "body": r.body,
                })
            })
            .collect();
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
