//! Sharded inverted index over the Kiokun dictionaries.
//!
//! Every entry gets a shard from the script and length of its primary text,
//! a sharded id (shard digit + original id), and a set of lookup keys: its
//! own written forms as exact matches, and the single Han characters inside
//! them as contained matches. Postings accumulate in memory per shard and
//! are flushed to one file per key; entry bodies are written once each.
//!
//! Output layout for base directory `out`:
//!
//! ```text
//! out_non_han/  out_han_1char/  out_han_2char/  out_han_3plus/
//!     index/<key>.json.zst      {"e": {"j": [..]}, "c": {"d": [..]}}
//!     j/ n/ d/ c/ w/<sharded-id>.json.zst
//! ```
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use kiokun_import::IdsTable;
//! use kiokun_index::{IndexerConfig, OutputLayout, ShardedIndexer, ZstdJson};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let entries: Vec<kiokun_types::Entry> = Vec::new();
//! let indexer = ShardedIndexer::new(
//!     OutputLayout::new("output"),
//!     Arc::new(ZstdJson::default()),
//!     Arc::new(IdsTable::new()),
//!     IndexerConfig::default(),
//! )?;
//! indexer.process_entries(&entries);
//! let stats = indexer.finish()?;
//! println!("{} index files", stats.overall().index_files);
//! # Ok(()) }
//! ```

pub mod accumulator;
pub mod codec;
pub mod error;
pub mod filter;
pub mod indexer;
pub mod keys;
pub mod layout;
pub mod persist;
pub mod postings;
pub mod reader;
pub mod shard;
pub mod stats;
pub mod store;

pub use accumulator::IndexAccumulator;
pub use codec::{Codec, CodecKind, DEFAULT_ZSTD_LEVEL, PlainJson, ZstdJson};
pub use error::{CodecError, FlushError, IndexerError, ReadError, StoreError};
pub use filter::{OutputMode, apply_limit, apply_mode};
pub use indexer::{IndexerConfig, ShardedIndexer};
pub use keys::{LookupKeys, keys_of};
pub use layout::OutputLayout;
pub use persist::{FlushConfig, flush};
pub use postings::{IndexEntry, MatchKind};
pub use reader::{IndexReader, ResolvedEntry, ShardedPostings};
pub use shard::{ShardedId, body_file_stem, classify_text, shard_of};
pub use stats::{IndexStats, ShardStats};
pub use store::EntryStore;
