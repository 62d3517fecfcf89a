use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kiokun_import::{LoadMode, Selection};
use kiokun_index::indexer::DEFAULT_BATCH_SIZE;
use kiokun_index::{CodecKind, DEFAULT_ZSTD_LEVEL, FlushConfig, IndexerConfig, OutputMode};
use kiokun_types::DictKind;

const DEFAULT_DICT_DIR: &str = "dictionaries";
const DEFAULT_OUT_DIR: &str = "output";
const QUEUE_DEPTH_PER_WRITER: usize = 256;

#[derive(Debug, Parser)]
#[command(name = "kiokun", version)]
#[command(about = "Build and query the sharded Kiokun dictionary index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub options: Options,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import every selected dictionary and write the sharded index (default).
    Build,
    /// Print the merged postings for a term.
    Lookup {
        term: String,
        /// Also print the entry bodies the postings point at.
        #[arg(long, default_value_t = false)]
        bodies: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct Options {
    /// Directory holding `<dictionary>/source/` inputs.
    #[arg(long, global = true, env = "KIOKUN_DICT_DIR", default_value = DEFAULT_DICT_DIR)]
    pub dict_dir: PathBuf,
    /// Base path of the output tree; shard suffixes are appended to it.
    #[arg(long, global = true, env = "KIOKUN_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,
    /// Entry processing threads (default: available parallelism).
    #[arg(long, global = true, env = "KIOKUN_WORKERS")]
    pub workers: Option<usize>,
    /// Index writer threads per shard (default: available parallelism).
    #[arg(long, global = true, env = "KIOKUN_WRITERS")]
    pub writers: Option<usize>,
    /// all, han-only, han-1char, han-2char, han-3plus or non-han.
    #[arg(long, global = true, default_value_t = OutputMode::All)]
    pub mode: OutputMode,
    /// Keep at most this many entries, split proportionally across dictionaries.
    #[arg(long, global = true)]
    pub limit: Option<usize>,
    /// Only import these dictionaries (jmdict, jmnedict, kanjidic, chinese_chars, chinese_words).
    #[arg(long, global = true, value_delimiter = ',', value_parser = parse_dict_kind)]
    pub only: Vec<DictKind>,
    /// zstd or json.
    #[arg(long, global = true, default_value = "zstd")]
    pub codec: CodecKind,
    #[arg(long, global = true, default_value_t = DEFAULT_ZSTD_LEVEL,
          value_parser = clap::value_parser!(i32).range(1..=22))]
    pub zstd_level: i32,
    /// mmap or owned.
    #[arg(long, global = true, env = "KIOKUN_LOAD_MODE", default_value = "mmap",
          value_parser = parse_load_mode)]
    pub load_mode: LoadMode,
    #[arg(long, global = true, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Only log warnings and errors.
    #[arg(long, global = true, default_value_t = false)]
    pub silent: bool,
}

impl Options {
    pub fn selection(&self) -> Selection {
        Selection::only(self.only.iter().copied())
    }

    pub fn indexer_config(&self) -> IndexerConfig {
        let mut config = IndexerConfig {
            batch_size: self.batch_size.max(1),
            ..IndexerConfig::default()
        };
        if let Some(workers) = self.workers.filter(|w| *w > 0) {
            config.workers = workers;
        }
        if let Some(writers) = self.writers.filter(|w| *w > 0) {
            config.flush = FlushConfig {
                writers,
                queue_depth: writers * QUEUE_DEPTH_PER_WRITER,
                ..FlushConfig::default()
            };
        }
        config
    }
}

impl Cli {
    /// The subcommand to run; `build` when none was given.
    pub fn action(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build)
    }
}

fn parse_dict_kind(raw: &str) -> Result<DictKind, String> {
    DictKind::from_source_name(raw).ok_or_else(|| {
        format!("unknown dictionary {raw}; expected jmdict, jmnedict, kanjidic, chinese_chars or chinese_words")
    })
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    LoadMode::parse(raw).ok_or_else(|| format!("unknown load mode {raw}; expected mmap or owned"))
}
