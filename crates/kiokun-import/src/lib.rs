//! Load the Kiokun source dictionaries into [`Entry`] values.
//!
//! Each source format has an [`Importer`] that maps raw JSON, JSONL or TSV
//! into the shared entry model. Importers are collected in an explicit
//! [`Registry`] built once at startup; nothing registers itself globally,
//! so the import order is exactly the registration order.
//!
//! Source files are read either memory-mapped or into owned buffers,
//! selected at runtime via [`LoadMode`].
//!
//! # Example
//! ```no_run
//! use kiokun_import::{LoadMode, Registry, Selection};
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = Registry::with_defaults("dictionaries");
//! let imported = registry.import(&Selection::all(), LoadMode::Mmap)?;
//! println!("{} entries, {} IDS records", imported.total(), imported.ids.len());
//! # Ok(()) }
//! ```

mod chinese;
mod ids;
mod jmdict;
mod jmnedict;
mod kanjidic;
mod registry;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kiokun_types::{DictKind, Entry};
use memmap2::Mmap;
use regex::Regex;

pub use chinese::{ChineseCharImporter, ChineseWordImporter};
pub use ids::{IdsImporter, IdsRecord, IdsTable};
pub use jmdict::JmdictImporter;
pub use jmnedict::JmnedictImporter;
pub use kanjidic::KanjidicImporter;
pub use registry::{ImportedEntries, Registry, Selection, SourceFile};

/// Strategy for reading source files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each source file.
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

pub(crate) enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Converts one source file into entries of a single dictionary kind.
pub trait Importer: Send + Sync {
    /// Registry name, also the directory under the dictionaries root.
    fn name(&self) -> &str;

    fn kind(&self) -> DictKind;

    /// Parse the raw bytes of `path`. The path is only used to pick between
    /// format variants (e.g. `.jsonl` vs `.json`) and for error messages.
    fn import(&self, path: &Path, bytes: &[u8]) -> Result<Vec<Entry>>;
}

/// Read `path` with `mode` and run it through `importer`.
pub fn import_file(importer: &dyn Importer, path: &Path, mode: LoadMode) -> Result<Vec<Entry>> {
    let buffer = load_file(path, mode)?;
    importer
        .import(path, buffer.as_slice())
        .with_context(|| format!("importing {} from {}", importer.name(), path.display()))
}

pub(crate) fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            // Empty files cannot be mapped on every platform.
            if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// Find the file in `dir` whose name matches `pattern`.
///
/// Candidates are sorted by name and the last one is taken, so the newest versioned release
/// (e.g. `jmdict-examples-eng-3.6.1.json`) wins over older ones.
pub fn find_dictionary_file(dir: &Path, pattern: &Regex) -> Result<PathBuf> {
    let mut matches = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if let Some(name) = name.to_str()
            && pattern.is_match(name)
        {
            matches.push(entry.path());
        }
    }
    matches.sort();
    matches.pop().with_context(|| {
        format!(
            "no file matching {} in {}",
            pattern.as_str(),
            dir.display()
        )
    })
}

pub(crate) fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}
