use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use kiokun_types::{DictKind, Entry};
use regex::Regex;
use tracing::info;

use crate::{
    ChineseCharImporter, ChineseWordImporter, IdsImporter, IdsTable, Importer, JmdictImporter,
    JmnedictImporter, KanjidicImporter, LoadMode, find_dictionary_file, import_file,
};

/// Where a registered source lives on disk.
#[derive(Clone, Debug)]
pub enum SourceFile {
    /// A fixed path.
    Path(PathBuf),
    /// The last file (by name) in `dir` matching `pattern`.
    Pattern { dir: PathBuf, pattern: String },
}

impl SourceFile {
    pub fn pattern(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        SourceFile::Pattern {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            SourceFile::Path(path) => Ok(path.clone()),
            SourceFile::Pattern { dir, pattern } => {
                let re = Regex::new(pattern)
                    .with_context(|| format!("invalid source pattern {pattern}"))?;
                find_dictionary_file(dir, &re)
            }
        }
    }
}

/// Which dictionaries a run should load.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    kinds: BTreeSet<DictKind>,
}

impl Selection {
    pub fn all() -> Self {
        Self {
            kinds: DictKind::ALL.into_iter().collect(),
        }
    }

    /// Restrict to `kinds`. An empty list selects everything.
    pub fn only(kinds: impl IntoIterator<Item = DictKind>) -> Self {
        let kinds: BTreeSet<_> = kinds.into_iter().collect();
        if kinds.is_empty() {
            Self::all()
        } else {
            Self { kinds }
        }
    }

    pub fn includes(&self, kind: DictKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// The IDS table only decorates kanji and Chinese character bodies.
    pub fn needs_ids(&self) -> bool {
        self.includes(DictKind::Kanji) || self.includes(DictKind::ChineseChar)
    }

    pub fn kinds(&self) -> impl Iterator<Item = DictKind> + '_ {
        self.kinds.iter().copied()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

/// Result of a registry import: entries grouped by dictionary plus the IDS table.
#[derive(Debug, Default)]
pub struct ImportedEntries {
    pub by_kind: BTreeMap<DictKind, Vec<Entry>>,
    pub ids: IdsTable,
}

impl ImportedEntries {
    pub fn total(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn count(&self, kind: DictKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// All entries in dictionary order (j, n, d, c, w), each in source order.
    pub fn into_entries(self) -> (Vec<Entry>, IdsTable) {
        let entries = self.by_kind.into_values().flatten().collect();
        (entries, self.ids)
    }
}

struct Registration {
    importer: Box<dyn Importer>,
    source: SourceFile,
}

/// Ordered set of importers. Built explicitly; there is no global registry.
#[derive(Default)]
pub struct Registry {
    importers: Vec<Registration>,
    ids: Option<SourceFile>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the five dictionaries and the IDS table under `dict_dir`,
    /// each resolved from `<dict_dir>/<name>/source/`.
    pub fn with_defaults(dict_dir: impl AsRef<Path>) -> Self {
        let root = dict_dir.as_ref();
        let source_dir = |name: &str| root.join(name).join("source");

        let mut registry = Self::new();
        registry
            .register(
                JmdictImporter,
                SourceFile::pattern(source_dir("jmdict"), r"^jmdict-examples-eng-.*\.json$"),
            )
            .register(
                JmnedictImporter,
                SourceFile::pattern(source_dir("jmnedict"), r"^jmnedict-all-.*\.json$"),
            )
            .register(
                KanjidicImporter,
                SourceFile::pattern(source_dir("kanjidic"), r"^kanjidic2-.*\.json$"),
            )
            .register(
                ChineseCharImporter,
                SourceFile::pattern(source_dir("chinese_chars"), r"^dictionary_char_.*\.json$"),
            )
            .register(
                ChineseWordImporter,
                SourceFile::pattern(source_dir("chinese_words"), r"^dictionary_word_.*\.jsonl?$"),
            )
            .register_ids(SourceFile::pattern(source_dir("ids"), r"^IDS-UCS-.*\.txt$"));
        registry
    }

    pub fn register(&mut self, importer: impl Importer + 'static, source: SourceFile) -> &mut Self {
        self.importers.push(Registration {
            importer: Box::new(importer),
            source,
        });
        self
    }

    pub fn register_ids(&mut self, source: SourceFile) -> &mut Self {
        self.ids = Some(source);
        self
    }

    /// Kinds in registration order.
    pub fn kinds(&self) -> Vec<DictKind> {
        self.importers.iter().map(|r| r.importer.kind()).collect()
    }

    /// Run every selected importer. Any failure aborts the import.
    pub fn import(&self, selection: &Selection, mode: LoadMode) -> Result<ImportedEntries> {
        let mut imported = ImportedEntries::default();

        for reg in &self.importers {
            let kind = reg.importer.kind();
            if !selection.includes(kind) {
                continue;
            }
            let path = reg
                .source
                .resolve()
                .with_context(|| format!("locating {} source", reg.importer.name()))?;
            let started = Instant::now();
            let entries = import_file(reg.importer.as_ref(), &path, mode)?;
            info!(
                dictionary = reg.importer.name(),
                path = %path.display(),
                entries = entries.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "imported dictionary"
            );
            imported.by_kind.entry(kind).or_default().extend(entries);
        }

        if selection.needs_ids()
            && let Some(source) = &self.ids
        {
            let path = source.resolve().context("locating IDS source")?;
            let started = Instant::now();
            imported.ids = IdsImporter.load(&path, mode)?;
            info!(
                path = %path.display(),
                characters = imported.ids.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "loaded IDS table"
            );
        }

        Ok(imported)
    }
}
