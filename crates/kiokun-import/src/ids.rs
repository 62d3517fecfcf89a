//! Ideographic Description Sequence (IDS) table.
//!
//! The source is the CHISE `IDS-UCS-*.txt` family: tab-separated lines of
//! `U+XXXX <char> <ids> [@apparent=<ids>]`, with `;;` comment lines.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::{LoadMode, load_file, strip_cr};

/// One parsed line of an IDS file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdsRecord {
    pub codepoint: String,
    pub character: String,
    pub ids: String,
    pub apparent: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IdsImporter;

impl IdsImporter {
    pub fn name(&self) -> &str {
        "ids"
    }

    /// Parse an IDS file. Malformed lines (fewer than three fields, or a
    /// character field that is not exactly one character) are skipped.
    pub fn parse(&self, path: &Path, bytes: &[u8]) -> Result<Vec<IdsRecord>> {
        let text = std::str::from_utf8(bytes)
            .with_context(|| format!("IDS file {} is not UTF-8", path.display()))?;
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for raw in text.split('\n') {
            let line = strip_cr_str(raw);
            if line.starts_with(";;") || line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 || fields[1].chars().count() != 1 {
                skipped += 1;
                continue;
            }
            let apparent = fields[3..]
                .iter()
                .find_map(|f| f.strip_prefix("@apparent="))
                .map(str::to_string);
            records.push(IdsRecord {
                codepoint: fields[0].to_string(),
                character: fields[1].to_string(),
                ids: fields[2].to_string(),
                apparent,
            });
        }
        if skipped > 0 {
            debug!(path = %path.display(), skipped, "skipped malformed IDS lines");
        }
        Ok(records)
    }

    /// Read `path` and build a lookup table from it.
    pub fn load(&self, path: &Path, mode: LoadMode) -> Result<IdsTable> {
        let buffer = load_file(path, mode)?;
        let records = self.parse(path, buffer.as_slice())?;
        Ok(IdsTable::from_records(records))
    }
}

fn strip_cr_str(line: &str) -> &str {
    // Only a trailing '\r' is stripped, so the byte helper is safe here.
    let bytes = strip_cr(line.as_bytes());
    &line[..bytes.len()]
}

/// Character → IDS lookup. Absence of a character is not an error.
#[derive(Clone, Debug, Default)]
pub struct IdsTable {
    map: HashMap<String, String>,
}

impl IdsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = IdsRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record.character, record.ids);
        }
        table
    }

    /// Insert a mapping. The first sequence seen for a character is kept.
    pub fn insert(&mut self, character: String, ids: String) -> bool {
        use std::collections::hash_map::Entry;
        match self.map.entry(character) {
            Entry::Vacant(slot) => {
                slot.insert(ids);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, character: &str) -> Option<&str> {
        self.map.get(character).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
