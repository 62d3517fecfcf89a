//! Chinese character and word importers.
//!
//! Both sources carry opaque database ids, so entries are sorted by their
//! traditional form and renumbered from 1. The numbering is stable for a
//! given source file.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use kiokun_types::{ChineseCharacter, ChineseWord, DictKind, Entry};
use serde::Deserialize;
use serde_json::Value;

use crate::{Importer, strip_cr};

#[derive(Clone, Copy, Debug, Default)]
pub struct ChineseCharImporter;

#[derive(Clone, Copy, Debug, Default)]
pub struct ChineseWordImporter;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChar {
    #[serde(rename = "_id", default)]
    id: Value,
    #[serde(default)]
    char: String,
    #[serde(default)]
    simp_variants: Vec<String>,
    #[serde(default)]
    gloss: Option<String>,
    #[serde(default)]
    stroke_count: Option<f64>,
}

/// One record of either the JSON array export or the JSONL dump.
#[derive(Deserialize)]
struct RawWord {
    #[serde(rename = "_id", default)]
    id: Value,
    #[serde(alias = "word", default)]
    trad: Option<String>,
    #[serde(alias = "simplified", default)]
    simp: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    pinyin: Option<OneOrMany>,
    #[serde(default)]
    definitions: Option<OneOrMany>,
    #[serde(default)]
    gloss: Option<String>,
    #[serde(default)]
    statistics: Option<RawStatistics>,
    #[serde(default)]
    hsk: Option<f64>,
    #[serde(default)]
    frequency: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    pinyin: Option<String>,
    #[serde(default)]
    definitions: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatistics {
    #[serde(default)]
    hsk_level: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

impl Importer for ChineseCharImporter {
    fn name(&self) -> &str {
        "chinese_chars"
    }

    fn kind(&self) -> DictKind {
        DictKind::ChineseChar
    }

    fn import(&self, path: &Path, bytes: &[u8]) -> Result<Vec<Entry>> {
        let raw: Vec<RawChar> = serde_json::from_slice(bytes)
            .with_context(|| format!("parse Chinese character JSON {}", path.display()))?;

        let mut chars: Vec<ChineseCharacter> = raw
            .into_iter()
            .map(|r| {
                let simplified = r
                    .simp_variants
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| r.char.clone());
                let mut entry = ChineseCharacter {
                    id: id_string(&r.id),
                    traditional: r.char,
                    simplified,
                    definitions: r.gloss.into_iter().collect(),
                    stroke_count: r.stroke_count.map(|s| s as u32),
                    ..Default::default()
                };
                if entry.id.is_empty() {
                    entry.id = entry.traditional.clone();
                }
                if entry.traditional.is_empty() {
                    entry.traditional = entry.id.clone();
                }
                entry
            })
            .collect();

        chars.sort_by(|a, b| a.traditional.cmp(&b.traditional));
        Ok(chars
            .into_iter()
            .enumerate()
            .map(|(i, mut c)| {
                c.id = (i + 1).to_string();
                Entry::ChineseCharacter(c)
            })
            .collect())
    }
}

impl Importer for ChineseWordImporter {
    fn name(&self) -> &str {
        "chinese_words"
    }

    fn kind(&self) -> DictKind {
        DictKind::ChineseWord
    }

    fn import(&self, path: &Path, bytes: &[u8]) -> Result<Vec<Entry>> {
        let is_jsonl = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
        let raw: Vec<RawWord> = if is_jsonl {
            parse_jsonl(path, bytes)?
        } else {
            serde_json::from_slice(bytes)
                .with_context(|| format!("parse Chinese word JSON {}", path.display()))?
        };

        let mut words: Vec<ChineseWord> = raw.into_iter().map(convert_word).collect();
        words.sort_by(|a, b| a.traditional.cmp(&b.traditional));
        Ok(words
            .into_iter()
            .enumerate()
            .map(|(i, mut w)| {
                w.id = (i + 1).to_string();
                Entry::ChineseWord(w)
            })
            .collect())
    }
}

fn parse_jsonl(path: &Path, bytes: &[u8]) -> Result<Vec<RawWord>> {
    let mut out = Vec::new();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let record: RawWord = serde_json::from_slice(line)
            .with_context(|| format!("{}:{} malformed JSONL record", path.display(), lineno + 1))?;
        out.push(record);
    }
    Ok(out)
}

fn convert_word(raw: RawWord) -> ChineseWord {
    let traditional = raw.trad.unwrap_or_default();
    let simplified = raw.simp.unwrap_or_else(|| traditional.clone());

    let (mut pinyin, mut definitions) = if raw.items.is_empty() {
        (
            raw.pinyin.map(OneOrMany::into_vec).unwrap_or_default(),
            raw.definitions.map(OneOrMany::into_vec).unwrap_or_default(),
        )
    } else {
        let mut pinyin = Vec::new();
        let mut definitions = Vec::new();
        for item in raw.items {
            pinyin.extend(item.pinyin);
            definitions.extend(item.definitions);
        }
        (pinyin, definitions)
    };
    pinyin.retain(|p| !p.is_empty());
    if definitions.is_empty() {
        definitions.extend(raw.gloss);
    }

    let hsk_level = raw
        .statistics
        .and_then(|s| s.hsk_level)
        .or(raw.hsk)
        .map(|h| h as u8);
    let frequency = raw
        .frequency
        .into_iter()
        .filter_map(|(k, v)| v.as_f64().map(|f| (k, f as i64)))
        .collect();

    let mut word = ChineseWord {
        id: id_string(&raw.id),
        traditional,
        simplified,
        pinyin,
        definitions,
        hsk_level,
        frequency,
    };
    if word.id.is_empty() {
        word.id = word.traditional.clone();
    }
    if word.traditional.is_empty() {
        word.traditional = word.id.clone();
    }
    word
}

fn id_string(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
