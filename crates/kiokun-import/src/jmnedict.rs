use std::path::Path;

use anyhow::{Context, Result};
use kiokun_types::{DictKind, Entry, JapaneseName};
use serde::Deserialize;

use crate::Importer;

/// Importer for `jmnedict-simplified` JSON releases.
///
/// Names are flattened: kanji texts become `k`, kana texts become readings,
/// and English translations become meanings.
#[derive(Clone, Copy, Debug, Default)]
pub struct JmnedictImporter;

#[derive(Deserialize)]
struct JmnedictFile {
    #[serde(default)]
    words: Vec<RawName>,
}

#[derive(Deserialize)]
struct RawName {
    #[serde(default)]
    id: String,
    #[serde(default)]
    kanji: Vec<RawForm>,
    #[serde(default)]
    kana: Vec<RawForm>,
    #[serde(default)]
    translation: Vec<RawTranslation>,
}

#[derive(Deserialize)]
struct RawForm {
    text: String,
}

#[derive(Deserialize)]
struct RawTranslation {
    #[serde(rename = "type", default)]
    name_type: Vec<String>,
    #[serde(default)]
    translation: Vec<RawDetail>,
}

#[derive(Deserialize)]
struct RawDetail {
    #[serde(default)]
    lang: String,
    text: String,
}

impl Importer for JmnedictImporter {
    fn name(&self) -> &str {
        "jmnedict"
    }

    fn kind(&self) -> DictKind {
        DictKind::Name
    }

    fn import(&self, path: &Path, bytes: &[u8]) -> Result<Vec<Entry>> {
        let file: JmnedictFile = serde_json::from_slice(bytes)
            .with_context(|| format!("parse JMnedict JSON {}", path.display()))?;
        Ok(file.words.into_iter().map(convert).collect())
    }
}

fn convert(raw: RawName) -> Entry {
    let kanji: Vec<String> = raw.kanji.into_iter().map(|k| k.text).collect();
    let reading: Vec<String> = raw.kana.into_iter().map(|k| k.text).collect();

    let mut meanings = Vec::new();
    let mut name_type: Vec<String> = Vec::new();
    for trans in raw.translation {
        meanings.extend(
            trans
                .translation
                .into_iter()
                .filter(|d| d.lang == "eng")
                .map(|d| d.text),
        );
        for ty in trans.name_type {
            if !name_type.contains(&ty) {
                name_type.push(ty);
            }
        }
    }

    let id = if raw.id.is_empty() {
        kanji
            .first()
            .or_else(|| reading.first())
            .cloned()
            .unwrap_or_default()
    } else {
        raw.id
    };

    Entry::JapaneseName(JapaneseName {
        id,
        kanji,
        reading,
        meanings,
        name_type,
    })
}
