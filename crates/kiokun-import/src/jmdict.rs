use std::path::Path;

use anyhow::{Context, Result};
use kiokun_types::{DictKind, Entry, JapaneseWord};
use serde::Deserialize;

use crate::Importer;

/// Importer for `jmdict-simplified` JSON releases.
#[derive(Clone, Copy, Debug, Default)]
pub struct JmdictImporter;

#[derive(Deserialize)]
struct JmdictFile {
    #[serde(default)]
    words: Vec<JapaneseWord>,
}

impl Importer for JmdictImporter {
    fn name(&self) -> &str {
        "jmdict"
    }

    fn kind(&self) -> DictKind {
        DictKind::Word
    }

    fn import(&self, path: &Path, bytes: &[u8]) -> Result<Vec<Entry>> {
        let file: JmdictFile = serde_json::from_slice(bytes)
            .with_context(|| format!("parse JMdict JSON {}", path.display()))?;
        Ok(file
            .words
            .into_iter()
            .map(|mut word| {
                sanitize(&mut word);
                if word.id.is_empty() {
                    word.id = first_form(&word);
                }
                Entry::JapaneseWord(word)
            })
            .collect())
    }
}

fn first_form(word: &JapaneseWord) -> String {
    word.kanji
        .first()
        .map(|k| k.text.clone())
        .or_else(|| word.kana.first().map(|k| k.text.clone()))
        .unwrap_or_default()
}

/// `"*"` in an applies-to list means "every form"; an empty list says the same.
fn sanitize(word: &mut JapaneseWord) {
    for kana in &mut word.kana {
        kana.applies_to_kanji.retain(|k| k != "*");
    }
    for sense in &mut word.sense {
        sense.applies_to_kanji.retain(|k| k != "*");
        sense.applies_to_kana.retain(|k| k != "*");
    }
}
