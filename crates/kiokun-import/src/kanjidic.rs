use std::path::Path;

use anyhow::{Context, Result};
use kiokun_types::{DictKind, Entry, JapaneseKanji};
use serde::Deserialize;

use crate::Importer;

/// Importer for `kanjidic2` JSON releases.
///
/// Each character gets its decimal code point as numeric id, so sharded
/// ids stay integral.
#[derive(Clone, Copy, Debug, Default)]
pub struct KanjidicImporter;

#[derive(Deserialize)]
struct KanjidicFile {
    #[serde(default)]
    characters: Vec<RawCharacter>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCharacter {
    literal: String,
    #[serde(default)]
    misc: RawMisc,
    #[serde(default)]
    reading_meaning: Option<RawReadingMeaning>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMisc {
    #[serde(default)]
    grade: Option<u8>,
    #[serde(default)]
    stroke_counts: Vec<u32>,
    #[serde(default)]
    frequency: Option<u32>,
    #[serde(default)]
    jlpt_level: Option<u8>,
}

#[derive(Deserialize)]
struct RawReadingMeaning {
    #[serde(default)]
    groups: Vec<RawGroup>,
    #[serde(default)]
    nanori: Vec<String>,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    readings: Vec<RawReading>,
    #[serde(default)]
    meanings: Vec<RawMeaning>,
}

#[derive(Deserialize)]
struct RawReading {
    #[serde(rename = "type")]
    reading_type: String,
    value: String,
}

#[derive(Deserialize)]
struct RawMeaning {
    #[serde(default)]
    lang: String,
    value: String,
}

impl Importer for KanjidicImporter {
    fn name(&self) -> &str {
        "kanjidic"
    }

    fn kind(&self) -> DictKind {
        DictKind::Kanji
    }

    fn import(&self, path: &Path, bytes: &[u8]) -> Result<Vec<Entry>> {
        let file: KanjidicFile = serde_json::from_slice(bytes)
            .with_context(|| format!("parse Kanjidic JSON {}", path.display()))?;
        Ok(file.characters.into_iter().map(convert).collect())
    }
}

fn convert(raw: RawCharacter) -> Entry {
    let numeric_id = raw.literal.chars().next().map(|c| (c as u32).to_string());
    let mut kanji = JapaneseKanji {
        character: raw.literal,
        numeric_id,
        grade: raw.misc.grade,
        jlpt: raw.misc.jlpt_level,
        frequency: raw.misc.frequency,
        stroke: raw.misc.stroke_counts.first().copied().unwrap_or(0),
        ..Default::default()
    };

    if let Some(rm) = raw.reading_meaning {
        for group in rm.groups {
            for reading in group.readings {
                match reading.reading_type.as_str() {
                    "ja_on" => kanji.on.push(reading.value),
                    "ja_kun" => kanji.kun.push(reading.value),
                    _ => {}
                }
            }
            kanji.meanings.extend(
                group
                    .meanings
                    .into_iter()
                    .filter(|m| m.lang == "en")
                    .map(|m| m.value),
            );
        }
        kanji.nanori = rm.nanori;
    }

    Entry::JapaneseKanji(kanji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_readings_meanings_and_misc() {
        let raw = r#"{"characters": [{
            "literal": "日",
            "codepoints": [],
            "radicals": [],
            "misc": {"grade": 1, "strokeCounts": [4, 5], "variants": [], "frequency": 1, "radicalNames": [], "jlptLevel": 4},
            "dictionaryReferences": [],
            "queryCodes": [],
            "readingMeaning": {
                "groups": [{
                    "readings": [
                        {"type": "pinyin", "value": "ri4"},
                        {"type": "ja_on", "value": "ニチ"},
                        {"type": "ja_kun", "value": "ひ"}
                    ],
                    "meanings": [
                        {"lang": "en", "value": "day"},
                        {"lang": "fr", "value": "jour"}
                    ]
                }],
                "nanori": ["あ", "か"]
            }
        }]}"#;
        let entries = KanjidicImporter
            .import(Path::new("kanjidic2.json"), raw.as_bytes())
            .unwrap();
        let Entry::JapaneseKanji(kanji) = &entries[0] else {
            panic!("expected a kanji");
        };
        assert_eq!(kanji.character, "日");
        assert_eq!(kanji.numeric_id.as_deref(), Some("26085"));
        assert_eq!(kanji.stroke, 4);
        assert_eq!(kanji.grade, Some(1));
        assert_eq!(kanji.jlpt, Some(4));
        assert_eq!(kanji.on, vec!["ニチ"]);
        assert_eq!(kanji.kun, vec!["ひ"]);
        assert_eq!(kanji.meanings, vec!["day"]);
        assert_eq!(kanji.nanori, vec!["あ", "か"]);
    }

    #[test]
    fn tolerates_missing_reading_meaning() {
        let raw = r#"{"characters": [{"literal": "々", "misc": {"strokeCounts": []}, "readingMeaning": null}]}"#;
        let entries = KanjidicImporter
            .import(Path::new("kanjidic2.json"), raw.as_bytes())
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].primary_text(), "々");
    }
}
