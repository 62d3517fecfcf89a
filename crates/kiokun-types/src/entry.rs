use serde::{Deserialize, Serialize};

use crate::DictKind;

/// One written kanji form of a JMdict word.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KanjiForm {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub common: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// One kana reading of a JMdict word.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanaForm {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub common: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Kanji forms this reading belongs to; empty means all of them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to_kanji: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gloss {
    #[serde(default)]
    pub lang: String,
    pub text: String,
}

/// A JMdict sense: parts of speech, usage notes and glosses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sense {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub part_of_speech: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to_kanji: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to_kana: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialect: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gloss: Vec<Gloss>,
}

/// JMdict word entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JapaneseWord {
    pub id: String,
    #[serde(default)]
    pub kanji: Vec<KanjiForm>,
    #[serde(default)]
    pub kana: Vec<KanaForm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sense: Vec<Sense>,
}

/// JMnedict proper-name entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JapaneseName {
    pub id: String,
    #[serde(rename = "k", default)]
    pub kanji: Vec<String>,
    #[serde(rename = "r", default)]
    pub reading: Vec<String>,
    #[serde(rename = "m", default)]
    pub meanings: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub name_type: Vec<String>,
}

/// Kanjidic character entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JapaneseKanji {
    #[serde(rename = "c")]
    pub character: String,
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub numeric_id: Option<String>,
    #[serde(rename = "m", default, skip_serializing_if = "Vec::is_empty")]
    pub meanings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kun: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nanori: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jlpt: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(default)]
    pub stroke: u32,
    #[serde(rename = "freq", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    /// Ideographic description sequence, attached just before the body is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
}

/// Chinese single-character entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChineseCharacter {
    pub id: String,
    pub traditional: String,
    pub simplified: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pinyin: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
}

/// Chinese multi-character word entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChineseWord {
    pub id: String,
    pub traditional: String,
    pub simplified: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pinyin: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsk_level: Option<u8>,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub frequency: std::collections::BTreeMap<String, i64>,
}

/// An imported record from any of the five source dictionaries.
///
/// Serialises as the bare variant body, which is exactly what gets written
/// to `<shard>/<tag>/<sharded-id>.<ext>`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    JapaneseWord(JapaneseWord),
    JapaneseName(JapaneseName),
    JapaneseKanji(JapaneseKanji),
    ChineseCharacter(ChineseCharacter),
    ChineseWord(ChineseWord),
}

impl Entry {
    pub fn kind(&self) -> DictKind {
        match self {
            Entry::JapaneseWord(_) => DictKind::Word,
            Entry::JapaneseName(_) => DictKind::Name,
            Entry::JapaneseKanji(_) => DictKind::Kanji,
            Entry::ChineseCharacter(_) => DictKind::ChineseChar,
            Entry::ChineseWord(_) => DictKind::ChineseWord,
        }
    }

    /// Dictionary-assigned identifier. Kanji fall back to the character
    /// itself when no numeric id was assigned.
    pub fn id(&self) -> &str {
        match self {
            Entry::JapaneseWord(w) => &w.id,
            Entry::JapaneseName(n) => &n.id,
            Entry::JapaneseKanji(k) => k.numeric_id.as_deref().unwrap_or(&k.character),
            Entry::ChineseCharacter(c) => &c.id,
            Entry::ChineseWord(w) => &w.id,
        }
    }

    /// Preferred file name for the entry body.
    pub fn filename(&self) -> &str {
        match self {
            Entry::JapaneseName(n) => n
                .kanji
                .first()
                .or_else(|| n.reading.first())
                .map(String::as_str)
                .unwrap_or(&n.id),
            _ => self.id(),
        }
    }

    /// Text the shard class is computed from: the first kanji or traditional
    /// form, else the first kana or reading form, else the id.
    pub fn primary_text(&self) -> &str {
        let text = match self {
            Entry::JapaneseWord(w) => w
                .kanji
                .first()
                .map(|k| k.text.as_str())
                .or_else(|| w.kana.first().map(|k| k.text.as_str())),
            Entry::JapaneseName(n) => n
                .kanji
                .first()
                .or_else(|| n.reading.first())
                .map(String::as_str),
            Entry::JapaneseKanji(k) => Some(k.character.as_str()),
            Entry::ChineseCharacter(c) => Some(c.traditional.as_str()),
            Entry::ChineseWord(w) => Some(w.traditional.as_str()),
        };
        match text {
            Some(t) if !t.is_empty() => t,
            _ => self.id(),
        }
    }
}

impl From<JapaneseWord> for Entry {
    fn from(value: JapaneseWord) -> Self {
        Entry::JapaneseWord(value)
    }
}

impl From<JapaneseName> for Entry {
    fn from(value: JapaneseName) -> Self {
        Entry::JapaneseName(value)
    }
}

impl From<JapaneseKanji> for Entry {
    fn from(value: JapaneseKanji) -> Self {
        Entry::JapaneseKanji(value)
    }
}

impl From<ChineseCharacter> for Entry {
    fn from(value: ChineseCharacter) -> Self {
        Entry::ChineseCharacter(value)
    }
}

impl From<ChineseWord> for Entry {
    fn from(value: ChineseWord) -> Self {
        Entry::ChineseWord(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str, kanji: &[&str], kana: &[&str]) -> Entry {
        JapaneseWord {
            id: id.to_string(),
            kanji: kanji
                .iter()
                .map(|t| KanjiForm {
                    text: t.to_string(),
                    ..Default::default()
                })
                .collect(),
            kana: kana
                .iter()
                .map(|t| KanaForm {
                    text: t.to_string(),
                    ..Default::default()
                })
                .collect(),
            sense: Vec::new(),
        }
        .into()
    }

    #[test]
    fn primary_text_prefers_kanji_then_kana_then_id() {
        assert_eq!(word("1", &["日本"], &["にほん"]).primary_text(), "日本");
        assert_eq!(word("2", &[], &["にほん"]).primary_text(), "にほん");
        assert_eq!(word("3", &[], &[]).primary_text(), "3");
        assert_eq!(word("4", &[""], &[]).primary_text(), "4");
    }

    #[test]
    fn kanji_id_falls_back_to_character() {
        let mut kanji = JapaneseKanji {
            character: "日".to_string(),
            ..Default::default()
        };
        assert_eq!(Entry::from(kanji.clone()).id(), "日");
        kanji.numeric_id = Some("26085".to_string());
        let entry = Entry::from(kanji);
        assert_eq!(entry.id(), "26085");
        assert_eq!(entry.kind(), DictKind::Kanji);
    }

    #[test]
    fn name_filename_uses_first_form() {
        let name = Entry::from(JapaneseName {
            id: "5000".to_string(),
            kanji: vec![],
            reading: vec!["たなか".to_string()],
            ..Default::default()
        });
        assert_eq!(name.filename(), "たなか");
        assert_eq!(name.id(), "5000");
    }

    #[test]
    fn body_serialises_without_variant_tag() {
        let entry = Entry::from(ChineseCharacter {
            id: "7".to_string(),
            traditional: "貓".to_string(),
            simplified: "猫".to_string(),
            stroke_count: Some(16),
            ..Default::default()
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["traditional"], "貓");
        assert_eq!(json["strokeCount"], 16);
        assert!(json.get("ids").is_none());
        assert!(json.get("ChineseCharacter").is_none());
    }
}
