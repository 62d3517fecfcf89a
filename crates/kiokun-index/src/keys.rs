use kiokun_types::{Entry, is_han};

/// Lookup keys of one entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LookupKeys {
    /// The entry's own written forms, in source order, without duplicates.
    pub exact: Vec<String>,
    /// Single Han characters occurring in the exact keys that are not
    /// themselves exact keys.
    pub contained: Vec<String>,
}

/// Derive the exact and contained keys of `entry`.
pub fn keys_of(entry: &Entry) -> LookupKeys {
    let mut exact = Vec::new();
    let with_contained = match entry {
        Entry::JapaneseWord(w) => {
            push_unique(&mut exact, w.kanji.iter().map(|k| k.text.as_str()));
            push_unique(&mut exact, w.kana.iter().map(|k| k.text.as_str()));
            true
        }
        Entry::JapaneseName(n) => {
            push_unique(&mut exact, n.kanji.iter().map(String::as_str));
            push_unique(&mut exact, n.reading.iter().map(String::as_str));
            true
        }
        Entry::JapaneseKanji(k) => {
            push_unique(&mut exact, [k.character.as_str()]);
            false
        }
        Entry::ChineseCharacter(c) => {
            push_unique(&mut exact, [c.traditional.as_str(), c.simplified.as_str()]);
            false
        }
        Entry::ChineseWord(w) => {
            push_unique(&mut exact, [w.traditional.as_str(), w.simplified.as_str()]);
            true
        }
    };
    if exact.is_empty() {
        exact.push(entry.id().to_string());
    }

    let mut contained: Vec<String> = Vec::new();
    if with_contained {
        for key in &exact {
            for c in key.chars().filter(|c| is_han(*c)) {
                let mut buf = [0u8; 4];
                let rune: &str = c.encode_utf8(&mut buf);
                if !exact.iter().any(|e| e == rune) && !contained.iter().any(|k| k == rune) {
                    contained.push(rune.to_string());
                }
            }
        }
    }

    LookupKeys { exact, contained }
}

fn push_unique<'a>(out: &mut Vec<String>, forms: impl IntoIterator<Item = &'a str>) {
    for form in forms {
        if !form.is_empty() && !out.iter().any(|k| k == form) {
            out.push(form.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiokun_types::{
        ChineseCharacter, ChineseWord, JapaneseKanji, JapaneseName, JapaneseWord, KanaForm,
        KanjiForm,
    };

    fn word(kanji: &[&str], kana: &[&str]) -> Entry {
        Entry::from(JapaneseWord {
            id: "1000".into(),
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
            sense: vec![],
        })
    }

    #[test]
    fn word_keys_split_into_exact_and_contained() {
        let keys = keys_of(&word(&["日本", "日本国"], &["にほん"]));
        assert_eq!(keys.exact, vec!["日本", "日本国", "にほん"]);
        assert_eq!(keys.contained, vec!["日", "本", "国"]);
    }

    #[test]
    fn contained_never_repeats_an_exact_key() {
        let keys = keys_of(&word(&["人々", "人"], &[]));
        assert_eq!(keys.exact, vec!["人々", "人"]);
        assert_eq!(keys.contained, vec!["々"]);
        for c in &keys.contained {
            assert!(!keys.exact.contains(c));
        }
    }

    #[test]
    fn kana_and_latin_are_never_contained() {
        let keys = keys_of(&word(&["食べる"], &["たべる"]));
        assert_eq!(keys.contained, vec!["食"]);
        let keys = keys_of(&word(&[], &["ABCの"]));
        assert!(keys.contained.is_empty());
    }

    #[test]
    fn empty_forms_fall_back_to_id() {
        let keys = keys_of(&word(&[], &[]));
        assert_eq!(keys.exact, vec!["1000"]);
        assert!(keys.contained.is_empty());
    }

    #[test]
    fn names_use_kanji_and_readings() {
        let name = Entry::from(JapaneseName {
            id: "5000001".into(),
            kanji: vec!["田中".into()],
            reading: vec!["たなか".into()],
            ..Default::default()
        });
        let keys = keys_of(&name);
        assert_eq!(keys.exact, vec!["田中", "たなか"]);
        assert_eq!(keys.contained, vec!["田", "中"]);
    }

    #[test]
    fn single_characters_have_no_contained_keys() {
        let kanji = Entry::from(JapaneseKanji {
            character: "日".into(),
            ..Default::default()
        });
        assert_eq!(keys_of(&kanji).exact, vec!["日"]);
        assert!(keys_of(&kanji).contained.is_empty());

        let chr = Entry::from(ChineseCharacter {
            id: "1".into(),
            traditional: "貓".into(),
            simplified: "猫".into(),
            ..Default::default()
        });
        let keys = keys_of(&chr);
        assert_eq!(keys.exact, vec!["貓", "猫"]);
        assert!(keys.contained.is_empty());
    }

    #[test]
    fn chinese_word_lists_simplified_only_when_different() {
        let same = Entry::from(ChineseWord {
            id: "1".into(),
            traditional: "日本".into(),
            simplified: "日本".into(),
            ..Default::default()
        });
        assert_eq!(keys_of(&same).exact, vec!["日本"]);

        let diff = Entry::from(ChineseWord {
            id: "2".into(),
            traditional: "電腦".into(),
            simplified: "电脑".into(),
            ..Default::default()
        });
        let keys = keys_of(&diff);
        assert_eq!(keys.exact, vec!["電腦", "电脑"]);
        assert_eq!(keys.contained, vec!["電", "腦", "电", "脑"]);
    }

    #[test]
    fn derivation_is_deterministic() {
        let entry = word(&["東京都"], &["とうきょうと"]);
        assert_eq!(keys_of(&entry), keys_of(&entry));
    }
}
