//! Shared types for the Kiokun dictionary indexer.
//!
//! Every source dictionary is reduced to one [`Entry`] variant. The
//! one-letter [`DictKind`] tag names a dictionary both in index postings
//! and in the output directory tree, and [`ShardClass`] names the output
//! partition an entry lands in.
//!
//! ```rust
//! use kiokun_types::{DictKind, ShardClass, is_han};
//!
//! assert_eq!(DictKind::from_char('d'), Some(DictKind::Kanji));
//! assert_eq!(ShardClass::Han2.dir_suffix(), "_han_2char");
//! assert!(is_han('日'));
//! assert!(!is_han('の'));
//! ```

mod entry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use entry::{
    ChineseCharacter, ChineseWord, Entry, Gloss, JapaneseKanji, JapaneseName, JapaneseWord,
    KanaForm, KanjiForm, Sense,
};

/// Source dictionary of an entry, serialised as its one-letter tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum DictKind {
    /// JMdict words.
    #[serde(rename = "j")]
    Word,
    /// JMnedict names.
    #[serde(rename = "n")]
    Name,
    /// Kanjidic characters.
    #[serde(rename = "d")]
    Kanji,
    /// Chinese single characters.
    #[serde(rename = "c")]
    ChineseChar,
    /// Chinese words.
    #[serde(rename = "w")]
    ChineseWord,
}

impl DictKind {
    pub const ALL: [DictKind; 5] = [
        DictKind::Word,
        DictKind::Name,
        DictKind::Kanji,
        DictKind::ChineseChar,
        DictKind::ChineseWord,
    ];

    /// One-letter tags, in [`DictKind::ALL`] order.
    const TAGS: [&'static str; 5] = ["j", "n", "d", "c", "w"];

    /// Parse a one-letter tag.
    pub fn from_char(c: char) -> Option<Self> {
        DictKind::ALL.into_iter().find(|kind| kind.to_char() == c)
    }

    /// The tag used in postings and as the body directory name.
    pub fn to_char(self) -> char {
        char::from(Self::TAGS[self.index()].as_bytes()[0])
    }

    pub fn tag(self) -> &'static str {
        Self::TAGS[self.index()]
    }

    /// Position of the kind in [`DictKind::ALL`], handy for fixed-size tallies.
    pub fn index(self) -> usize {
        match self {
            DictKind::Word => 0,
            DictKind::Name => 1,
            DictKind::Kanji => 2,
            DictKind::ChineseChar => 3,
            DictKind::ChineseWord => 4,
        }
    }

    /// Registry name of the source dictionary.
    pub fn source_name(self) -> &'static str {
        match self {
            DictKind::Word => "jmdict",
            DictKind::Name => "jmnedict",
            DictKind::Kanji => "kanjidic",
            DictKind::ChineseChar => "chinese_chars",
            DictKind::ChineseWord => "chinese_words",
        }
    }

    /// Inverse of [`DictKind::source_name`]; also accepts the one-letter tag.
    pub fn from_source_name(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "jmdict" | "j" => Some(DictKind::Word),
            "jmnedict" | "n" => Some(DictKind::Name),
            "kanjidic" | "d" => Some(DictKind::Kanji),
            "chinese_chars" | "chinese-chars" | "c" => Some(DictKind::ChineseChar),
            "chinese_words" | "chinese-words" | "w" => Some(DictKind::ChineseWord),
            _ => None,
        }
    }
}

impl fmt::Display for DictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DictKind::Word => "JMdict",
            DictKind::Name => "JMnedict",
            DictKind::Kanji => "Kanjidic",
            DictKind::ChineseChar => "Chinese character",
            DictKind::ChineseWord => "Chinese word",
        })
    }
}

/// Output partition chosen from the script and length of an entry's primary text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShardClass {
    /// At least one character outside the Han script.
    NonHan,
    /// Exactly one Han character.
    Han1,
    /// Exactly two Han characters.
    Han2,
    /// Three or more Han characters.
    Han3Plus,
}

impl ShardClass {
    pub const ALL: [ShardClass; 4] = [
        ShardClass::NonHan,
        ShardClass::Han1,
        ShardClass::Han2,
        ShardClass::Han3Plus,
    ];

    /// Digit prepended to entry IDs to form sharded IDs.
    pub fn digit(self) -> u8 {
        match self {
            ShardClass::NonHan => 0,
            ShardClass::Han1 => 1,
            ShardClass::Han2 => 2,
            ShardClass::Han3Plus => 3,
        }
    }

    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(ShardClass::NonHan),
            1 => Some(ShardClass::Han1),
            2 => Some(ShardClass::Han2),
            3 => Some(ShardClass::Han3Plus),
            _ => None,
        }
    }

    /// Suffix appended to the base output directory.
    pub fn dir_suffix(self) -> &'static str {
        match self {
            ShardClass::NonHan => "_non_han",
            ShardClass::Han1 => "_han_1char",
            ShardClass::Han2 => "_han_2char",
            ShardClass::Han3Plus => "_han_3plus",
        }
    }

    pub fn index(self) -> usize {
        self.digit() as usize
    }
}

impl fmt::Display for ShardClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShardClass::NonHan => "non-han",
            ShardClass::Han1 => "han-1char",
            ShardClass::Han2 => "han-2char",
            ShardClass::Han3Plus => "han-3plus",
        })
    }
}

/// Whether `c` belongs to the Unicode `Han` script.
///
/// Covers the unified ideograph blocks and their extensions, compatibility
/// ideographs, the radical blocks, and the Han-script marks in the CJK
/// symbols block (`々`, `〇`, `〡`–`〩`, `〸`–`〻`).
pub fn is_han(c: char) -> bool {
    matches!(
        c as u32,
        0x2E80..=0x2E99
            | 0x2E9B..=0x2EF3
            | 0x2F00..=0x2FD5
            | 0x3005
            | 0x3007
            | 0x3021..=0x3029
            | 0x3038..=0x303B
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFA6D
            | 0xFA70..=0xFAD9
            | 0x16FE2..=0x16FE3
            | 0x16FF0..=0x16FF1
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2B73F
            | 0x2B740..=0x2B81F
            | 0x2B820..=0x2CEAF
            | 0x2CEB0..=0x2EBEF
            | 0x2EBF0..=0x2EE5F
            | 0x2F800..=0x2FA1F
            | 0x30000..=0x3134F
            | 0x31350..=0x323AF
    )
}
