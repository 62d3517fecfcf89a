use std::collections::BTreeMap;

use kiokun_types::DictKind;
use serde::{Deserialize, Serialize};

/// Whether a key is one of the entry's own forms or a character inside one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Contained,
}

/// Postings for one lookup key in one shard.
///
/// Serialised as `{"e": {"j": [..]}, "c": {"d": [..]}}`; an empty side is
/// omitted, and an omitted side deserialises as empty.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "e", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exact: BTreeMap<DictKind, Vec<i64>>,
    #[serde(rename = "c", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contained: BTreeMap<DictKind, Vec<i64>>,
}

impl IndexEntry {
    pub fn side(&self, kind: MatchKind) -> &BTreeMap<DictKind, Vec<i64>> {
        match kind {
            MatchKind::Exact => &self.exact,
            MatchKind::Contained => &self.contained,
        }
    }

    fn side_mut(&mut self, kind: MatchKind) -> &mut BTreeMap<DictKind, Vec<i64>> {
        match kind {
            MatchKind::Exact => &mut self.exact,
            MatchKind::Contained => &mut self.contained,
        }
    }

    /// Append `id` unless it is already listed. Returns whether it was added.
    pub fn add(&mut self, dict: DictKind, id: i64, kind: MatchKind) -> bool {
        let list = self.side_mut(kind).entry(dict).or_default();
        if list.contains(&id) {
            return false;
        }
        list.push(id);
        true
    }

    /// Drop empty postings lists.
    pub fn optimize(&mut self) {
        self.exact.retain(|_, ids| !ids.is_empty());
        self.contained.retain(|_, ids| !ids.is_empty());
    }

    pub fn is_empty(&self) -> bool {
        self.exact.values().all(Vec::is_empty) && self.contained.values().all(Vec::is_empty)
    }

    /// Number of ids listed for `dict` on the `kind` side.
    pub fn count(&self, dict: DictKind, kind: MatchKind) -> usize {
        self.side(kind).get(&dict).map_or(0, Vec::len)
    }

    /// Merge `other` into `self`, keeping first-seen order and dropping duplicates.
    pub fn merge(&mut self, other: &IndexEntry) {
        for kind in [MatchKind::Exact, MatchKind::Contained] {
            for (dict, ids) in other.side(kind) {
                for id in ids {
                    self.add(*dict, *id, kind);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_deduplicates() {
        let mut entry = IndexEntry::default();
        assert!(entry.add(DictKind::Word, 24057102, MatchKind::Exact));
        assert!(!entry.add(DictKind::Word, 24057102, MatchKind::Exact));
        assert!(entry.add(DictKind::Word, 24057102, MatchKind::Contained));
        assert_eq!(entry.count(DictKind::Word, MatchKind::Exact), 1);
        assert_eq!(entry.count(DictKind::Word, MatchKind::Contained), 1);
    }

    #[test]
    fn serialises_compact_form() {
        let mut entry = IndexEntry::default();
        entry.add(DictKind::Word, 24057102, MatchKind::Exact);
        entry.add(DictKind::Kanji, 14057102, MatchKind::Contained);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"e":{"j":[24057102]},"c":{"d":[14057102]}}"#);
    }

    #[test]
    fn optimize_drops_empty_sides() {
        let mut entry = IndexEntry::default();
        entry.exact.insert(DictKind::Name, Vec::new());
        entry.add(DictKind::Kanji, 126085, MatchKind::Exact);
        entry.contained.insert(DictKind::Word, Vec::new());
        entry.optimize();
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"e":{"d":[126085]}}"#);

        let back: IndexEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert!(back.contained.is_empty());
    }

    #[test]
    fn merge_keeps_order_and_uniqueness() {
        let mut a = IndexEntry::default();
        a.add(DictKind::Word, 1, MatchKind::Exact);
        let mut b = IndexEntry::default();
        b.add(DictKind::Word, 2, MatchKind::Exact);
        b.add(DictKind::Word, 1, MatchKind::Exact);
        b.add(DictKind::Kanji, 3, MatchKind::Contained);
        a.merge(&b);
        assert_eq!(a.exact[&DictKind::Word], vec![1, 2]);
        assert_eq!(a.contained[&DictKind::Kanji], vec![3]);
    }
}
