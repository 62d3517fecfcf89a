use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashSet;
use kiokun_import::IdsTable;
use kiokun_types::{DictKind, Entry, ShardClass};
use tracing::debug;

use crate::codec::{Codec, write_file};
use crate::error::StoreError;
use crate::layout::OutputLayout;
use crate::shard::ShardedId;

/// Writes each distinct entry body at most once.
///
/// Bodies are keyed by dictionary kind, shard and posting, so a Chinese
/// character and a kanji with the same numeric id never shadow each other.
/// The id is marked as seen before the file is written; if two threads race
/// on the same id, the loser returns `false` without touching the disk.
pub struct EntryStore {
    layout: OutputLayout,
    codec: Arc<dyn Codec>,
    ids: Arc<IdsTable>,
    written: DashSet<(DictKind, ShardClass, i64)>,
    per_shard: [AtomicUsize; 4],
}

impl EntryStore {
    pub fn new(layout: OutputLayout, codec: Arc<dyn Codec>, ids: Arc<IdsTable>) -> Self {
        Self {
            layout,
            codec,
            ids,
            written: DashSet::new(),
            per_shard: Default::default(),
        }
    }

    /// Persist `entry` under `id` unless it was stored before.
    ///
    /// Returns `Ok(true)` when this call wrote the body.
    pub fn write_once(&self, id: &ShardedId, entry: &Entry) -> Result<bool, StoreError> {
        let kind = entry.kind();
        if !self.written.insert((kind, id.shard(), id.posting())) {
            return Ok(false);
        }

        let path = self
            .layout
            .body_path(id.shard(), kind, &id.file_stem(), self.codec.extension());
        let body = self.decorate(entry);
        write_file(self.codec.as_ref(), &path, &*body)?;
        debug!("wrote {kind} entry {id}");
        self.per_shard[id.shard().index()].fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    /// Attach the IDS of single-character entries when the table has one.
    fn decorate<'a>(&self, entry: &'a Entry) -> Cow<'a, Entry> {
        match entry {
            Entry::JapaneseKanji(k) if k.ids.is_none() => match self.ids.get(&k.character) {
                Some(ids) => {
                    let mut k = k.clone();
                    k.ids = Some(ids.to_string());
                    Cow::Owned(Entry::JapaneseKanji(k))
                }
                None => Cow::Borrowed(entry),
            },
            Entry::ChineseCharacter(c) if c.ids.is_none() => match self.ids.get(&c.traditional) {
                Some(ids) => {
                    let mut c = c.clone();
                    c.ids = Some(ids.to_string());
                    Cow::Owned(Entry::ChineseCharacter(c))
                }
                None => Cow::Borrowed(entry),
            },
            _ => Cow::Borrowed(entry),
        }
    }

    pub fn contains(&self, kind: DictKind, id: &ShardedId) -> bool {
        self.written.contains(&(kind, id.shard(), id.posting()))
    }

    /// Bodies written to `shard` so far.
    pub fn written_in(&self, shard: ShardClass) -> usize {
        self.per_shard[shard.index()].load(Ordering::Relaxed)
    }

    pub fn written_count(&self) -> usize {
        self.per_shard.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::codec::{PlainJson, read_file};
    use kiokun_import::IdsRecord;
    use kiokun_types::{ChineseCharacter, JapaneseKanji};
    use serde_json::Value;

    fn store(dir: &std::path::Path, ids: IdsTable) -> EntryStore {
        let layout = OutputLayout::new(dir.join("out"));
        layout.create_all().unwrap();
        EntryStore::new(layout, Arc::new(PlainJson), Arc::new(ids))
    }

    fn kanji(c: &str) -> Entry {
        Entry::from(JapaneseKanji {
            character: c.into(),
            numeric_id: c.chars().next().map(|ch| (ch as u32).to_string()),
            stroke: 4,
            ..Default::default()
        })
    }

    #[test]
    fn second_write_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), IdsTable::new());
        let entry = kanji("日");
        let id = ShardedId::for_entry(&entry);

        assert!(store.write_once(&id, &entry).unwrap());
        assert!(!store.write_once(&id, &entry).unwrap());
        assert_eq!(store.written_count(), 1);
        assert_eq!(store.written_in(ShardClass::Han1), 1);

        let body_dir = store.layout().body_dir(ShardClass::Han1, DictKind::Kanji);
        let files: Vec<_> = fs::read_dir(body_dir).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn concurrent_writers_store_one_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), IdsTable::new());
        let entry = kanji("日");
        let id = ShardedId::for_entry(&entry);

        let wrote = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| store.write_once(&id, &entry).unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|wrote| *wrote)
                .count()
        });
        assert_eq!(wrote, 1);
        assert_eq!(store.written_count(), 1);

        let body_dir = store.layout().body_dir(ShardClass::Han1, DictKind::Kanji);
        let files: Vec<_> = fs::read_dir(body_dir).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn same_id_in_different_dictionaries_is_stored_twice() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), IdsTable::new());
        let k = kanji("日");
        let c = Entry::from(ChineseCharacter {
            id: "26085".into(),
            traditional: "日".into(),
            simplified: "日".into(),
            ..Default::default()
        });
        let id = ShardedId::for_entry(&k);
        assert_eq!(id, ShardedId::for_entry(&c));
        assert!(store.write_once(&id, &k).unwrap());
        assert!(store.write_once(&id, &c).unwrap());
        assert!(store.contains(DictKind::Kanji, &id));
        assert!(store.contains(DictKind::ChineseChar, &id));
    }

    #[test]
    fn decorates_single_characters_with_ids() {
        let dir = tempfile::tempdir().unwrap();
        let ids = IdsTable::from_records([IdsRecord {
            codepoint: "U+65E5".into(),
            character: "日".into(),
            ids: "⿰丨⿱𠃌二".into(),
            apparent: None,
        }]);
        let store = store(dir.path(), ids);
        let entry = kanji("日");
        let id = ShardedId::for_entry(&entry);
        store.write_once(&id, &entry).unwrap();

        let path = store
            .layout()
            .body_path(ShardClass::Han1, DictKind::Kanji, &id.file_stem(), "json");
        let body: Value = read_file(&PlainJson, &path).unwrap();
        assert_eq!(body["c"], "日");
        assert_eq!(body["ids"], "⿰丨⿱𠃌二");
    }

    #[test]
    fn missing_directory_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("never-created"));
        let store = EntryStore::new(layout, Arc::new(PlainJson), Arc::new(IdsTable::new()));
        let entry = kanji("日");
        let err = store
            .write_once(&ShardedId::for_entry(&entry), &entry)
            .unwrap_err();
        assert!(err.path().ends_with("126085.json"));
    }
}
