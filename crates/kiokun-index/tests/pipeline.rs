use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiokun_import::{IdsTable, LoadMode, Registry, Selection};
use kiokun_index::{
    FlushConfig, FlushError, IndexReader, IndexerConfig, IndexerError, MatchKind, OutputLayout,
    PlainJson, ShardedId, ShardedIndexer, ZstdJson, shard_of,
};
use kiokun_types::{
    ChineseWord, DictKind, Entry, JapaneseKanji, JapaneseWord, KanaForm, KanjiForm, ShardClass,
};

fn config(workers: usize) -> IndexerConfig {
    IndexerConfig {
        workers,
        batch_size: 4,
        flush: FlushConfig {
            writers: 3,
            ..FlushConfig::default()
        },
    }
}

fn plain_indexer(out: &Path, workers: usize) -> ShardedIndexer {
    ShardedIndexer::new(
        OutputLayout::new(out),
        Arc::new(PlainJson),
        Arc::new(IdsTable::new()),
        config(workers),
    )
    .expect("create indexer")
}

fn word(id: &str, kanji: &[&str], kana: &[&str]) -> Entry {
    Entry::from(JapaneseWord {
        id: id.into(),
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

fn kanji(c: char) -> Entry {
    Entry::from(JapaneseKanji {
        character: c.to_string(),
        numeric_id: Some((c as u32).to_string()),
        stroke: 4,
        ..Default::default()
    })
}

#[test]
fn kanji_and_word_containment() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let indexer = plain_indexer(&out, 2);
    let nichi = kanji('日');
    let nihon = word("1582710", &["日本"], &[]);
    indexer.process_entries(&[nichi.clone(), nihon.clone()]);
    indexer.finish().expect("flush");

    let nichi_id = ShardedId::for_entry(&nichi).posting();
    let nihon_id = ShardedId::for_entry(&nihon).posting();
    assert_eq!(nihon_id, 21582710);

    let reader = IndexReader::new(OutputLayout::new(&out), Arc::new(PlainJson));
    let hi = reader.lookup("日").unwrap().merged();
    assert_eq!(hi.exact.get(&DictKind::Kanji), Some(&vec![nichi_id]));
    assert_eq!(hi.contained.get(&DictKind::Word), Some(&vec![nihon_id]));
    assert!(hi.exact.get(&DictKind::Word).is_none());

    let japan = reader.lookup("日本").unwrap().merged();
    assert_eq!(japan.exact.get(&DictKind::Word), Some(&vec![nihon_id]));
    assert_eq!(japan.exact.len(), 1);
    assert!(japan.contained.is_empty());

    // The kanji's exact posting and the word's contained posting sit in their own shards.
    let han1 = reader.postings(ShardClass::Han1, "日").unwrap().unwrap();
    assert!(han1.contained.is_empty());
    let han2 = reader.postings(ShardClass::Han2, "日").unwrap().unwrap();
    assert!(han2.exact.is_empty());

    let resolved = reader.resolve("日").unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].match_kind, MatchKind::Exact);
    assert_eq!(resolved[0].body["c"], "日");
    assert_eq!(resolved[1].match_kind, MatchKind::Contained);
    assert_eq!(resolved[1].body["id"], "1582710");
}

#[test]
fn ten_words_ten_kanji() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = plain_indexer(&dir.path().join("output"), 4);

    let chars: Vec<char> = "山川田水火木金土月花".chars().collect();
    let mut entries = Vec::new();
    for (i, c) in chars.iter().enumerate() {
        entries.push(word(&format!("{}", 1_000_000 + i), &[&format!("{c}の")], &[]));
        entries.push(kanji(*c));
    }
    indexer.process_entries(&entries);
    let stats = indexer.finish().expect("flush");
    let overall = stats.overall();

    assert_eq!(overall.postings(DictKind::Word, MatchKind::Contained), 10);
    assert_eq!(overall.postings(DictKind::Word, MatchKind::Exact), 10);
    assert_eq!(overall.postings(DictKind::Kanji, MatchKind::Exact), 10);
    assert_eq!(overall.postings(DictKind::Kanji, MatchKind::Contained), 0);
    assert_eq!(overall.entries, 20);
    // Non-Han holds each word's own key and its contained kanji; Han1 holds the kanji.
    assert_eq!(overall.index_files, 30);
    assert_eq!(stats.shard(ShardClass::Han1).index_files, 10);
}

#[test]
fn shard_boundaries() {
    let cases = [
        ("猫", ShardClass::Han1),
        ("猫草", ShardClass::Han2),
        ("食べる", ShardClass::NonHan),
        ("ABC", ShardClass::NonHan),
    ];
    for (text, expected) in cases {
        assert_eq!(shard_of(&word("1", &[text], &[])), expected, "{text}");
    }
}

#[test]
fn reprocessing_an_entry_writes_one_body() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let indexer = plain_indexer(&out, 1);
    let entry = word("1358280", &["食べる"], &["たべる"]);
    assert!(indexer.process_entry(&entry).unwrap());
    assert!(!indexer.process_entry(&entry).unwrap());
    indexer.process_entries(&[entry.clone(), entry.clone()]);
    let stats = indexer.finish().unwrap();

    assert_eq!(stats.overall().entries, 1);
    assert_eq!(stats.overall().postings(DictKind::Word, MatchKind::Exact), 2);
    let body_dir = OutputLayout::new(&out).body_dir(ShardClass::NonHan, DictKind::Word);
    let files: Vec<_> = std::fs::read_dir(body_dir).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn zstd_output_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let codec = Arc::new(ZstdJson::new(3));
    let indexer = ShardedIndexer::new(
        OutputLayout::new(&out),
        codec.clone(),
        Arc::new(IdsTable::new()),
        config(2),
    )
    .unwrap();
    let entry = word("1582710", &["日本", "日本国"], &["にほん", "にっぽん"]);
    indexer.process_entries(std::slice::from_ref(&entry));
    indexer.finish().unwrap();

    let layout = OutputLayout::new(&out);
    assert!(
        layout
            .index_path(ShardClass::Han2, "日本国", "json.zst")
            .is_file()
    );
    let reader = IndexReader::new(layout, codec);
    for key in ["日本", "日本国", "にほん", "にっぽん"] {
        let postings = reader.lookup(key).unwrap().merged();
        assert_eq!(postings.exact[&DictKind::Word], vec![21582710], "{key}");
    }
    for key in ["日", "本", "国"] {
        let postings = reader.lookup(key).unwrap().merged();
        assert_eq!(postings.contained[&DictKind::Word], vec![21582710], "{key}");
        assert!(postings.exact.is_empty(), "{key}");
    }
}

#[test]
fn body_failures_surface_at_finish() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let indexer = plain_indexer(&out, 1);
    // Replace the kanji body directory with a file so body writes fail.
    let body_dir = OutputLayout::new(&out).body_dir(ShardClass::Han1, DictKind::Kanji);
    std::fs::remove_dir(&body_dir).unwrap();
    std::fs::write(&body_dir, b"").unwrap();

    indexer.process_entries(&[kanji('日'), word("1582710", &["日本"], &[])]);
    match indexer.finish() {
        Err(IndexerError::Flush(FlushError::Partial { stats, failures })) => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].path().starts_with(&body_dir));
            // Index files are still written for every key.
            assert_eq!(stats.overall().index_files, 4);
            assert_eq!(stats.overall().entries, 1);
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
}

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("kiokun-import")
        .join("tests")
        .join("fixtures")
        .join("dictionaries")
}

#[test]
fn imported_fixtures_index_end_to_end() {
    let imported = Registry::with_defaults(fixture_dir())
        .import(&Selection::all(), LoadMode::Owned)
        .expect("import fixtures");
    let (entries, ids) = imported.into_entries();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let indexer = ShardedIndexer::new(
        OutputLayout::new(&out),
        Arc::new(PlainJson),
        Arc::new(ids),
        config(2),
    )
    .unwrap();
    indexer.process_entries(&entries);
    let stats = indexer.finish().expect("flush");
    assert_eq!(stats.overall().entries, entries.len());

    let reader = IndexReader::new(OutputLayout::new(&out), Arc::new(PlainJson));
    let hi = reader.lookup("日").unwrap().merged();
    assert_eq!(hi.exact[&DictKind::Kanji].len(), 1);
    assert_eq!(hi.exact[&DictKind::ChineseChar].len(), 1);
    assert_eq!(hi.contained[&DictKind::Word].len(), 1);
    assert_eq!(hi.contained[&DictKind::ChineseWord].len(), 1);

    let kanji_body = reader
        .entry(ShardClass::Han1, DictKind::Kanji, hi.exact[&DictKind::Kanji][0])
        .unwrap()
        .unwrap();
    assert_eq!(kanji_body["ids"], "⿰丨⿱𠃌二");

    let cat = reader.resolve("猫").unwrap();
    assert_eq!(cat.len(), 1);
    assert_eq!(cat[0].kind, DictKind::ChineseChar);
    assert_eq!(cat[0].body["traditional"], "貓");
}

fn chinese_word(id: &str, text: &str) -> Entry {
    Entry::from(ChineseWord {
        id: id.into(),
        traditional: text.into(),
        simplified: text.into(),
        ..Default::default()
    })
}

#[test]
fn colliding_postings_from_different_shards_both_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let indexer = plain_indexer(&out, 2);
    // Sharded ids 028 and 28 both post as 28.
    let tshirt = chinese_word("28", "T恤");
    let shirt = chinese_word("8", "恤衫");
    assert_eq!(ShardedId::for_entry(&tshirt).posting(), 28);
    assert_eq!(ShardedId::for_entry(&shirt).posting(), 28);
    indexer.process_entries(&[tshirt, shirt]);
    let stats = indexer.finish().expect("flush");
    assert_eq!(stats.overall().entries, 2);

    let reader = IndexReader::new(OutputLayout::new(&out), Arc::new(PlainJson));
    let found = reader.lookup("恤").unwrap();
    assert_eq!(found.shards.len(), 2);
    assert!(found.get(ShardClass::NonHan).is_some());
    assert!(found.get(ShardClass::Han2).is_some());

    let resolved = reader.resolve("恤").unwrap();
    let mut texts: Vec<_> = resolved
        .iter()
        .map(|r| r.body["traditional"].as_str().unwrap().to_string())
        .collect();
    texts.sort();
    assert_eq!(texts, ["T恤", "恤衫"]);
}

#[test]
fn entries_with_non_numeric_ids_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let indexer = plain_indexer(&out, 2);
    let entries = [word("すし", &[], &["すし"]), word("らーめん", &[], &["らーめん"])];
    indexer.process_entries(&entries);
    indexer.finish().expect("flush");

    let reader = IndexReader::new(OutputLayout::new(&out), Arc::new(PlainJson));
    for key in ["すし", "らーめん"] {
        let resolved = reader.resolve(key).unwrap();
        assert_eq!(resolved.len(), 1, "{key}");
        assert_eq!(resolved[0].shard, ShardClass::NonHan);
        assert_eq!(resolved[0].body["id"], key);
    }
}
