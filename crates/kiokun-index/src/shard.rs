//! Shard classification and sharded identifiers.

use std::fmt;
use std::hash::Hasher;

use fnv::FnvHasher;
use kiokun_types::{Entry, ShardClass, is_han};

/// Shard of an entry, computed from its primary text.
pub fn shard_of(entry: &Entry) -> ShardClass {
    classify_text(entry.primary_text())
}

/// Classify `text` by script and length: any non-Han character makes it
/// [`ShardClass::NonHan`]; otherwise the number of characters picks the class.
/// The empty string is `NonHan`.
pub fn classify_text(text: &str) -> ShardClass {
    let mut count = 0usize;
    for c in text.chars() {
        if !is_han(c) {
            return ShardClass::NonHan;
        }
        count += 1;
    }
    match count {
        0 => ShardClass::NonHan,
        1 => ShardClass::Han1,
        2 => ShardClass::Han2,
        _ => ShardClass::Han3Plus,
    }
}

/// An entry id prefixed with its shard digit, e.g. shard 2 + `"4057102"` is `"24057102"`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShardedId {
    shard: ShardClass,
    value: String,
}

impl ShardedId {
    pub fn new(shard: ShardClass, original_id: &str) -> Self {
        let mut value = String::with_capacity(original_id.len() + 1);
        value.push(char::from(b'0' + shard.digit()));
        value.push_str(original_id);
        Self { shard, value }
    }

    pub fn for_entry(entry: &Entry) -> Self {
        Self::new(shard_of(entry), entry.id())
    }

    /// Split a sharded id string back into its shard and original id.
    pub fn parse(raw: &str) -> Option<Self> {
        let first = *raw.as_bytes().first()?;
        let shard = ShardClass::from_digit(first.checked_sub(b'0')?)?;
        Some(Self {
            shard,
            value: raw.to_string(),
        })
    }

    pub fn shard(&self) -> ShardClass {
        self.shard
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn original_id(&self) -> &str {
        &self.value[1..]
    }

    /// Numeric postings value: the sharded id parsed as `i64`, or the FNV-1a
    /// 64-bit hash of the id string when it is not a decimal integer.
    ///
    /// The hash path can in principle collide; every bundled source
    /// produces numeric ids, so it is not taken in practice.
    pub fn posting(&self) -> i64 {
        self.value
            .parse::<i64>()
            .unwrap_or_else(|_| fnv_posting(&self.value))
    }

    /// File stem of the entry body, see [`body_file_stem`].
    pub fn file_stem(&self) -> String {
        body_file_stem(self.shard, self.posting())
    }
}

impl fmt::Display for ShardedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

fn fnv_posting(raw: &str) -> i64 {
    let mut hasher = FnvHasher::default();
    hasher.write(raw.as_bytes());
    hasher.finish() as i64
}

/// Body file stem for `posting` in `shard`.
///
/// Bodies are named after the posting rather than the raw sharded id, so a
/// reader holding only the shard and the posting finds them, hashed ids
/// included. For numeric ids the two agree: the non-Han `0` digit that the
/// integer drops is put back.
pub fn body_file_stem(shard: ShardClass, posting: i64) -> String {
    match shard {
        ShardClass::NonHan => format!("0{posting}"),
        _ => posting.to_string(),
    }
}
