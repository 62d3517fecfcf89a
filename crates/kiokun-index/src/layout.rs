use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use kiokun_types::{DictKind, ShardClass};

use crate::error::IndexerError;

/// Output directory tree: `<base>_non_han`, `<base>_han_1char`, ... each
/// with an `index/` directory and one body directory per dictionary tag.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    base: PathBuf,
}

impl OutputLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn shard_dir(&self, shard: ShardClass) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        name.push(shard.dir_suffix());
        PathBuf::from(name)
    }

    pub fn index_dir(&self, shard: ShardClass) -> PathBuf {
        self.shard_dir(shard).join("index")
    }

    pub fn body_dir(&self, shard: ShardClass, kind: DictKind) -> PathBuf {
        self.shard_dir(shard).join(kind.tag())
    }

    pub fn index_path(&self, shard: ShardClass, key: &str, ext: &str) -> PathBuf {
        self.index_dir(shard).join(format!("{}.{ext}", key_file_stem(key)))
    }

    pub fn body_path(&self, shard: ShardClass, kind: DictKind, sharded_id: &str, ext: &str) -> PathBuf {
        self.body_dir(shard, kind).join(format!("{}.{ext}", key_file_stem(sharded_id)))
    }

    /// Create every shard directory and its subdirectories.
    pub fn create_all(&self) -> Result<(), IndexerError> {
        for shard in ShardClass::ALL {
            let dirs = std::iter::once(self.index_dir(shard))
                .chain(DictKind::ALL.into_iter().map(|kind| self.body_dir(shard, kind)));
            for dir in dirs {
                fs::create_dir_all(&dir).map_err(|source| IndexerError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

/// File stem for a lookup key.
///
/// Keys are used verbatim except for the bytes a path component cannot
/// hold: `%`, `/`, `\` and NUL are percent-escaped, and the keys `.` and
/// `..` are escaped whole.
pub fn key_file_stem(key: &str) -> String {
    if key == "." || key == ".." {
        return key.replace('.', "%2E");
    }
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '\0' => out.push_str("%00"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`key_file_stem`].
pub fn key_from_file_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut rest = stem;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let escaped = rest.get(pos + 1..pos + 3);
        let decoded = match escaped {
            Some("25") => Some('%'),
            Some("2F") => Some('/'),
            Some("5C") => Some('\\'),
            Some("00") => Some('\0'),
            Some("2E") => Some('.'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[pos + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
