//! On-disk payload encoding.
//!
//! Every file the indexer writes is JSON passed through a [`Codec`]. The
//! reader uses the same codec value, so both sides agree on the format and
//! the file extension.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CodecError, ReadError, StoreError};

/// Zstd level used when none is configured.
pub const DEFAULT_ZSTD_LEVEL: i32 = 19;

pub trait Codec: Send + Sync + fmt::Debug {
    /// File extension without the leading dot, e.g. `json.zst`.
    fn extension(&self) -> &'static str;

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Zstd-compressed JSON.
#[derive(Clone, Copy, Debug)]
pub struct ZstdJson {
    level: i32,
}

impl ZstdJson {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdJson {
    fn default() -> Self {
        Self::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl Codec for ZstdJson {
    fn extension(&self) -> &'static str {
        "json.zst"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(zstd::encode_all(raw, self.level)?)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(zstd::decode_all(data)?)
    }
}

/// Uncompressed JSON, handy for inspecting output by hand.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainJson;

impl Codec for PlainJson {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}

/// Serialise `value` to JSON and run it through `codec`.
pub fn encode<T: Serialize + ?Sized>(codec: &dyn Codec, value: &T) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(value)?;
    codec.compress(&json)
}

pub fn decode<T: DeserializeOwned>(codec: &dyn Codec, data: &[u8]) -> Result<T, CodecError> {
    let json = codec.decompress(data)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Encode `value` and write it to `path`, replacing any existing file.
pub fn write_file<T: Serialize + ?Sized>(
    codec: &dyn Codec,
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = encode(codec, value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_file<T: DeserializeOwned>(codec: &dyn Codec, path: &Path) -> Result<T, ReadError> {
    let data = fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(codec, &data).map_err(|source| ReadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Codec selector for configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CodecKind {
    #[default]
    Zstd,
    Json,
}

impl CodecKind {
    pub fn build(self, zstd_level: i32) -> Arc<dyn Codec> {
        match self {
            CodecKind::Zstd => Arc::new(ZstdJson::new(zstd_level)),
            CodecKind::Json => Arc::new(PlainJson),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodecKind::Zstd => "zstd",
            CodecKind::Json => "json",
        })
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "zstd" | "zst" => Ok(CodecKind::Zstd),
            "json" | "plain" => Ok(CodecKind::Json),
            other => Err(format!("unknown codec {other}, expected zstd or json")),
        }
    }
}
