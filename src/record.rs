//! JSON records embedded in the archive text.
//!
//! Serialization goes through [`EntryRecord`] and [`HeaderMeta`], whose
//! field declaration order fixes the key order of the emitted JSON.
//! Deserialization goes through lenient `Raw*` helpers so that missing
//! fields can be reported as a structural error instead of a serde error,
//! and so that checksums written as JSON numbers are accepted as well as the
//! canonical decimal strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::checksum::parse_crc;
use crate::encoding;
use crate::entry::Entry;
use crate::error::{MparError, MparResult};
use crate::format::{FIELD_BLOB, FIELD_CRCSUM, FIELD_FILENAME, FIELD_METADATA, FIELD_PROCESSED};

/// Base64 key → base64 value, as stored on the wire.
pub type EncodedMap = BTreeMap<String, String>;

// ── Entry record ──────────────────────────────────────────────────────────────

/// One entry line's JSON, in wire form.
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    pub filename:  String,
    pub blob:      String,
    pub crcsum:    String,
    #[serde(rename = "crcsum.processed", skip_serializing_if = "Option::is_none")]
    pub processed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata:  Option<EncodedMap>,
}

impl EntryRecord {
    /// Build the wire form of `entry`; the v2 fields are filled only when
    /// `extensible` is set.
    pub fn from_entry(name: &str, entry: &Entry, extensible: bool) -> Self {
        let blob = encoding::encode(&entry.content);
        let crcsum = entry.crc32().to_string();
        let (processed, metadata) = if extensible {
            (
                Some(crate::checksum::crc32(blob.as_bytes()).to_string()),
                Some(encode_map(&entry.metadata)),
            )
        } else {
            (None, None)
        };
        Self {
            filename: encoding::encode(name),
            blob,
            crcsum,
            processed,
            metadata,
        }
    }
}

/// Checksums may appear as `"123"` or `123`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CrcField {
    Text(String),
    Number(u64),
}

impl CrcField {
    pub(crate) fn value(&self, field: &str) -> MparResult<u32> {
        let parsed = match self {
            CrcField::Text(s)   => parse_crc(s),
            CrcField::Number(n) => u32::try_from(*n).ok(),
        };
        parsed.ok_or_else(|| MparError::not_archive(format!("field {field:?} is not a CRC32 value")))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEntryRecord {
    #[serde(default)]
    pub filename:  Option<String>,
    #[serde(default)]
    pub blob:      Option<String>,
    #[serde(default)]
    pub crcsum:    Option<CrcField>,
    #[serde(default, rename = "crcsum.processed")]
    pub processed: Option<CrcField>,
    #[serde(default)]
    pub metadata:  Option<EncodedMap>,
}

impl RawEntryRecord {
    pub(crate) fn filename(&self) -> MparResult<&str> {
        require(self.filename.as_deref(), FIELD_FILENAME)
    }

    pub(crate) fn blob(&self) -> MparResult<&str> {
        require(self.blob.as_deref(), FIELD_BLOB)
    }

    pub(crate) fn crcsum(&self) -> MparResult<u32> {
        require(self.crcsum.as_ref(), FIELD_CRCSUM)?.value(FIELD_CRCSUM)
    }

    pub(crate) fn processed(&self) -> MparResult<u32> {
        require(self.processed.as_ref(), FIELD_PROCESSED)?.value(FIELD_PROCESSED)
    }

    pub(crate) fn metadata(&self) -> MparResult<&EncodedMap> {
        require(self.metadata.as_ref(), FIELD_METADATA)
    }
}

// ── Header ────────────────────────────────────────────────────────────────────

/// The JSON object between `$` and `>`.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderMeta {
    /// Cipher chain applied to entry blobs.  Always empty; encryption is not
    /// part of the codec.
    pub encrypt: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra:   Option<EncodedMap>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHeaderMeta {
    #[serde(default)]
    pub encrypt: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub extra:   Option<EncodedMap>,
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn require<T>(value: Option<T>, field: &str) -> MparResult<T> {
    value.ok_or_else(|| MparError::not_archive(format!("missing field {field:?}")))
}

pub fn encode_map(map: &BTreeMap<String, String>) -> EncodedMap {
    map.iter()
        .map(|(k, v)| (encoding::encode(k), encoding::encode(v)))
        .collect()
}

pub fn decode_map(map: &EncodedMap, field: &str) -> MparResult<BTreeMap<String, String>> {
    map.iter()
        .map(|(k, v)| Ok((encoding::decode_string(field, k)?, encoding::decode_string(field, v)?)))
        .collect()
}
