use std::collections::BTreeMap;

use crate::checksum::crc32;

/// One packed file: its decoded bytes plus free-form metadata.
///
/// Metadata is only written to archives of version 2 or later; on a v1
/// archive it is silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub content:  Vec<u8>,
    pub metadata: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self { content: content.into(), metadata: BTreeMap::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// CRC-32 of the raw content.
    pub fn crc32(&self) -> u32 {
        crc32(&self.content)
    }
}
