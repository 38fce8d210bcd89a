//! CRC-32 (IEEE 802.3, reflected polynomial `0xEDB88320`).
//!
//! Every serialized unit of an archive is guarded by this checksum: the
//! entry record JSON, the raw entry content and, from v2 on, the base64 form
//! of the content.  The table-driven computation itself is provided by
//! `crc32fast`; this module fixes the init/update/finalize contract.

use crc32fast::Hasher;

/// Incremental CRC-32 state.
#[derive(Clone)]
pub struct Crc32 {
    hasher: Hasher,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    /// Fresh state (internal register `0xFFFFFFFF`).
    pub fn new() -> Self {
        Self { hasher: Hasher::new() }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    /// Final value, already XORed with `0xFFFFFFFF`.
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

/// One-shot CRC-32 of `data`.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    let mut state = Crc32::new();
    state.update(data);
    state.finalize()
}

/// Parse a bare decimal CRC string as written in the archive.
pub(crate) fn parse_crc(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok()
}
