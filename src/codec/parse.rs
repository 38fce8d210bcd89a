use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::lines::{entry_lines, EntryLine};
use crate::checksum::{crc32, parse_crc};
use crate::encoding;
use crate::entry::Entry;
use crate::error::{ChecksumKind, MparError, MparResult};
use crate::format::*;
use crate::record::{decode_map, RawEntryRecord, RawHeaderMeta};
use crate::store::EntryStore;

/// Everything recovered from one archive text.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub version: u64,
    pub extra:   BTreeMap<String, String>,
    pub entries: EntryStore,
}

/// Parse a complete archive.  Nothing is returned unless every section and
/// every checksum validates.
pub fn parse(input: &[u8]) -> MparResult<Parsed> {
    let (header, body, footer) = split_sections(input)?;

    let (version, extra) = parse_header(header)?;
    let entries = parse_entries(body, version)?;
    parse_footer(footer)?;

    debug!(version, entries = entries.len(), bytes = input.len(), "parsed archive");
    Ok(Parsed { version, extra, entries })
}

/// Split at the first header-end marker and the last end-of-entries marker.
fn split_sections(input: &[u8]) -> MparResult<(&[u8], &[u8], &[u8])> {
    let begin = input
        .iter()
        .position(|b| *b == BEGIN_ENTRY_MARKER as u8)
        .ok_or_else(|| MparError::not_archive("no header end marker"))?;
    let end = input
        .iter()
        .rposition(|b| *b == END_OF_ENTRIES_MARKER as u8)
        .ok_or_else(|| MparError::not_archive("no end of entries marker"))?;
    if begin >= end {
        return Err(MparError::not_archive("end of entries marker precedes header end"));
    }
    Ok((&input[..begin], &input[begin + 1..end], &input[end + 1..]))
}

// ── Header ────────────────────────────────────────────────────────────────────

fn parse_header(header: &[u8]) -> MparResult<(u64, BTreeMap<String, String>)> {
    let header = std::str::from_utf8(header)
        .map_err(|_| MparError::not_archive("header is not UTF-8"))?;

    let (magic, rest) = header
        .split_once(MAGIC_SEPARATOR)
        .ok_or_else(|| MparError::not_archive("no magic separator"))?;
    if magic != MAGIC {
        return Err(MparError::not_archive("magic number mismatch"));
    }

    let (version_text, meta_text) = rest
        .split_once(META_SEPARATOR)
        .ok_or_else(|| MparError::not_archive("no metadata separator"))?;
    let version = parse_version(version_text)?;

    let meta: RawHeaderMeta = serde_json::from_str(meta_text)
        .map_err(|e| MparError::not_archive(format!("header metadata: {e}")))?;
    if meta.encrypt.is_none() {
        return Err(MparError::not_archive(format!("header missing {FIELD_ENCRYPT:?}")));
    }

    let extra = if is_extensible(version) {
        let encoded = meta
            .extra
            .as_ref()
            .ok_or_else(|| MparError::not_archive(format!("header missing {FIELD_EXTRA:?}")))?;
        decode_map(encoded, FIELD_EXTRA)?
    } else {
        BTreeMap::new()
    };
    Ok((version, extra))
}

fn parse_version(text: &str) -> MparResult<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MparError::InvalidVersion(text.to_owned()));
    }
    let version: u64 = match text.parse() {
        Ok(v) => v,
        // All digits but too large for u64: certainly newer than us.
        Err(_) => u64::MAX,
    };
    if version > MPAR_VERSION {
        return Err(MparError::VersionTooNew { found: version, supported: MPAR_VERSION });
    }
    Ok(version)
}

// ── Entries ───────────────────────────────────────────────────────────────────

fn parse_entries(body: &[u8], version: u64) -> MparResult<EntryStore> {
    let mut store = EntryStore::new();
    for line in entry_lines(body) {
        let (name, entry) = parse_entry(line?, version)?;
        // Later lines replace earlier ones with the same name.
        store.push(name, entry, true)?;
    }
    Ok(store)
}

fn parse_entry(line: EntryLine<'_>, version: u64) -> MparResult<(String, Entry)> {
    let n = line.number;
    let stored = parse_crc(line.checksum)
        .ok_or_else(|| MparError::not_archive(format!("entry line {n}: bad record checksum")))?;
    verify(ChecksumKind::EntryRecord, stored, crc32(line.json), n)?;

    let raw: RawEntryRecord = serde_json::from_slice(line.json)
        .map_err(|e| MparError::not_archive(format!("entry line {n}: {e}")))?;

    let name = encoding::decode_string(FIELD_FILENAME, raw.filename()?)?;
    let blob = raw.blob()?;
    let content_crc = raw.crcsum()?;

    let mut entry = Entry::default();
    if is_extensible(version) {
        verify(ChecksumKind::Processed, raw.processed()?, crc32(blob.as_bytes()), n)?;
        entry.metadata = decode_map(raw.metadata()?, FIELD_METADATA)?;
    }

    entry.content = encoding::decode(blob)
        .map_err(|e| MparError::not_archive(format!("entry line {n}: {e}")))?;
    verify(ChecksumKind::Content, content_crc, entry.crc32(), n)?;

    Ok((name, entry))
}

fn verify(which: ChecksumKind, expected: u32, actual: u32, line: usize) -> MparResult<()> {
    if expected != actual {
        warn!(%which, expected, actual, line, "checksum mismatch");
        return Err(MparError::ChecksumMismatch { which, expected, actual });
    }
    Ok(())
}

// ── Footer ────────────────────────────────────────────────────────────────────

fn parse_footer(footer: &[u8]) -> MparResult<()> {
    let marker = footer.iter().copied().filter(|b| !b.is_ascii_whitespace());
    if !marker.eq([END_OF_ARCHIVE_MARKER as u8]) {
        return Err(MparError::not_archive("missing end of archive marker"));
    }
    Ok(())
}
