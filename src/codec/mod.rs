//! The MPAR text codec.
//!
//! # Construction
//! [`construct`] emits the header (`MAGIC;VERSION$JSON>`), one
//! `CRC%JSON\n` line per entry sorted by base64 filename in descending
//! order, then `@` and `~`.  Content, names and metadata are base64 encoded
//! so the document stays line oriented whatever the entries hold.
//!
//! # Parsing
//! [`parse`] cuts the input at the first `>` and the last `@` and validates
//! the three sections independently.  Every entry is checked on up to three
//! layers: the CRC of its JSON record, the CRC of its raw content and, from
//! v2 on, the CRC of the base64 blob text.  Any mismatch fails the whole
//! parse; there is no best-effort recovery.
//!
//! # Versions
//! Readers accept any version up to [`MPAR_VERSION`](crate::format::MPAR_VERSION).
//! Version 2 adds `crcsum.processed`, per-entry `metadata` and the header's
//! `extra` object.  Fields are only ever added, never removed or renamed.

mod construct;
pub mod lines;
mod parse;

pub use construct::construct;
pub use lines::{entry_lines, EntryLine, EntryLines};
pub use parse::{parse, Parsed};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::store::EntryStore;
    use std::collections::BTreeMap;

    #[test]
    fn v2_roundtrip_keeps_metadata() {
        let mut store = EntryStore::new();
        store
            .push("bin/data", Entry::new(vec![0u8, 255, 10, 37, 64]).with_metadata("mode", "0644"), false)
            .unwrap();
        store.push_bytes("empty", "", false).unwrap();
        let mut extra = BTreeMap::new();
        extra.insert("author".to_string(), "mxpsql".to_string());

        let text = construct(&store, &extra, 2).unwrap();
        let parsed = parse(text.as_bytes()).unwrap();

        assert_eq!(parsed.version, 2);
        assert_eq!(parsed.extra, extra);
        assert_eq!(parsed.entries, store);
    }

    #[test]
    fn v1_drops_metadata() {
        let mut store = EntryStore::new();
        store.push("a", Entry::new(b"x".to_vec()).with_metadata("k", "v"), false).unwrap();

        let text = construct(&store, &BTreeMap::new(), 1).unwrap();
        let parsed = parse(text.as_bytes()).unwrap();

        let entry = parsed.entries.peek("a").unwrap();
        assert_eq!(entry.content, b"x");
        assert!(entry.metadata.is_empty());
    }
}
