use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::debug;

use crate::checksum::crc32;
use crate::error::{MparError, MparResult};
use crate::format::*;
use crate::record::{encode_map, EntryRecord, HeaderMeta};
use crate::store::EntryStore;

/// Serialize `entries` and `extra` as an archive of `version`.
pub fn construct(
    entries: &EntryStore,
    extra:   &BTreeMap<String, String>,
    version: u64,
) -> MparResult<String> {
    if version == 0 || version > MPAR_VERSION {
        return Err(MparError::InvalidArgument(format!(
            "cannot write version {version}, supported range is 1..={MPAR_VERSION}"
        )));
    }

    let mut out = construct_header(extra, version)?;
    construct_entries(&mut out, entries, version)?;
    construct_footer(&mut out);

    debug!(version, entries = entries.len(), bytes = out.len(), "constructed archive");
    Ok(out)
}

fn construct_header(extra: &BTreeMap<String, String>, version: u64) -> MparResult<String> {
    let meta = HeaderMeta {
        encrypt: Vec::new(),
        extra:   is_extensible(version).then(|| encode_map(extra)),
    };
    let json = serde_json::to_string(&meta)
        .map_err(|e| MparError::ConstructionFailed(format!("header metadata: {e}")))?;
    Ok(format!("{MAGIC}{MAGIC_SEPARATOR}{version}{META_SEPARATOR}{json}{BEGIN_ENTRY_MARKER}"))
}

fn construct_entries(out: &mut String, entries: &EntryStore, version: u64) -> MparResult<()> {
    let extensible = is_extensible(version);
    let mut records: Vec<EntryRecord> = entries
        .iter()
        .map(|(name, entry)| EntryRecord::from_entry(name, entry, extensible))
        .collect();

    // Descending by encoded filename; other implementations emit this order.
    records.sort_by(|a, b| b.filename.cmp(&a.filename));

    for record in &records {
        let json = serde_json::to_string(record)
            .map_err(|e| MparError::ConstructionFailed(format!("entry {:?}: {e}", record.filename)))?;
        let entry_crc = crc32(json.as_bytes());
        // Writing into a String cannot fail.
        let _ = write!(out, "{entry_crc}{CHECKSUM_SEPARATOR}{json}{ENTRY_SEPARATOR}");
    }
    out.push(END_OF_ENTRIES_MARKER);
    Ok(())
}

fn construct_footer(out: &mut String) {
    out.push(END_OF_ARCHIVE_MARKER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    #[test]
    fn single_entry_v1_layout() {
        let mut store = EntryStore::new();
        store.push_bytes("a.txt", "hello", false).unwrap();
        let text = construct(&store, &BTreeMap::new(), 1).unwrap();

        let json = r#"{"filename":"YS50eHQ=","blob":"aGVsbG8=","crcsum":"907060870"}"#;
        let expected = format!(
            "MXPSQL's Portable Archive;1${{\"encrypt\":[]}}>{}%{}\n@~",
            crc32(json.as_bytes()),
            json
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_store_v1() {
        let text = construct(&EntryStore::new(), &BTreeMap::new(), 1).unwrap();
        assert_eq!(text, "MXPSQL's Portable Archive;1${\"encrypt\":[]}>@~");
    }

    #[test]
    fn v2_header_carries_encoded_extra() {
        let mut extra = BTreeMap::new();
        extra.insert("k".to_string(), "v".to_string());
        let text = construct(&EntryStore::new(), &extra, 2).unwrap();
        assert_eq!(
            text,
            "MXPSQL's Portable Archive;2${\"encrypt\":[],\"extra\":{\"aw==\":\"dg==\"}}>@~"
        );
    }

    #[test]
    fn v1_header_omits_extra() {
        let mut extra = BTreeMap::new();
        extra.insert("k".to_string(), "v".to_string());
        let text = construct(&EntryStore::new(), &extra, 1).unwrap();
        assert!(!text.contains("extra"));
    }

    #[test]
    fn entries_sorted_by_encoded_name_descending() {
        let mut store = EntryStore::new();
        for name in ["a", "b", "c"] {
            store.push(name, Entry::new(name.as_bytes().to_vec()), false).unwrap();
        }
        let text = construct(&store, &BTreeMap::new(), 1).unwrap();
        // "Yw==" > "Yg==" > "YQ=="
        let c = text.find("\"Yw==\"").unwrap();
        let b = text.find("\"Yg==\"").unwrap();
        let a = text.find("\"YQ==\"").unwrap();
        assert!(c < b && b < a);
    }

    #[test]
    fn rejects_unsupported_versions() {
        let store = EntryStore::new();
        assert!(matches!(construct(&store, &BTreeMap::new(), 0), Err(MparError::InvalidArgument(_))));
        assert!(matches!(
            construct(&store, &BTreeMap::new(), MPAR_VERSION + 1),
            Err(MparError::InvalidArgument(_))
        ));
    }
}
