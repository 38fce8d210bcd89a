//! Wire-format constants.
//!
//! ```text
//! MAGIC ';' VERSION '$' HEADER_JSON '>'
//! { CRC32(entry_json) '%' entry_json '\n' }*
//! '@' '~'
//! ```
//!
//! These values are fixed for interoperability with every other MPAR
//! implementation.  They are never configured per archive.

/// Identifies the byte stream; must match byte for byte.
pub const MAGIC: &str = "MXPSQL's Portable Archive";

/// Highest format version this build reads and writes.
pub const MPAR_VERSION: u64 = 2;

/// First version with per-entry metadata, `crcsum.processed` and the
/// global `extra` header object.
pub const EXTENSIBLE_VERSION: u64 = 2;

/// Between the magic string and the version number.
pub const MAGIC_SEPARATOR: char = ';';
/// Between the version number and the header JSON.
pub const META_SEPARATOR: char = '$';
/// Ends the header; entries start right after it.
pub const BEGIN_ENTRY_MARKER: char = '>';
/// Between an entry's record checksum and its JSON.
pub const CHECKSUM_SEPARATOR: char = '%';
/// Terminates each entry line.
pub const ENTRY_SEPARATOR: char = '\n';
/// Follows the last entry.
pub const END_OF_ENTRIES_MARKER: char = '@';
/// Final character of the archive.
pub const END_OF_ARCHIVE_MARKER: char = '~';
/// Entry lines starting with this are ignored by the parser.
pub const COMMENT_MARKER: char = '#';

// JSON field names.
pub const FIELD_FILENAME:  &str = "filename";
pub const FIELD_BLOB:      &str = "blob";
pub const FIELD_CRCSUM:    &str = "crcsum";
pub const FIELD_PROCESSED: &str = "crcsum.processed";
pub const FIELD_METADATA:  &str = "metadata";
pub const FIELD_ENCRYPT:   &str = "encrypt";
pub const FIELD_EXTRA:     &str = "extra";

/// Whether archives of `version` carry the v2 extensions.
#[inline]
pub fn is_extensible(version: u64) -> bool {
    version >= EXTENSIBLE_VERSION
}
