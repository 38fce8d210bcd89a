pub mod error;
pub mod checksum;
pub mod encoding;
pub mod format;
pub mod record;
pub mod entry;
pub mod store;
pub mod codec;
pub mod extract;
pub mod archive;

pub use error::{ChecksumKind, ErrorKind, MparError, MparResult};
pub use entry::Entry;
pub use store::EntryStore;
pub use archive::{Archive, ArchiveOptions};
pub use extract::ExtractOptions;
pub use format::{MAGIC, MPAR_VERSION};
