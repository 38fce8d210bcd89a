//! High-level [`Archive`] API — the primary embedding surface.
//!
//! ```no_run
//! use mpar::archive::Archive;
//!
//! // Write
//! let mut ar = Archive::new();
//! ar.entries_mut().push_bytes("readme.txt", "Hello, world!", false)?;
//! ar.write_to("out.mpar")?;
//!
//! // Read
//! let ar = Archive::read_from("out.mpar")?;
//! assert_eq!(ar.entries().peek("readme.txt")?.content, b"Hello, world!");
//! # Ok::<(), mpar::MparError>(())
//! ```
//!
//! An `Archive` carries no lock of its own.  Share one between threads by
//! wrapping it, e.g. in `Arc<Mutex<Archive>>`; independent archives share
//! nothing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::codec;
use crate::error::{MparError, MparResult};
use crate::extract::{self, ExtractOptions};
use crate::format::MPAR_VERSION;
use crate::store::EntryStore;

// ── ArchiveOptions ────────────────────────────────────────────────────────────

/// Configuration for [`Archive::with_options`].
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Format version produced by [`Archive::construct`].
    pub writer_version: u64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self { writer_version: MPAR_VERSION }
    }
}

// ── Archive ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    entries:        EntryStore,
    writer_version: u64,
    loaded_version: u64,
    extra:          BTreeMap<String, String>,
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl Archive {
    // ── Constructors ─────────────────────────────────────────────────────────

    pub fn new() -> Self {
        Self {
            entries:        EntryStore::new(),
            writer_version: MPAR_VERSION,
            loaded_version: MPAR_VERSION,
            extra:          BTreeMap::new(),
        }
    }

    pub fn with_options(opts: ArchiveOptions) -> MparResult<Self> {
        let mut ar = Self::new();
        ar.set_writer_version(opts.writer_version)?;
        ar.loaded_version = opts.writer_version;
        Ok(ar)
    }

    /// Read and parse the archive file at `path`.
    pub fn read_from<P: AsRef<Path>>(path: P) -> MparResult<Self> {
        let mut ar = Self::new();
        ar.load(path)?;
        Ok(ar)
    }

    // ── Entries ──────────────────────────────────────────────────────────────

    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut EntryStore {
        &mut self.entries
    }

    pub fn set_entry_metadata(
        &mut self,
        name:  &str,
        key:   impl Into<String>,
        value: impl Into<String>,
    ) -> MparResult<()> {
        self.entries.peek_mut(name)?.metadata.insert(key.into(), value.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.  Versions and global metadata are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // ── Versions and global metadata ─────────────────────────────────────────

    pub fn writer_version(&self) -> u64 {
        self.writer_version
    }

    pub fn set_writer_version(&mut self, version: u64) -> MparResult<()> {
        if version == 0 || version > MPAR_VERSION {
            return Err(MparError::InvalidArgument(format!(
                "writer version {version} outside 1..={MPAR_VERSION}"
            )));
        }
        self.writer_version = version;
        Ok(())
    }

    /// Version of the last successfully parsed archive, or the writer
    /// version if nothing has been parsed yet.
    pub fn loaded_version(&self) -> u64 {
        self.loaded_version
    }

    pub fn extra_metadata(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(key.into(), value.into());
    }

    pub fn remove_extra(&mut self, key: &str) -> Option<String> {
        self.extra.remove(key)
    }

    // ── Codec ────────────────────────────────────────────────────────────────

    /// Serialize at the configured writer version.
    pub fn construct(&self) -> MparResult<String> {
        self.construct_version(self.writer_version)
    }

    pub fn construct_version(&self, version: u64) -> MparResult<String> {
        codec::construct(&self.entries, &self.extra, version)
    }

    /// Parse `input` into this archive.
    ///
    /// Parsed entries replace same-named existing ones.  The archive is only
    /// touched once the whole input has validated: on error it is left
    /// exactly as it was.
    pub fn parse(&mut self, input: impl AsRef<[u8]>) -> MparResult<()> {
        let parsed = codec::parse(input.as_ref())?;
        self.entries.absorb(parsed.entries);
        self.extra = parsed.extra;
        self.loaded_version = parsed.version;
        Ok(())
    }

    // ── Files ────────────────────────────────────────────────────────────────

    /// Parse the archive file at `path` into this archive.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> MparResult<()> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| MparError::file(path, e))?;
        debug!(path = %path.display(), bytes = data.len(), "loading archive");
        self.parse(data)
    }

    /// Construct at the writer version and write the result to `path`.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> MparResult<()> {
        let path = path.as_ref();
        let text = self.construct()?;
        fs::write(path, text.as_bytes()).map_err(|e| MparError::file(path, e))?;
        debug!(path = %path.display(), bytes = text.len(), "wrote archive");
        Ok(())
    }

    /// Extract every entry into `dest`; see [`crate::extract`].
    pub fn extract<P: AsRef<Path>>(&self, dest: P, opts: ExtractOptions<'_>) -> MparResult<()> {
        extract::extract(&self.entries, dest.as_ref(), opts)
    }

    /// Extract every entry into `dest`, creating directories as needed.
    pub fn extract_all<P: AsRef<Path>>(&self, dest: P) -> MparResult<()> {
        self.extract(dest, ExtractOptions::create_dirs())
    }
}
