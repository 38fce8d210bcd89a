//! Materialize an archive's entries under a destination directory.
//!
//! When an entry's parent directory is missing, extraction either calls the
//! caller's directory creator with the topmost missing directory and retries
//! the entry, or, with no creator installed, stops with
//! [`MparError::OperationPartial`] naming that directory.  Extraction is
//! idempotent, so the caller can create the directory and simply run it
//! again.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::checksum::crc32;
use crate::error::{ChecksumKind, MparError, MparResult};
use crate::store::EntryStore;

/// Directory creator invoked with the topmost missing directory.
pub type DirCreator<'a> = Box<dyn FnMut(&Path) -> io::Result<()> + 'a>;

/// Configuration for [`extract`].
#[derive(Default)]
pub struct ExtractOptions<'a> {
    dir_creator: Option<DirCreator<'a>>,
}

impl<'a> ExtractOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir_creator(mut self, f: impl FnMut(&Path) -> io::Result<()> + 'a) -> Self {
        self.dir_creator = Some(Box::new(f));
        self
    }

    /// Create missing directories with `std::fs::create_dir_all`.
    pub fn create_dirs() -> Self {
        Self::new().with_dir_creator(|dir| fs::create_dir_all(dir))
    }
}

/// Write every entry of `store` to `dest/<name>`, then read it back and
/// check its CRC-32 before moving on.
pub fn extract(store: &EntryStore, dest: &Path, mut opts: ExtractOptions<'_>) -> MparResult<()> {
    for (name, entry) in store.iter() {
        let target = dest.join(relative_path(name)?);
        write_entry(&target, &entry.content, &mut opts)?;

        let written = fs::read(&target).map_err(|e| MparError::file(&target, e))?;
        let expected = entry.crc32();
        let actual = crc32(&written);
        if expected != actual {
            warn!(path = %target.display(), expected, actual, "extracted file failed verification");
            return Err(MparError::ChecksumMismatch { which: ChecksumKind::Content, expected, actual });
        }
        debug!(path = %target.display(), bytes = written.len(), "extracted");
    }
    Ok(())
}

fn write_entry(target: &Path, content: &[u8], opts: &mut ExtractOptions<'_>) -> MparResult<()> {
    let mut last_created: Option<PathBuf> = None;
    loop {
        let err = match fs::write(target, content) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        let missing = match target.parent() {
            Some(dir) if err.kind() == io::ErrorKind::NotFound && !dir.exists() => shallowest_missing(dir),
            _ => return Err(MparError::file(target, err)),
        };
        match opts.dir_creator.as_mut() {
            Some(_) if last_created.as_deref() == Some(missing) => {
                return Err(MparError::file(target, err));
            }
            Some(create) => {
                debug!(dir = %missing.display(), "creating missing directory");
                create(missing).map_err(|e| MparError::file(missing, e))?;
                last_created = Some(missing.to_path_buf());
            }
            None => return Err(MparError::OperationPartial { missing_dir: missing.to_path_buf() }),
        }
    }
}

/// The topmost directory on the way to `dir` that does not exist yet, so a
/// plain non-recursive create is enough to make progress.
fn shallowest_missing(dir: &Path) -> &Path {
    let mut missing = dir;
    while let Some(up) = missing.parent() {
        if up.as_os_str().is_empty() || up.exists() {
            break;
        }
        missing = up;
    }
    missing
}

/// Entry names are `/`-separated relative paths.  Anything that would
/// escape the destination is refused.
fn relative_path(name: &str) -> MparResult<PathBuf> {
    if name.starts_with('/') || Path::new(name).has_root() {
        return Err(MparError::InvalidArgument(format!("entry name {name:?} is an absolute path")));
    }
    let mut path = PathBuf::new();
    for part in name.split('/') {
        match Path::new(part).components().next() {
            None => continue,
            Some(Component::Normal(_)) if Path::new(part).components().count() == 1 => path.push(part),
            Some(Component::CurDir) => continue,
            _ => {
                return Err(MparError::InvalidArgument(format!(
                    "entry name {name:?} is not a relative path"
                )))
            }
        }
    }
    if path.as_os_str().is_empty() {
        return Err(MparError::InvalidArgument(format!("entry name {name:?} is empty")));
    }
    Ok(path)
}
