//! Error type shared by every layer of the crate.
//!
//! Each variant is one leaf failure kind.  Checksum failures carry a
//! [`ChecksumKind`] saying which of the three integrity layers rejected the
//! input, together with the stored and recomputed values.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which integrity layer a checksum mismatch was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// CRC32 of the serialized entry JSON, written before the `%` separator.
    EntryRecord,
    /// CRC32 of the raw (decoded) entry content, the `crcsum` field.
    Content,
    /// CRC32 of the base64 blob text, the `crcsum.processed` field (v2+).
    Processed,
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChecksumKind::EntryRecord => "entry record",
            ChecksumKind::Content     => "content",
            ChecksumKind::Processed   => "encoded content",
        })
    }
}

#[derive(Error, Debug)]
pub enum MparError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Entry already exists: {0}")]
    KeyExists(String),
    #[error("Entry does not exist: {0}")]
    KeyNotExists(String),
    #[error("File error on {}: {source}", .path.display())]
    File {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Not an MPAR archive: {0}")]
    NotAnArchive(String),
    #[error("Invalid archive version: {0:?}")]
    InvalidVersion(String),
    #[error("Archive version {found} is newer than the supported version {supported}")]
    VersionTooNew { found: u64, supported: u64 },
    #[error("Checksum mismatch on {which}: stored {expected}, computed {actual}")]
    ChecksumMismatch {
        which:    ChecksumKind,
        expected: u32,
        actual:   u32,
    },
    #[error("Archive construction failed: {0}")]
    ConstructionFailed(String),
    /// Extraction stopped because `missing_dir` does not exist while its
    /// parent does; create it (non-recursively is enough) and call
    /// extraction again.
    #[error("Operation partially completed, missing directory {}", .missing_dir.display())]
    OperationPartial { missing_dir: PathBuf },
}

/// Category of an [`MparError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    KeyExists,
    KeyNotExists,
    File,
    NotAnArchive,
    InvalidVersion,
    VersionTooNew,
    ChecksumMismatch,
    ConstructionFailed,
    OperationPartial,
}

impl MparError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MparError::InvalidArgument(_)        => ErrorKind::InvalidArgument,
            MparError::KeyExists(_)              => ErrorKind::KeyExists,
            MparError::KeyNotExists(_)           => ErrorKind::KeyNotExists,
            MparError::File { .. }               => ErrorKind::File,
            MparError::NotAnArchive(_)           => ErrorKind::NotAnArchive,
            MparError::InvalidVersion(_)         => ErrorKind::InvalidVersion,
            MparError::VersionTooNew { .. }      => ErrorKind::VersionTooNew,
            MparError::ChecksumMismatch { .. }   => ErrorKind::ChecksumMismatch,
            MparError::ConstructionFailed(_)     => ErrorKind::ConstructionFailed,
            MparError::OperationPartial { .. }   => ErrorKind::OperationPartial,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MparError::File { path: path.into(), source }
    }

    pub(crate) fn not_archive(reason: impl Into<String>) -> Self {
        MparError::NotAnArchive(reason.into())
    }
}

pub type MparResult<T> = Result<T, MparError>;
