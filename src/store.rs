//! The name → [`Entry`] mapping owned by an archive.
//!
//! Names are unique by construction.  `list()` returns names in ascending
//! order, but callers that need the wire order must sort for themselves, as
//! the constructor does.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::entry::Entry;
use crate::error::{MparError, MparResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: BTreeMap<String, Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert `entry` under `name`.  Fails with `KeyExists` when the name is
    /// taken and `overwrite` is false; the existing entry is left untouched.
    pub fn push(&mut self, name: impl Into<String>, entry: Entry, overwrite: bool) -> MparResult<()> {
        let name = name.into();
        if !overwrite && self.exists(&name) {
            return Err(MparError::KeyExists(name));
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Push raw bytes (or a string) as an entry without metadata.
    pub fn push_bytes(
        &mut self,
        name:      impl Into<String>,
        content:   impl AsRef<[u8]>,
        overwrite: bool,
    ) -> MparResult<()> {
        self.push(name, Entry::new(content.as_ref().to_vec()), overwrite)
    }

    /// Read `path` and push its contents under the path string itself.
    pub fn push_file(&mut self, path: impl AsRef<Path>, overwrite: bool) -> MparResult<()> {
        let path = path.as_ref();
        let name = path.to_string_lossy().into_owned();
        self.push_file_as(name, path, overwrite)
    }

    /// Read `path` and push its contents under `name`.
    pub fn push_file_as(
        &mut self,
        name:      impl Into<String>,
        path:      impl AsRef<Path>,
        overwrite: bool,
    ) -> MparResult<()> {
        let name = name.into();
        if !overwrite && self.exists(&name) {
            return Err(MparError::KeyExists(name));
        }
        let path = path.as_ref();
        let content = fs::read(path).map_err(|e| MparError::file(path, e))?;
        self.push(name, Entry::new(content), overwrite)
    }

    /// Remove and return the entry stored under `name`.
    pub fn pop(&mut self, name: &str) -> MparResult<Entry> {
        self.entries
            .remove(name)
            .ok_or_else(|| MparError::KeyNotExists(name.to_owned()))
    }

    pub fn peek(&self, name: &str) -> MparResult<&Entry> {
        self.entries
            .get(name)
            .ok_or_else(|| MparError::KeyNotExists(name.to_owned()))
    }

    pub fn peek_mut(&mut self, name: &str) -> MparResult<&mut Entry> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| MparError::KeyNotExists(name.to_owned()))
    }

    /// Exchange the entries stored under `a` and `b`; both names survive.
    pub fn swap(&mut self, a: &str, b: &str) -> MparResult<()> {
        if !self.exists(a) {
            return Err(MparError::KeyNotExists(a.to_owned()));
        }
        if !self.exists(b) {
            return Err(MparError::KeyNotExists(b.to_owned()));
        }
        if a == b {
            return Ok(());
        }
        let first = self.pop(a)?;
        let second = self.pop(b)?;
        self.entries.insert(a.to_owned(), second);
        self.entries.insert(b.to_owned(), first);
        Ok(())
    }

    /// Duplicate `src` under `dst`.
    pub fn copy(&mut self, src: &str, dst: &str, overwrite: bool) -> MparResult<()> {
        let entry = self.peek(src)?.clone();
        if src == dst {
            return if overwrite { Ok(()) } else { Err(MparError::KeyExists(dst.to_owned())) };
        }
        self.push(dst, entry, overwrite)
    }

    /// Move `src` to `dst`.
    pub fn rename(&mut self, src: &str, dst: &str, overwrite: bool) -> MparResult<()> {
        self.copy(src, dst, overwrite)?;
        if src != dst {
            self.pop(src)?;
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` into `self`, replacing same-named ones.
    pub(crate) fn absorb(&mut self, other: EntryStore) {
        self.entries.extend(other.entries);
    }
}
