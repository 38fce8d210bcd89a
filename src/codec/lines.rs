//! Tokenizer for the entries section.
//!
//! The body between `>` and `@` is split on `\n`; every line is trimmed of
//! leading whitespace, blank and `#` lines are dropped, and the remainder is
//! split once on `%` into checksum text and JSON text.  Work is done lazily,
//! one line per `next()`, with no state shared between iterators.

use crate::error::{MparError, MparResult};
use crate::format::{CHECKSUM_SEPARATOR, COMMENT_MARKER, ENTRY_SEPARATOR};

/// One non-comment entry line, borrowed from the archive text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLine<'a> {
    /// 1-based line number within the entries section.
    pub number:   usize,
    pub checksum: &'a str,
    /// Exact bytes the record checksum was computed over.
    pub json:     &'a [u8],
}

pub struct EntryLines<'a> {
    lines:  std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
}

/// Tokenize the entries section of an archive.
pub fn entry_lines(body: &[u8]) -> EntryLines<'_> {
    let is_sep: fn(&u8) -> bool = |b| *b == ENTRY_SEPARATOR as u8;
    EntryLines { lines: body.split(is_sep).enumerate() }
}

impl<'a> Iterator for EntryLines<'a> {
    type Item = MparResult<EntryLine<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, raw) in self.lines.by_ref() {
            let line = trim_start(raw);
            if line.is_empty() || line[0] == COMMENT_MARKER as u8 {
                continue;
            }
            return Some(split_line(idx + 1, line));
        }
        None
    }
}

fn split_line(number: usize, line: &[u8]) -> MparResult<EntryLine<'_>> {
    let sep = line
        .iter()
        .position(|b| *b == CHECKSUM_SEPARATOR as u8)
        .ok_or_else(|| MparError::not_archive(format!("entry line {number} has no checksum separator")))?;
    let checksum = std::str::from_utf8(&line[..sep])
        .map_err(|_| MparError::not_archive(format!("entry line {number} has a non-ASCII checksum")))?;
    Ok(EntryLine { number, checksum, json: &line[sep + 1..] })
}

fn trim_start(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if !first.is_ascii_whitespace() && *first != 0x0B {
            break;
        }
        s = rest;
    }
    s
}
