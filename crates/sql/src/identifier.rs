//! Identifier grammar for table and column names.
//!
//! An identifier is one to three dot-separated segments (`column`,
//! `table.column`, `schema.table.column`), each made of ASCII letters, digits
//! and underscores. Identifiers are never interpolated as given: each segment
//! is quoted by the target dialect.

use sluice_core::{Error, Result};

use crate::dialect::Dialect;

/// Maximum total length of an identifier, dots included.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Maximum number of dot-separated segments.
pub const MAX_SEGMENTS: usize = 3;

/// A validated table or column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier<'a> {
    raw: &'a str,
}

impl<'a> Identifier<'a> {
    /// Validate `raw` against the identifier grammar.
    pub fn parse(raw: &'a str) -> Result<Self> {
        let invalid = || Error::InvalidIdentifier {
            identifier: raw.to_string(),
        };

        if raw.is_empty() || raw.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid());
        }

        let mut segments = 0;
        for segment in raw.split('.') {
            segments += 1;
            if segments > MAX_SEGMENTS || !is_valid_segment(segment) {
                return Err(invalid());
            }
        }

        Ok(Self { raw })
    }

    /// Dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        self.raw.split('.')
    }

    /// Append the dialect-quoted form to `out`.
    pub fn write_quoted(&self, dialect: &dyn Dialect, out: &mut String) {
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                out.push('.');
            }
            dialect.quote(segment, out);
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
