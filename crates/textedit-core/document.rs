//! Document abstraction the edit machinery mutates.
//!
//! Edit trees only need three things from a text container: its length,
//! reading a span, and splicing a span. [`Document`] captures exactly
//! that, and [`StringDocument`] is the obvious in-memory implementation.
//! Anything that can honor the byte-addressed splice contract (a rope, a
//! gap buffer, an editor buffer adapter) can host edit trees by
//! implementing the trait.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::errors::{EditError, Result};

/// A mutable text buffer addressed by byte offsets.
///
/// Offsets and lengths are in bytes and must fall on UTF-8 character
/// boundaries. Implementations report violations as
/// [`EditError::OutOfRange`]; they never panic and never truncate.
pub trait Document {
    /// Length of the document in bytes.
    fn len(&self) -> usize;

    /// True when the document holds no text.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the span `[offset, offset + length)`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfRange`] when the span leaves the
    /// document or splits a UTF-8 sequence.
    fn text(&self, offset: usize, length: usize) -> Result<&str>;

    /// Replaces the span `[offset, offset + length)` with `text`.
    ///
    /// A zero-length span inserts, empty `text` deletes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfRange`] when the span leaves the
    /// document or splits a UTF-8 sequence. On error the document is
    /// unchanged.
    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<()>;
}

/// [`Document`] backed by a plain [`String`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringDocument {
    content: String,
}

impl StringDocument {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Current text of the document.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Consumes the document, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.content
    }

    /// Validates that `[offset, offset + length)` is a readable span.
    fn check_span(&self, offset: usize, length: usize) -> Result<usize> {
        let end = offset.checked_add(length).filter(|&end| {
            end <= self.content.len()
                && self.content.is_char_boundary(offset)
                && self.content.is_char_boundary(end)
        });
        end.ok_or(EditError::OutOfRange {
            offset,
            length,
            document_length: self.content.len(),
        })
    }
}

impl Document for StringDocument {
    fn len(&self) -> usize {
        self.content.len()
    }

    fn text(&self, offset: usize, length: usize) -> Result<&str> {
        let end = self.check_span(offset, length)?;
        Ok(&self.content[offset..end])
    }

    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<()> {
        let end = self.check_span(offset, length)?;
        self.content.replace_range(offset..end, text);
        Ok(())
    }
}

impl From<String> for StringDocument {
    fn from(content: String) -> Self {
        Self { content }
    }
}

impl From<&str> for StringDocument {
    fn from(content: &str) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl core::fmt::Display for StringDocument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.content)
    }
}
