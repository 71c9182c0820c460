//! Inverse edits captured while a tree is applied.
//!
//! With [`Style::CREATE_UNDO`](crate::Style::CREATE_UNDO) every splice
//! performed on the document is recorded together with the text it
//! overwrote. Replaying those records backwards restores the document,
//! and recording the replay in turn yields the redo edit, so undo and
//! redo chain indefinitely.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::document::Document;
use crate::errors::{EditError, Result};
use crate::region::{checked_shift, Region};

/// One recorded splice: putting `text` back over the `length` bytes at
/// `offset` reverses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UndoEntry {
    offset: usize,
    length: usize,
    text: String,
}

/// The inverse of an applied edit tree.
///
/// Returned by [`EditTree::apply`](crate::EditTree::apply) and by
/// [`UndoEdit::apply`] itself, which yields the redo edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEdit {
    entries: Vec<UndoEntry>,
    region: Region,
}

impl UndoEdit {
    pub(crate) fn new(entries: Vec<UndoEntry>, region: Region) -> Self {
        Self { entries, region }
    }

    /// Region the reversed change will occupy once this edit is
    /// applied. Matches the root region of the tree that produced it.
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Number of recorded splices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the application changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reverses the recorded change on `document` and returns the redo
    /// edit.
    ///
    /// The document must be in the state the original application left
    /// it in. Only its length is verifiable; a document of the right
    /// length with different content is silently mangled, exactly like
    /// applying any edit built against other text.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfRange`] when the recorded region does
    /// not fit `document` and leaves it untouched in that case. Errors
    /// reported by the document mid-replay leave it partially reversed.
    pub fn apply(self, document: &mut dyn Document) -> Result<Self> {
        if self.region.exclusive_end() > document.len() {
            return Err(EditError::OutOfRange {
                offset: self.region.offset(),
                length: self.region.length(),
                document_length: document.len(),
            });
        }

        let mut recorder = RecordingDocument::new(document);
        let mut delta: isize = 0;
        // Newest first: every entry was recorded at its final position,
        // so undoing from the back never crosses a stale coordinate.
        for entry in self.entries.iter().rev() {
            recorder.replace(entry.offset, entry.length, &entry.text)?;
            delta += entry.text.len() as isize - entry.length as isize;
        }
        let entries = recorder.into_entries();

        let length = checked_shift(self.region.length(), delta)
            .ok_or_else(|| EditError::internal("undo outgrew its own region"))?;
        Ok(Self::new(entries, Region::new(self.region.offset(), length)?))
    }
}

/// [`Document`] wrapper that records every effective splice for undo.
///
/// Replacing a span with identical text changes nothing and is not
/// recorded, so replaying an undo never reports phantom changes.
pub(crate) struct RecordingDocument<'a> {
    inner: &'a mut dyn Document,
    entries: Vec<UndoEntry>,
}

impl<'a> RecordingDocument<'a> {
    pub(crate) fn new(inner: &'a mut dyn Document) -> Self {
        Self {
            inner,
            entries: Vec::new(),
        }
    }

    /// Recorded splices in the order they were performed.
    pub(crate) fn into_entries(self) -> Vec<UndoEntry> {
        self.entries
    }
}

impl Document for RecordingDocument<'_> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn text(&self, offset: usize, length: usize) -> Result<&str> {
        self.inner.text(offset, length)
    }

    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<()> {
        let overwritten = {
            let old = self.inner.text(offset, length)?;
            if old == text {
                None
            } else {
                Some(String::from(old))
            }
        };
        self.inner.replace(offset, length, text)?;
        if let Some(old) = overwritten {
            self.entries.push(UndoEntry {
                offset,
                length: text.len(),
                text: old,
            });
        }
        Ok(())
    }
}
