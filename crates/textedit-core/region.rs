//! Half-open byte regions used to address document text.
//!
//! A [`Region`] describes the span `[offset, offset + length)` of a
//! document, measured in bytes. Region arithmetic is checked: operations
//! that would overflow `usize` fail with [`EditError::InvalidRegion`]
//! instead of wrapping.

use crate::errors::{EditError, Result};

/// A half-open `[offset, offset + length)` span of a document.
///
/// The constructor guarantees `offset + length` fits in `usize`, so the
/// accessors can stay infallible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    offset: usize,
    length: usize,
}

impl Region {
    /// Creates a region covering `length` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidRegion`] when `offset + length` would
    /// overflow.
    pub fn new(offset: usize, length: usize) -> Result<Self> {
        if offset.checked_add(length).is_none() {
            return Err(EditError::InvalidRegion { offset, length });
        }
        Ok(Self { offset, length })
    }

    /// A zero-length region at `offset`.
    #[must_use]
    pub const fn point(offset: usize) -> Self {
        Self { offset, length: 0 }
    }

    /// Start offset of the region.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the region in bytes.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// First offset past the region.
    #[must_use]
    pub const fn exclusive_end(&self) -> usize {
        self.offset + self.length
    }

    /// True when the region covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// True when `other` lies fully inside this region, boundaries
    /// included. A region contains itself and any point on its edges.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.offset <= other.offset && other.exclusive_end() <= self.exclusive_end()
    }

    /// True when `offset` lies inside the region, boundaries included.
    #[must_use]
    pub const fn contains_offset(&self, offset: usize) -> bool {
        self.offset <= offset && offset <= self.exclusive_end()
    }

    /// True when both regions share at least one byte. Zero-length
    /// regions never overlap anything, including themselves.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.offset < other.exclusive_end() && other.offset < self.exclusive_end()
    }

    /// The bytes common to both regions, or `None` when they are disjoint
    /// or merely touching.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.offset.max(other.offset);
        let end = self.exclusive_end().min(other.exclusive_end());
        if start < end {
            Some(Self {
                offset: start,
                length: end - start,
            })
        } else {
            None
        }
    }

    /// Smallest region containing both regions.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let start = self.offset.min(other.offset);
        let end = self.exclusive_end().max(other.exclusive_end());
        Self {
            offset: start,
            length: end - start,
        }
    }

    /// Moves the region by a signed delta, keeping its length.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidRegion`] when the shifted offset would
    /// leave the `usize` range.
    pub fn shifted_by(&self, delta: isize) -> Result<Self> {
        let offset = checked_shift(self.offset, delta).ok_or(EditError::InvalidRegion {
            offset: self.offset,
            length: self.length,
        })?;
        Self::new(offset, self.length)
    }

    /// Grows or shrinks the region by a signed delta, keeping its offset.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidRegion`] when the resized length would
    /// leave the `usize` range.
    pub fn resized_by(&self, delta: isize) -> Result<Self> {
        let length = checked_shift(self.length, delta).ok_or(EditError::InvalidRegion {
            offset: self.offset,
            length: self.length,
        })?;
        Self::new(self.offset, length)
    }
}

/// Applies a signed delta to an unsigned value without wrapping.
pub(crate) fn checked_shift(value: usize, delta: isize) -> Option<usize> {
    if delta >= 0 {
        value.checked_add(delta as usize)
    } else {
        value.checked_sub(delta.unsigned_abs())
    }
}
