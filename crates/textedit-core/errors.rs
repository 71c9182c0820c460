//! Error types for edit tree construction and application.
//!
//! All fallible operations in this crate return [`Result`]. The error
//! taxonomy separates failures detected before any mutation
//! ([`EditError::MalformedTree`]) from failures raised by the document
//! mid-application ([`EditError::OutOfRange`]), because the latter leave
//! the document partially modified.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::tree::EditId;

/// Result type alias for edit operations.
pub type Result<T> = core::result::Result<T, EditError>;

/// Errors produced while building, validating or applying edit trees.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum EditError {
    /// The edit tree is structurally unusable: overlapping siblings, a
    /// child outside its parent, a source without its paired target, a
    /// tree that was already applied, or a root reaching past the end of
    /// the document. Raised before the document is touched.
    #[cfg_attr(feature = "std", error("malformed edit tree: {message}"))]
    MalformedTree {
        /// Parent the rejected edit was measured against, when the
        /// failure happened at a specific attachment point.
        parent: Option<EditId>,
        /// The rejected edit, when the failure names one.
        child: Option<EditId>,
        /// What made the tree unusable.
        message: String,
    },

    /// A splice addressed text outside the document or split a UTF-8
    /// sequence. Raised by the document itself, possibly after earlier
    /// edits already ran; the document is not rolled back.
    #[cfg_attr(
        feature = "std",
        error("edit [{offset}, +{length}) out of range for document of length {document_length}")
    )]
    OutOfRange {
        /// Start offset of the offending splice.
        offset: usize,
        /// Length of the offending splice.
        length: usize,
        /// Document length at the time of the splice.
        document_length: usize,
    },

    /// Region arithmetic left the addressable range.
    #[cfg_attr(feature = "std", error("invalid region [{offset}, +{length})"))]
    InvalidRegion {
        /// Offset of the rejected region.
        offset: usize,
        /// Length of the rejected region.
        length: usize,
    },

    /// The region of an edit was read before the edit was attached to a
    /// tree and therefore has no position yet.
    #[cfg_attr(feature = "std", error("edit region is not defined yet"))]
    UndefinedRegion,

    /// An internal invariant broke. Seeing this is a bug in this crate.
    #[cfg_attr(feature = "std", error("internal error: {message}"))]
    Internal {
        /// Which invariant broke.
        message: String,
    },
}

impl EditError {
    /// Convenience constructor for [`EditError::MalformedTree`] without
    /// an attachment point.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTree {
            parent: None,
            child: None,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`EditError::MalformedTree`] naming
    /// the edits that offended.
    pub(crate) fn malformed_at(
        parent: Option<EditId>,
        child: Option<EditId>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedTree {
            parent,
            child,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`EditError::Internal`].
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller can meaningfully react to this error, for
    /// example by fixing the tree or the requested region and retrying.
    ///
    /// [`EditError::Internal`] reports a broken bookkeeping invariant
    /// inside this crate and is the only unrecoverable variant.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for EditError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MalformedTree { message, .. } => write!(f, "malformed edit tree: {message}"),
            Self::OutOfRange {
                offset,
                length,
                document_length,
            } => write!(
                f,
                "edit [{offset}, +{length}) out of range for document of length {document_length}"
            ),
            Self::InvalidRegion { offset, length } => {
                write!(f, "invalid region [{offset}, +{length})")
            }
            Self::UndefinedRegion => write!(f, "edit region is not defined yet"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}
