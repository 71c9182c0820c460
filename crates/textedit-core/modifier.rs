//! Rewriting moved or copied text in flight.
//!
//! A [`SourceModifier`] attached to a move or copy source edit gets to
//! transform the captured text before it lands at the target. The classic
//! use is re-indenting code while moving it to a different nesting depth.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};

/// One replacement a [`SourceModifier`] wants applied to captured text.
///
/// Offsets are relative to the start of the captured text, not to the
/// document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReplacement {
    /// Start of the replaced span within the captured text.
    pub offset: usize,
    /// Length of the replaced span.
    pub length: usize,
    /// Text replacing the span.
    pub text: String,
}

impl SourceReplacement {
    /// Creates a replacement of `[offset, offset + length)` with `text`.
    pub fn new(offset: usize, length: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            text: text.into(),
        }
    }
}

/// Hook transforming the text captured by a move or copy source.
///
/// The replacements returned by [`modifications`](Self::modifications)
/// must not overlap each other; they may touch. They are woven into the
/// edits nested inside the source, so markers and nested edits keep
/// tracking their text through the transformation.
///
/// ```
/// use textedit_core::{SourceModifier, SourceReplacement};
///
/// /// Rewrites every tab into four spaces.
/// #[derive(Debug)]
/// struct Detab;
///
/// impl SourceModifier for Detab {
///     fn modifications(&self, source: &str) -> Vec<SourceReplacement> {
///         source
///             .char_indices()
///             .filter(|&(_, c)| c == '\t')
///             .map(|(at, _)| SourceReplacement::new(at, 1, "    "))
///             .collect()
///     }
///
///     fn copy(&self) -> Box<dyn SourceModifier> {
///         Box::new(Detab)
///     }
/// }
/// ```
pub trait SourceModifier: core::fmt::Debug {
    /// Computes the replacements to apply to `source`.
    ///
    /// Called once per application with the text the source edit covers
    /// at capture time.
    fn modifications(&self, source: &str) -> Vec<SourceReplacement>;

    /// Clones the modifier for a copied edit tree.
    fn copy(&self) -> Box<dyn SourceModifier>;
}
