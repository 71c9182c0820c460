//! Two-phase application of edit trees.
//!
//! [`EditProcessor`] separates validation from mutation. The checker
//! walks the whole tree against the untouched document; only a tree
//! that passes every check starts executing, so a rejected tree leaves
//! the document exactly as it was. Once execution begins, errors can
//! only come from the document itself, and such a failure leaves it
//! partially rewritten.
//!
//! Between the two phases every move and copy source snapshots its
//! text, since edits running earlier in the pass may delete it.

mod checker;
mod sources;
mod undo;
mod updater;

pub use undo::UndoEdit;

use undo::RecordingDocument;

use crate::document::Document;
use crate::errors::{EditError, Result};
use crate::region::{checked_shift, Region};
use crate::tree::EditTree;

bitflags::bitflags! {
    /// Switches for [`EditProcessor::perform_edits`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Style: u8 {
        /// Record the inverse of every change and hand back an
        /// [`UndoEdit`] that restores the document.
        const CREATE_UNDO = 1 << 0;
        /// Rewrite every edit's region to the position it ends up at,
        /// and hand the children of a moved region over to the move
        /// target that inserted them.
        const UPDATE_REGIONS = 1 << 1;
    }
}

impl Style {
    /// Apply without undo capture or region updating.
    pub const NONE: Self = Self::empty();
}

/// Applies an [`EditTree`] to a [`Document`].
///
/// Construction freezes a still-pending root region; everything else
/// happens in [`EditProcessor::perform_edits`]. The processor borrows
/// both the tree and the document for its whole lifetime, so nothing
/// can shift underneath the validated state.
pub struct EditProcessor<'a> {
    document: &'a mut dyn Document,
    tree: &'a mut EditTree,
    style: Style,
}

impl<'a> EditProcessor<'a> {
    /// Prepares `tree` for application to `document`.
    ///
    /// A root without a region is frozen to the bounding span of its
    /// children here, or to a zero-length region at offset zero when it
    /// has none.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::MalformedTree`] when the tree was already
    /// applied.
    pub fn new(
        document: &'a mut dyn Document,
        tree: &'a mut EditTree,
        style: Style,
    ) -> Result<Self> {
        tree.ensure_live()?;
        tree.freeze_root()?;
        Ok(Self {
            document,
            tree,
            style,
        })
    }

    /// Style this processor was created with.
    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether the tree currently passes every pre-application check
    /// against the document. Read-only; asking does not change the
    /// answer, the tree, or the document.
    #[must_use]
    pub fn can_perform_edits(&self) -> bool {
        checker::check(self.tree, &*self.document).is_ok()
    }

    /// Applies the tree to the document.
    ///
    /// The tree counts as applied from this point on, even when the
    /// application fails. Validation errors are reported before the
    /// first byte changes; an error from the document mid-pass leaves
    /// it partially rewritten and discards any undo recorded so far.
    ///
    /// Returns the inverse edit when the style asked for
    /// [`Style::CREATE_UNDO`], [`None`] otherwise.
    pub fn perform_edits(self) -> Result<Option<UndoEdit>> {
        let Self {
            document,
            tree,
            style,
        } = self;
        tree.mark_consumed();

        let plan = checker::check(tree, &*document)?;
        let update = style.contains(Style::UPDATE_REGIONS);
        sources::capture(tree, &*document, &plan.sources, update)?;

        let root = tree.root();
        let span = tree.node(root).region.get()?;
        if style.contains(Style::CREATE_UNDO) {
            let mut recorder = RecordingDocument::new(document);
            let delta = updater::run(tree, &mut recorder, root, update)?;
            let entries = recorder.into_entries();
            let length = checked_shift(span.length(), delta)
                .ok_or_else(|| EditError::internal("edits shrank the tree below nothing"))?;
            Ok(Some(UndoEdit::new(
                entries,
                Region::new(span.offset(), length)?,
            )))
        } else {
            updater::run(tree, document, root, update)?;
            Ok(None)
        }
    }
}
