//! Named groups of edits for presentation purposes.
//!
//! Refactoring front ends describe one user-visible change as several
//! edits scattered over a tree; an [`EditGroup`] collects their handles
//! under a label so previews can list the change and highlight the text
//! it spans. Groups never influence how a tree is applied.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::region::Region;
use crate::tree::{EditId, EditTree};

/// A labelled collection of edits belonging to one logical change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditGroup {
    name: String,
    edits: Vec<EditId>,
}

impl EditGroup {
    /// Creates an empty group labelled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edits: Vec::new(),
        }
    }

    /// Creates a group labelled `name` already holding `edits`.
    pub fn with_edits(name: impl Into<String>, edits: Vec<EditId>) -> Self {
        Self {
            name: name.into(),
            edits,
        }
    }

    /// Adds an edit to the group.
    pub fn add(&mut self, edit: EditId) {
        self.edits.push(edit);
    }

    /// Label of the group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Edits collected so far, in insertion order.
    #[must_use]
    pub fn edits(&self) -> &[EditId] {
        &self.edits
    }

    /// Whether the group holds no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Removes all edits, keeping the label.
    pub fn clear(&mut self) {
        self.edits.clear();
    }

    /// Smallest region of `tree` spanning the grouped edits, before or
    /// after application depending on when it is asked. [`None`] while
    /// the group is empty or every member was deleted.
    #[must_use]
    pub fn coverage(&self, tree: &EditTree) -> Option<Region> {
        tree.coverage(&self.edits)
    }
}
