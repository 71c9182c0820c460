//! Tree-structured text edits with atomic application
//!
//! `textedit-core` describes changes to a text document as a tree of
//! edit nodes addressed by byte offsets. The whole tree is validated
//! up front and applied in a single pass, so either every edit takes
//! effect or the document stays untouched.
//!
//! # Features
//!
//! - **Structured edits**: Inserts, replacements, deletions and
//!   markers compose into trees; siblings stay sorted and disjoint by
//!   construction
//! - **Moves and copies**: Source/target pairs relocate or duplicate a
//!   region, carrying nested edits along and optionally rewriting the
//!   text in flight
//! - **Atomic application**: A full consistency check runs before the
//!   first byte changes
//! - **Region tracking**: After applying, every edit can report the
//!   final position of its text
//! - **Undo/redo**: Applications return an inverse edit whose own
//!   application yields the redo
//! - **`no_std` support**: Only `alloc` is required with default
//!   features disabled
//!
//! # Example
//!
//! ```
//! use textedit_core::{EditTree, StringDocument};
//!
//! let mut doc = StringDocument::from("abcdefghij");
//! let mut tree = EditTree::new();
//! let root = tree.root();
//! let head = tree.insert(0, "X");
//! let tail = tree.replace(5, 3, "ZZ")?;
//! tree.add_children(root, &[head, tail])?;
//!
//! let undo = tree.apply(&mut doc)?;
//! assert_eq!(doc.as_str(), "XabcdeZZij");
//! assert_eq!(tree.region(tail)?.offset(), 6);
//!
//! undo.apply(&mut doc)?;
//! assert_eq!(doc.as_str(), "abcdefghij");
//! # Ok::<(), textedit_core::EditError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod document;
pub mod errors;
pub mod group;
pub mod modifier;
pub mod processor;
pub mod region;
pub mod tree;

pub use document::{Document, StringDocument};
pub use errors::{EditError, Result};
pub use group::EditGroup;
pub use modifier::{SourceModifier, SourceReplacement};
pub use processor::{EditProcessor, Style, UndoEdit};
pub use region::Region;
pub use tree::{CopyMap, EditId, EditKind, EditTree, Subtree};
