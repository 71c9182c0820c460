//! Edit tree construction and queries.
//!
//! An [`EditTree`] owns every edit in an internal arena and exposes them
//! through copyable [`EditId`] handles. Trees are built in two steps:
//! node constructors such as [`EditTree::insert`] or
//! [`EditTree::move_source`] allocate detached edits, and
//! [`EditTree::add_child`] wires them together while enforcing the
//! structural invariants:
//!
//! - siblings are kept sorted and must not overlap; zero-length edits
//!   may share a point with a sibling boundary and keep their insertion
//!   order relative to coincident zero-length edits,
//! - a child must lie inside its parent's region, boundaries included,
//! - an aggregate built without a region is frozen to the bounding span
//!   of its children the moment it is attached.
//!
//! Applying a tree consumes it: afterwards the regions answer final
//! positions (when region updating was requested) and the tree rejects
//! further structural changes.

mod copier;
mod node;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec, vec::Vec};

use crate::document::Document;
use crate::errors::{EditError, Result};
use crate::modifier::SourceModifier;
use crate::processor::{EditProcessor, Style, UndoEdit};
use crate::region::Region;

pub use copier::CopyMap;
pub use node::{EditId, EditKind};

pub(crate) use node::{Node, NodeKind, RegionState, SourceState};

/// A tree of text edits that is validated while it is built and applied
/// to a document in one atomic pass.
///
/// # Example
///
/// ```
/// use textedit_core::{EditTree, StringDocument};
///
/// let mut doc = StringDocument::from("0123456789");
/// let mut tree = EditTree::new();
/// let root = tree.root();
/// let insert = tree.insert(2, "yy");
/// let replace = tree.replace(2, 3, "3456")?;
/// tree.add_children(root, &[insert, replace])?;
///
/// tree.apply(&mut doc)?;
/// assert_eq!(doc.as_str(), "01yy345656789");
/// assert_eq!(tree.region(replace)?.offset(), 4);
/// # Ok::<(), textedit_core::EditError>(())
/// ```
#[derive(Debug)]
pub struct EditTree {
    nodes: Vec<Node>,
    root: EditId,
    consumed: bool,
}

impl EditTree {
    /// Creates a tree holding only its root aggregate. The root has no
    /// region until the tree is applied or children define its span.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::new();
        nodes.push(Node::pending(NodeKind::Multi));
        Self {
            nodes,
            root: EditId(0),
            consumed: false,
        }
    }

    /// Handle of the root aggregate.
    #[must_use]
    pub const fn root(&self) -> EditId {
        self.root
    }

    /// Whether this tree was already applied. Consumed trees only
    /// answer queries; building and applying them again fails.
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    // ------------------------------------------------------------------
    // Node constructors
    // ------------------------------------------------------------------

    /// Allocates an edit inserting `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) -> EditId {
        self.alloc(Node::fixed(
            NodeKind::Insert { text: text.into() },
            Region::point(offset),
        ))
    }

    /// Allocates an edit replacing `[offset, offset + length)` with
    /// `text`.
    pub fn replace(
        &mut self,
        offset: usize,
        length: usize,
        text: impl Into<String>,
    ) -> Result<EditId> {
        let region = Region::new(offset, length)?;
        Ok(self.alloc(Node::fixed(NodeKind::Replace { text: text.into() }, region)))
    }

    /// Allocates an edit deleting `[offset, offset + length)`. This is
    /// a replacement with empty text.
    pub fn delete(&mut self, offset: usize, length: usize) -> Result<EditId> {
        self.replace(offset, length, "")
    }

    /// Allocates a marker that tracks `[offset, offset + length)`
    /// through an application without changing the document.
    pub fn range_marker(&mut self, offset: usize, length: usize) -> Result<EditId> {
        let region = Region::new(offset, length)?;
        Ok(self.alloc(Node::fixed(NodeKind::RangeMarker, region)))
    }

    /// Allocates an aggregate whose region stays undefined until it is
    /// attached, at which point it freezes to the bounding span of its
    /// children.
    pub fn multi(&mut self) -> EditId {
        self.alloc(Node::pending(NodeKind::Multi))
    }

    /// Allocates an aggregate with an explicit region.
    pub fn multi_with_region(&mut self, offset: usize, length: usize) -> Result<EditId> {
        let region = Region::new(offset, length)?;
        Ok(self.alloc(Node::fixed(NodeKind::Multi, region)))
    }

    /// Allocates the source half of a move. Its text is captured before
    /// any change, removed from the document, and inserted by the
    /// paired target created with [`EditTree::move_target`].
    pub fn move_source(&mut self, offset: usize, length: usize) -> Result<EditId> {
        let region = Region::new(offset, length)?;
        Ok(self.alloc(Node::fixed(
            NodeKind::MoveSource(SourceState::unpaired()),
            region,
        )))
    }

    /// Allocates the target half of a move and connects it to `source`.
    /// Fails if `source` is not an unpaired move source.
    pub fn move_target(&mut self, offset: usize, source: EditId) -> Result<EditId> {
        self.pair_target(offset, source, EditKind::MoveSource)
    }

    /// Allocates the source half of a copy. Its text is captured before
    /// any change and left in place.
    pub fn copy_source(&mut self, offset: usize, length: usize) -> Result<EditId> {
        let region = Region::new(offset, length)?;
        Ok(self.alloc(Node::fixed(
            NodeKind::CopySource(SourceState::unpaired()),
            region,
        )))
    }

    /// Allocates the target half of a copy and connects it to `source`.
    /// Fails if `source` is not an unpaired copy source.
    pub fn copy_target(&mut self, offset: usize, source: EditId) -> Result<EditId> {
        self.pair_target(offset, source, EditKind::CopySource)
    }

    fn pair_target(
        &mut self,
        offset: usize,
        source: EditId,
        expected: EditKind,
    ) -> Result<EditId> {
        let node = self.node(source);
        if node.kind() != expected {
            return Err(EditError::malformed_at(
                None,
                Some(source),
                format!(
                    "target must be connected to a {expected:?}, not a {:?}",
                    node.kind()
                ),
            ));
        }
        if node.pair().is_some() {
            return Err(EditError::malformed_at(
                None,
                Some(source),
                "source is already connected to a target",
            ));
        }
        let target_kind = if expected == EditKind::MoveSource {
            NodeKind::MoveTarget { source }
        } else {
            NodeKind::CopyTarget { source }
        };
        let target = self.alloc(Node::fixed(target_kind, Region::point(offset)));
        if let Some(state) = self.node_mut(source).source_state_mut() {
            state.target = Some(target);
        }
        Ok(target)
    }

    /// Installs a modifier rewriting the captured text of a move or
    /// copy source before the target inserts it.
    pub fn set_source_modifier(
        &mut self,
        source: EditId,
        modifier: Box<dyn SourceModifier>,
    ) -> Result<()> {
        let state = self.node_mut(source).source_state_mut().ok_or_else(|| {
            EditError::malformed_at(
                None,
                Some(source),
                "only move and copy sources take a modifier",
            )
        })?;
        state.modifier = Some(modifier);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Attaches `child` under `parent`, keeping siblings sorted.
    ///
    /// Fails with [`EditError::MalformedTree`] when the child overlaps
    /// a sibling, leaves the parent's region, is already attached, or
    /// would contain one of its own ancestors. A pending aggregate is
    /// frozen to the bounding span of its children at this point, or to
    /// a zero-length point at the parent's offset if it has none.
    pub fn add_child(&mut self, parent: EditId, child: EditId) -> Result<()> {
        self.add_children(parent, core::slice::from_ref(&child))
    }

    /// Attaches several edits under `parent` as one batch. Either every
    /// edit is attached or, if any of them is rejected, none are and
    /// the parent's child list is left untouched.
    pub fn add_children(&mut self, parent: EditId, children: &[EditId]) -> Result<()> {
        self.ensure_live()?;

        let mut simulated: Vec<(EditId, Region)> = Vec::new();
        for &existing in &self.node(parent).children {
            simulated.push((existing, self.node(existing).region.get()?));
        }

        let mut frozen: Vec<(EditId, Region)> = Vec::with_capacity(children.len());
        for &child in children {
            let reject = |message| Err(EditError::malformed_at(Some(parent), Some(child), message));
            if child == self.root {
                return reject("the root cannot become a child");
            }
            if self.node(child).parent.is_some()
                || frozen.iter().any(|&(seen, _)| seen == child)
            {
                return reject("edit already has a parent");
            }
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == child {
                    return reject("an edit cannot contain itself");
                }
                cursor = self.node(current).parent;
            }

            let region = match self.node(child).region {
                RegionState::Fixed(region) => region,
                RegionState::Pending => match self.child_span(child)? {
                    Some(span) => span,
                    None => Region::point(self.freeze_hint(parent, &simulated)),
                },
            };
            if !self.node(parent).covers(&region) {
                return Err(EditError::malformed_at(
                    Some(parent),
                    Some(child),
                    format!(
                        "child [{}, +{}) lies outside its parent",
                        region.offset(),
                        region.length()
                    ),
                ));
            }
            let index = insertion_index(&simulated, region).map_err(|_| {
                EditError::malformed_at(
                    Some(parent),
                    Some(child),
                    format!(
                        "child [{}, +{}) overlaps a sibling",
                        region.offset(),
                        region.length()
                    ),
                )
            })?;
            simulated.insert(index, (child, region));
            frozen.push((child, region));
        }

        self.node_mut(parent).children = simulated.iter().map(|&(id, _)| id).collect();
        for (id, region) in frozen {
            let node = self.node_mut(id);
            node.parent = Some(parent);
            node.region = RegionState::Fixed(region);
        }
        Ok(())
    }

    /// Shifts every edit in the tree by `delta`.
    ///
    /// The whole tree is validated first; if any region would leave the
    /// addressable range the tree is left untouched and
    /// [`EditError::InvalidRegion`] is returned.
    pub fn move_tree(&mut self, delta: isize) -> Result<()> {
        self.ensure_live()?;
        let mut shifted: Vec<(EditId, Region)> = Vec::new();
        let ids: Vec<EditId> = self.subtree(self.root).collect();
        for id in ids {
            if let RegionState::Fixed(region) = self.node(id).region {
                shifted.push((id, region.shifted_by(delta)?));
            }
        }
        for (id, region) in shifted {
            self.node_mut(id).region = RegionState::Fixed(region);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Region of an edit. Before application this is the requested
    /// position; after an application with region updating it is the
    /// final position. Fails with [`EditError::UndefinedRegion`] for a
    /// detached aggregate that has not been frozen yet.
    pub fn region(&self, id: EditId) -> Result<Region> {
        self.node(id).region.get()
    }

    /// Whether the edit's region is already defined.
    #[must_use]
    pub fn is_defined(&self, id: EditId) -> bool {
        self.node(id).region.is_fixed()
    }

    /// Behavioral kind of an edit. Deletions answer
    /// [`EditKind::Replace`]; they are replacements with empty text.
    #[must_use]
    pub fn kind(&self, id: EditId) -> EditKind {
        self.node(id).kind()
    }

    /// Replacement text of an insert or replace edit.
    #[must_use]
    pub fn new_text(&self, id: EditId) -> Option<&str> {
        self.node(id).new_text()
    }

    /// Partner of a move or copy half, once both halves exist.
    #[must_use]
    pub fn pair(&self, id: EditId) -> Option<EditId> {
        self.node(id).pair()
    }

    /// Parent of an edit, [`None`] for the root and detached edits.
    #[must_use]
    pub fn parent(&self, id: EditId) -> Option<EditId> {
        self.node(id).parent
    }

    /// Children of an edit in sibling order.
    #[must_use]
    pub fn children(&self, id: EditId) -> &[EditId] {
        &self.node(id).children
    }

    /// Whether the edit has children.
    #[must_use]
    pub fn has_children(&self, id: EditId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// Whether the edit's text was removed by an enclosing replacement
    /// during application.
    #[must_use]
    pub fn is_deleted(&self, id: EditId) -> bool {
        self.node(id).deleted
    }

    /// Pre-order traversal over `id` and every edit below it.
    #[must_use]
    pub fn subtree(&self, id: EditId) -> Subtree<'_> {
        Subtree {
            tree: self,
            stack: vec![id],
        }
    }

    /// Smallest region spanning the given edits, skipping deleted ones
    /// and those without a defined region. [`None`] when nothing
    /// contributes.
    #[must_use]
    pub fn coverage(&self, ids: &[EditId]) -> Option<Region> {
        let mut result: Option<Region> = None;
        for &id in ids {
            let node = self.node(id);
            if node.deleted {
                continue;
            }
            let RegionState::Fixed(region) = node.region else {
                continue;
            };
            result = Some(match result {
                Some(current) => current.union(&region),
                None => region,
            });
        }
        result
    }

    // ------------------------------------------------------------------
    // Application
    // ------------------------------------------------------------------

    /// Applies the tree to `document` with undo capture and region
    /// updating, consuming the tree.
    ///
    /// Equivalent to [`EditTree::apply_with_style`] with
    /// [`Style::CREATE_UNDO`] and [`Style::UPDATE_REGIONS`].
    pub fn apply(&mut self, document: &mut dyn Document) -> Result<UndoEdit> {
        self.apply_with_style(document, Style::CREATE_UNDO | Style::UPDATE_REGIONS)?
            .ok_or_else(|| EditError::internal("undo capture produced no undo edit"))
    }

    /// Applies the tree to `document` under the given style, consuming
    /// the tree. Returns the inverse edit when
    /// [`Style::CREATE_UNDO`] was requested.
    pub fn apply_with_style(
        &mut self,
        document: &mut dyn Document,
        style: Style,
    ) -> Result<Option<UndoEdit>> {
        EditProcessor::new(document, self, style)?.perform_edits()
    }

    // ------------------------------------------------------------------
    // Crate internals
    // ------------------------------------------------------------------

    pub(crate) fn node(&self, id: EditId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: EditId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> EditId {
        let id = EditId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.consumed {
            return Err(EditError::malformed("edit tree was already applied"));
        }
        Ok(())
    }

    pub(crate) fn mark_consumed(&mut self) {
        self.consumed = true;
    }

    /// Freezes a pending root to the bounding span of its children, or
    /// to a zero-length region at offset zero when it has none.
    pub(crate) fn freeze_root(&mut self) -> Result<Region> {
        match self.node(self.root).region {
            RegionState::Fixed(region) => Ok(region),
            RegionState::Pending => {
                let region = self.child_span(self.root)?.unwrap_or(Region::point(0));
                self.node_mut(self.root).region = RegionState::Fixed(region);
                Ok(region)
            }
        }
    }

    /// Bounding span of the children of `id`, or [`None`] if it has
    /// none.
    pub(crate) fn child_span(&self, id: EditId) -> Result<Option<Region>> {
        let children = &self.node(id).children;
        let Some(&first) = children.first() else {
            return Ok(None);
        };
        let first_region = self.node(first).region.get()?;
        let mut end = first_region.exclusive_end();
        for &child in &children[1..] {
            end = end.max(self.node(child).region.get()?.exclusive_end());
        }
        Ok(Some(Region::new(
            first_region.offset(),
            end - first_region.offset(),
        )?))
    }

    fn freeze_hint(&self, parent: EditId, simulated: &[(EditId, Region)]) -> usize {
        match self.node(parent).region {
            RegionState::Fixed(region) => region.offset(),
            RegionState::Pending => simulated.first().map_or(0, |&(_, region)| region.offset()),
        }
    }

    /// Detaches all children of `id`, clearing their parent links. The
    /// returned list keeps sibling order.
    pub(crate) fn take_children(&mut self, id: EditId) -> Vec<EditId> {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for &child in &children {
            self.node_mut(child).parent = None;
        }
        children
    }

    /// Re-attaches a detached, already validated edit in sorted sibling
    /// position. Used for internal rewiring where the tree invariants
    /// are known to hold; an overlap still reports a malformed tree so
    /// misbehaving source modifiers surface as errors.
    pub(crate) fn attach_trusted(&mut self, parent: EditId, child: EditId) -> Result<()> {
        let region = self.node(child).region.get()?;
        let mut siblings: Vec<(EditId, Region)> = Vec::new();
        for &existing in &self.node(parent).children {
            siblings.push((existing, self.node(existing).region.get()?));
        }
        let index = insertion_index(&siblings, region)?;
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(index, child);
        Ok(())
    }

    /// Gives `parent` the whole already-sorted child list in one step.
    pub(crate) fn adopt_children(&mut self, parent: EditId, children: Vec<EditId>) {
        for &child in &children {
            self.node_mut(child).parent = Some(parent);
        }
        self.node_mut(parent).children = children;
    }

    /// Shifts `id` and everything below it by `delta`. All target
    /// positions are derived from already validated regions, so a
    /// failure here is a broken invariant.
    pub(crate) fn shift_subtree(&mut self, id: EditId, delta: isize) -> Result<()> {
        let ids: Vec<EditId> = self.subtree(id).collect();
        for id in ids {
            if let RegionState::Fixed(region) = self.node(id).region {
                let shifted = region.shifted_by(delta).map_err(|_| {
                    EditError::internal("subtree shifted outside the addressable range")
                })?;
                self.node_mut(id).region = RegionState::Fixed(shifted);
            }
        }
        Ok(())
    }

    /// Flags `id` and everything below it as deleted. The children a
    /// move source sent to its scratch aggregate are flagged along with
    /// their target, because they vanish with the text the target never
    /// inserted.
    pub(crate) fn mark_subtree_deleted(&mut self, id: EditId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.node_mut(current).deleted = true;
            stack.extend_from_slice(&self.node(current).children);
            if self.node(current).kind() == EditKind::MoveTarget {
                if let Some(source) = self.node(current).pair() {
                    if let Some(scratch) = self.node(source).source_state().and_then(|s| s.scratch)
                    {
                        stack.push(scratch);
                    }
                }
            }
        }
    }
}

impl Default for EditTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a subtree, created by [`EditTree::subtree`].
#[derive(Debug)]
pub struct Subtree<'a> {
    tree: &'a EditTree,
    stack: Vec<EditId>,
}

impl Iterator for Subtree<'_> {
    type Item = EditId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.tree.node(id).children;
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}

/// Sorted position for a new sibling, or an overlap error.
///
/// An existing sibling sits entirely before the incoming edit when its
/// exclusive end does not reach past the incoming offset; this also
/// lets coincident zero-length edits line up behind each other in
/// insertion order. If neither edit is entirely before the other the
/// two overlap.
pub(crate) fn insertion_index(
    siblings: &[(EditId, Region)],
    incoming: Region,
) -> Result<usize> {
    let mut index = 0;
    for (position, &(_, existing)) in siblings.iter().enumerate() {
        if existing.exclusive_end() <= incoming.offset() {
            index = position + 1;
            continue;
        }
        if incoming.exclusive_end() <= existing.offset() {
            break;
        }
        return Err(EditError::malformed("overlapping edits"));
    }
    Ok(index)
}
