//! Deep copies of edit trees.
//!
//! Applying a tree consumes it, so callers that want to apply the same
//! change to several documents, or keep a pristine tree around while
//! trying a change out, copy the tree first. The copy is a fresh arena:
//! handles into the original do not address it, which is what the
//! returned [`CopyMap`] is for.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::errors::{EditError, Result};

use super::node::{Node, NodeKind, SourceState};
use super::{EditId, EditTree};

/// Translation table from handles of a copied tree to handles of its
/// copy, produced by [`EditTree::copy_tree`].
#[derive(Debug, Clone)]
pub struct CopyMap {
    slots: Vec<Option<EditId>>,
}

impl CopyMap {
    /// Handle of the copy of `original`, or [`None`] when `original`
    /// was not reachable from the copied root.
    #[must_use]
    pub fn get(&self, original: EditId) -> Option<EditId> {
        self.slots.get(original.index()).copied().flatten()
    }
}

impl EditTree {
    /// Copies the tree reachable from the root, remapping move and copy
    /// pairs into the copy and duplicating source modifiers.
    ///
    /// Fails with [`EditError::MalformedTree`] when the tree was
    /// already applied or when a connected pair partner is not part of
    /// the tree, since the copy could never be applied.
    pub fn copy_tree(&self) -> Result<(Self, CopyMap)> {
        self.ensure_live()?;

        let order: Vec<EditId> = self.subtree(self.root()).collect();
        let mut reachable = vec![false; self.nodes.len()];
        for &id in &order {
            reachable[id.index()] = true;
        }
        for &id in &order {
            if let Some(pair) = self.node(id).pair() {
                if !reachable[pair.index()] {
                    return Err(EditError::malformed_at(
                        None,
                        Some(id),
                        "connected pair partner is not part of the copied tree",
                    ));
                }
            }
        }

        let mut copy = Self::new();
        let mut slots: Vec<Option<EditId>> = vec![None; self.nodes.len()];
        for &id in &order {
            let node = self.node(id);
            let new_id = if id == self.root() {
                // The fresh tree already owns a root aggregate; it only
                // needs the original's region state.
                copy.node_mut(copy.root()).region = node.region;
                copy.root()
            } else {
                let mut copied = Node::pending(copy_kind(&node.kind));
                copied.region = node.region;
                copied.deleted = node.deleted;
                copy.alloc(copied)
            };
            slots[id.index()] = Some(new_id);
        }

        let mapped = |id: EditId| -> Result<EditId> {
            slots[id.index()].ok_or_else(|| EditError::internal("copy misses a reachable edit"))
        };
        for &id in &order {
            let new_id = mapped(id)?;
            let children = self
                .node(id)
                .children
                .iter()
                .map(|&child| mapped(child))
                .collect::<Result<Vec<EditId>>>()?;
            copy.adopt_children(new_id, children);

            if let Some(pair) = self.node(id).pair() {
                let partner = mapped(pair)?;
                remap_pair(&mut copy, new_id, partner);
            }
        }

        Ok((copy, CopyMap { slots }))
    }
}

fn copy_kind(kind: &NodeKind) -> NodeKind {
    match kind {
        NodeKind::Insert { text } => NodeKind::Insert { text: text.clone() },
        NodeKind::Replace { text } => NodeKind::Replace { text: text.clone() },
        NodeKind::RangeMarker => NodeKind::RangeMarker,
        NodeKind::Multi => NodeKind::Multi,
        NodeKind::MoveSource(state) => NodeKind::MoveSource(copy_source_state(state)),
        NodeKind::CopySource(state) => NodeKind::CopySource(copy_source_state(state)),
        // Pair handles still point into the original here; they are
        // remapped once every copy exists.
        NodeKind::MoveTarget { source } => NodeKind::MoveTarget { source: *source },
        NodeKind::CopyTarget { source } => NodeKind::CopyTarget { source: *source },
    }
}

fn copy_source_state(state: &SourceState) -> SourceState {
    SourceState {
        target: state.target,
        modifier: state.modifier.as_ref().map(|modifier| modifier.copy()),
        content: None,
        scratch: None,
    }
}

fn remap_pair(copy: &mut EditTree, id: EditId, partner: EditId) {
    match &mut copy.node_mut(id).kind {
        NodeKind::MoveSource(state) | NodeKind::CopySource(state) => {
            state.target = Some(partner);
        }
        NodeKind::MoveTarget { source } | NodeKind::CopyTarget { source } => {
            *source = partner;
        }
        _ => {}
    }
}
