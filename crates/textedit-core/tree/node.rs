//! Node storage for edit trees.
//!
//! Every edit lives in the arena owned by [`EditTree`](super::EditTree)
//! and is addressed through a copyable [`EditId`] handle. A node couples
//! its behavioral kind with a region state: leaf edits are created with
//! a fixed region, aggregates stay [`RegionState::Pending`] until they
//! are attached and their span is computed from their children.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};

use crate::errors::{EditError, Result};
use crate::modifier::SourceModifier;
use crate::region::Region;

/// Handle to an edit inside an [`EditTree`](super::EditTree).
///
/// Ids are only meaningful for the tree that minted them and stay valid
/// for that tree's whole lifetime; edits are never removed from the
/// arena, only detached or flagged as deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditId(pub(crate) u32);

impl EditId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Behavioral classification of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Inserts text at a point without consuming any.
    Insert,
    /// Replaces the covered text; with empty replacement text this is a
    /// deletion.
    Replace,
    /// Tracks a region without changing the document.
    RangeMarker,
    /// Groups children and spans them; has no text effect of its own.
    Multi,
    /// Deletes the covered text so its paired target can re-insert it.
    MoveSource,
    /// Inserts the text captured by its paired move source.
    MoveTarget,
    /// Captures the covered text without removing it.
    CopySource,
    /// Inserts the text captured by its paired copy source.
    CopyTarget,
}

impl EditKind {
    /// Whether an edit of this kind still contains children when its
    /// own region is empty.
    ///
    /// Aggregates span whatever their children span, and targets adopt
    /// the moved children once the text arrives, so a zero-length
    /// region does not make them childless. Every other kind covers
    /// nothing when empty.
    #[must_use]
    pub const fn can_zero_length_cover(self) -> bool {
        matches!(self, Self::Multi | Self::MoveTarget | Self::CopyTarget)
    }
}

/// Position of a node, either still undefined or frozen to a concrete
/// region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegionState {
    /// No position yet; reading it is an error. Only aggregates built
    /// without an explicit region are in this state, and only until
    /// they are attached.
    Pending,
    /// Concrete half-open region.
    Fixed(Region),
}

impl RegionState {
    pub(crate) fn get(self) -> Result<Region> {
        match self {
            Self::Pending => Err(EditError::UndefinedRegion),
            Self::Fixed(region) => Ok(region),
        }
    }

    pub(crate) fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

/// Capture state shared by move and copy sources.
///
/// `content` and `scratch` are populated while the tree is applied:
/// `content` holds the captured (and possibly transformed) text the
/// paired target inserts, `scratch` points at the internal aggregate
/// holding a move source's detached children in source-local
/// coordinates until they are handed to the target.
#[derive(Debug)]
pub(crate) struct SourceState {
    pub(crate) target: Option<EditId>,
    pub(crate) modifier: Option<Box<dyn SourceModifier>>,
    pub(crate) content: Option<String>,
    pub(crate) scratch: Option<EditId>,
}

impl SourceState {
    pub(crate) fn unpaired() -> Self {
        Self {
            target: None,
            modifier: None,
            content: None,
            scratch: None,
        }
    }
}

/// Kind-specific payload of a node.
#[derive(Debug)]
pub(crate) enum NodeKind {
    Insert { text: String },
    Replace { text: String },
    RangeMarker,
    Multi,
    MoveSource(SourceState),
    MoveTarget { source: EditId },
    CopySource(SourceState),
    CopyTarget { source: EditId },
}

impl NodeKind {
    pub(crate) fn kind(&self) -> EditKind {
        match self {
            Self::Insert { .. } => EditKind::Insert,
            Self::Replace { .. } => EditKind::Replace,
            Self::RangeMarker => EditKind::RangeMarker,
            Self::Multi => EditKind::Multi,
            Self::MoveSource(_) => EditKind::MoveSource,
            Self::MoveTarget { .. } => EditKind::MoveTarget,
            Self::CopySource(_) => EditKind::CopySource,
            Self::CopyTarget { .. } => EditKind::CopyTarget,
        }
    }
}

/// A single arena slot.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) region: RegionState,
    pub(crate) parent: Option<EditId>,
    pub(crate) children: Vec<EditId>,
    pub(crate) deleted: bool,
}

impl Node {
    pub(crate) fn fixed(kind: NodeKind, region: Region) -> Self {
        Self {
            kind,
            region: RegionState::Fixed(region),
            parent: None,
            children: Vec::new(),
            deleted: false,
        }
    }

    pub(crate) fn pending(kind: NodeKind) -> Self {
        Self {
            kind,
            region: RegionState::Pending,
            parent: None,
            children: Vec::new(),
            deleted: false,
        }
    }

    pub(crate) fn kind(&self) -> EditKind {
        self.kind.kind()
    }

    /// Replacement text carried by insert and replace nodes.
    pub(crate) fn new_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Insert { text } | NodeKind::Replace { text } => Some(text),
            _ => None,
        }
    }

    /// Partner of a move or copy pair, if one was connected.
    pub(crate) fn pair(&self) -> Option<EditId> {
        match &self.kind {
            NodeKind::MoveSource(state) | NodeKind::CopySource(state) => state.target,
            NodeKind::MoveTarget { source } | NodeKind::CopyTarget { source } => Some(*source),
            _ => None,
        }
    }

    pub(crate) fn source_state(&self) -> Option<&SourceState> {
        match &self.kind {
            NodeKind::MoveSource(state) | NodeKind::CopySource(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn source_state_mut(&mut self) -> Option<&mut SourceState> {
        match &mut self.kind {
            NodeKind::MoveSource(state) | NodeKind::CopySource(state) => Some(state),
            _ => None,
        }
    }

    /// Containment test used when attaching children and while checking
    /// consistency. Boundaries are inclusive on both sides; an empty
    /// parent region covers nothing unless the kind says otherwise. A
    /// still-pending parent covers everything because its span will be
    /// derived from the children.
    pub(crate) fn covers(&self, child: &Region) -> bool {
        let RegionState::Fixed(own) = self.region else {
            return true;
        };
        if own.is_empty() && !self.kind().can_zero_length_cover() {
            return false;
        }
        own.contains(child)
    }
}
