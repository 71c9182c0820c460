//! The document mutation pass.
//!
//! Edits execute in ascending document order, one recursive sweep over
//! the tree. A running delta translates original offsets into current
//! ones: every executed edit adds its own length change, and because
//! siblings are sorted and disjoint, an edit's execution offset is its
//! original offset plus the delta accumulated so far.
//!
//! The same pass runs the scratch replay of captured sources and the
//! rewrite trees woven by source modifiers, so no step here assumes it
//! operates on the main document.

use crate::document::Document;
use crate::errors::{EditError, Result};
use crate::region::{checked_shift, Region};
use crate::tree::{EditId, EditKind, EditTree, RegionState};

/// Applies the subtree under `root` to `document`, returning the total
/// length change. With `update` every executed edit is rewritten to its
/// final region and move targets adopt the children their source sent
/// through the scratch replay.
pub(crate) fn run(
    tree: &mut EditTree,
    document: &mut dyn Document,
    root: EditId,
    update: bool,
) -> Result<isize> {
    run_node(tree, document, root, 0, update)
}

fn run_node(
    tree: &mut EditTree,
    document: &mut dyn Document,
    id: EditId,
    delta: isize,
    update: bool,
) -> Result<isize> {
    match tree.node(id).kind() {
        EditKind::Multi | EditKind::RangeMarker | EditKind::CopySource => {
            passive(tree, document, id, delta, update)
        }
        EditKind::Insert | EditKind::Replace => splice(tree, document, id, delta, update),
        EditKind::MoveSource => remove(tree, document, id, delta, update),
        EditKind::MoveTarget | EditKind::CopyTarget => target(tree, document, id, delta, update),
    }
}

/// Aggregates, markers and copy sources change nothing themselves; they
/// shift with the accumulated delta and stretch by whatever their
/// children change inside them.
fn passive(
    tree: &mut EditTree,
    document: &mut dyn Document,
    id: EditId,
    delta: isize,
    update: bool,
) -> Result<isize> {
    let region = tree.node(id).region.get()?;
    let offset = shifted(region.offset(), delta)?;
    let mut inner = delta;
    for child in tree.node(id).children.clone() {
        inner = run_node(tree, document, child, inner, update)?;
    }
    if update {
        let length = shifted(region.length(), inner - delta)?;
        tree.node_mut(id).region = RegionState::Fixed(Region::new(offset, length)?);
    }
    Ok(inner)
}

/// Inserts and replacements splice their text in. Anything below a
/// replacement vanishes with the replaced text, so its children are
/// flagged deleted and never execute.
fn splice(
    tree: &mut EditTree,
    document: &mut dyn Document,
    id: EditId,
    delta: isize,
    update: bool,
) -> Result<isize> {
    let region = tree.node(id).region.get()?;
    let exec = shifted(region.offset(), delta)?;
    for child in tree.node(id).children.clone() {
        tree.mark_subtree_deleted(child);
    }
    let inserted = {
        let text = tree
            .node(id)
            .new_text()
            .ok_or_else(|| EditError::internal("replacement carries no text"))?;
        document.replace(exec, region.length(), text)?;
        text.len()
    };
    if update {
        tree.node_mut(id).region = RegionState::Fixed(Region::new(exec, inserted)?);
    }
    Ok(delta + inserted as isize - region.length() as isize)
}

/// A move source deletes its region; the captured text reappears at the
/// paired target. Its children were detached into the scratch tree when
/// the source was captured.
fn remove(
    tree: &mut EditTree,
    document: &mut dyn Document,
    id: EditId,
    delta: isize,
    update: bool,
) -> Result<isize> {
    let region = tree.node(id).region.get()?;
    let exec = shifted(region.offset(), delta)?;
    document.replace(exec, region.length(), "")?;
    if update {
        tree.node_mut(id).region = RegionState::Fixed(Region::point(exec));
    }
    Ok(delta - region.length() as isize)
}

/// Move and copy targets insert the text their source captured. Any
/// children attached to the target itself run first; a move target then
/// adopts the children that traveled with the moved text.
fn target(
    tree: &mut EditTree,
    document: &mut dyn Document,
    id: EditId,
    delta: isize,
    update: bool,
) -> Result<isize> {
    let region = tree.node(id).region.get()?;
    let mut inner = delta;
    for child in tree.node(id).children.clone() {
        inner = run_node(tree, document, child, inner, update)?;
    }
    let exec = shifted(region.offset(), inner)?;
    let source = tree
        .node(id)
        .pair()
        .ok_or_else(|| EditError::internal("target lost its source"))?;
    let content = tree
        .node_mut(source)
        .source_state_mut()
        .and_then(|state| state.content.take())
        .ok_or_else(|| EditError::internal("target executed before its source was captured"))?;
    document.replace(exec, region.length(), &content)?;
    let inserted = content.len();
    if update {
        tree.node_mut(id).region = RegionState::Fixed(Region::new(exec, inserted)?);
        if tree.node(id).kind() == EditKind::MoveTarget {
            transplant(tree, source, id, exec)?;
        }
    }
    Ok(inner + inserted as isize - region.length() as isize)
}

/// Hands the children a move source left in its scratch tree over to
/// the target, translated from scratch coordinates to their final
/// position. Children the target already had stay in front; the scratch
/// replay placed everything at or past the insertion point.
fn transplant(tree: &mut EditTree, source: EditId, id: EditId, exec: usize) -> Result<()> {
    let Some(scratch) = tree.node(source).source_state().and_then(|state| state.scratch) else {
        return Ok(());
    };
    let moved = tree.take_children(scratch);
    if moved.is_empty() {
        return Ok(());
    }
    for &child in &moved {
        tree.shift_subtree(child, exec as isize)?;
    }
    if tree.node(id).children.is_empty() {
        tree.adopt_children(id, moved);
    } else {
        for &child in &moved {
            tree.node_mut(child).parent = Some(id);
        }
        tree.node_mut(id).children.extend(moved);
    }
    Ok(())
}

fn shifted(value: usize, delta: isize) -> Result<usize> {
    debug_assert!(
        checked_shift(value, delta).is_some(),
        "edit shifted outside the document"
    );
    checked_shift(value, delta)
        .ok_or_else(|| EditError::internal("edit shifted outside the document"))
}
