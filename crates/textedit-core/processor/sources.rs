//! Source text capture for move and copy edits.
//!
//! Target edits insert text that earlier edits may have deleted from
//! the document, so every source snapshots its text before the first
//! mutation. A source with children or a modifier cannot simply read
//! the document: the children rewrite the text while it travels, and a
//! modifier rewrites it after them. Such sources replay their subtree
//! against a scratch document holding just the source text.
//!
//! A move detaches its children into the scratch tree; the target
//! adopts them once it knows their final position. A copy must leave
//! its children in place for the main pass, so it replays translated
//! stand-ins instead and throws them away once the text is computed.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use crate::document::{Document, StringDocument};
use crate::errors::{EditError, Result};
use crate::modifier::SourceReplacement;
use crate::region::Region;
use crate::tree::{EditId, EditKind, EditTree, Node, NodeKind};

use super::updater;

/// Captures every source in `sources`, which must be in the capture
/// order computed by the checker: innermost first, so an enclosing
/// source reads text its inner pairs have already produced.
pub(crate) fn capture(
    tree: &mut EditTree,
    document: &dyn Document,
    sources: &[EditId],
    update: bool,
) -> Result<()> {
    for &source in sources {
        capture_one(tree, document, source, update)?;
    }
    Ok(())
}

fn capture_one(
    tree: &mut EditTree,
    document: &dyn Document,
    source: EditId,
    update: bool,
) -> Result<()> {
    let region = tree.node(source).region.get()?;
    let text = document.text(region.offset(), region.length())?;

    let has_children = tree.has_children(source);
    let has_modifier = tree
        .node(source)
        .source_state()
        .is_some_and(|state| state.modifier.is_some());
    if !has_children && !has_modifier {
        store_content(tree, source, String::from(text));
        return Ok(());
    }

    let mut scratch_doc = StringDocument::from(text);
    let scratch = tree.alloc(Node::fixed(NodeKind::Multi, Region::new(0, region.length())?));
    match tree.node(source).kind() {
        EditKind::MoveSource => {
            // The children travel with the text. They leave the main
            // tree here and reappear under the target, so they are
            // rebased to scratch coordinates for the replay.
            let children = tree.take_children(source);
            for &child in &children {
                tree.shift_subtree(child, -(region.offset() as isize))?;
            }
            tree.adopt_children(scratch, children);
            if let Some(state) = tree.node_mut(source).source_state_mut() {
                state.scratch = Some(scratch);
            }
        }
        EditKind::CopySource => {
            // The children stay put and run against the main document
            // later; the replay works on disposable stand-ins.
            for child in tree.node(source).children.clone() {
                let copy = stand_in(tree, child, region.offset())?;
                tree.node_mut(copy).parent = Some(scratch);
                tree.node_mut(scratch).children.push(copy);
            }
        }
        _ => return Err(EditError::internal("capture visited a non-source edit")),
    }

    updater::run(tree, &mut scratch_doc, scratch, update)?;

    if has_modifier {
        transform(tree, &mut scratch_doc, source, scratch, update)?;
    }

    store_content(tree, source, scratch_doc.into_string());
    Ok(())
}

fn store_content(tree: &mut EditTree, source: EditId, content: String) {
    if let Some(state) = tree.node_mut(source).source_state_mut() {
        state.content = Some(content);
    }
}

/// Builds the scratch counterpart of one copied edit, translated by
/// `-base` into scratch coordinates.
///
/// Nested pairs turn into their local effect: a copy leaves its text in
/// place, a move deletes it, and a target inserts the text its own
/// source captured earlier. A target whose source is captured after
/// this copy has no content yet; that layout is unsupported and
/// reported as an internal error.
fn stand_in(tree: &mut EditTree, id: EditId, base: usize) -> Result<EditId> {
    let region = tree
        .node(id)
        .region
        .get()?
        .shifted_by(-(base as isize))
        .map_err(|_| EditError::internal("copied edit lies before its source"))?;

    let (kind, descend) = match &tree.node(id).kind {
        NodeKind::Insert { text } => (NodeKind::Insert { text: text.clone() }, true),
        NodeKind::Replace { text } => (NodeKind::Replace { text: text.clone() }, true),
        NodeKind::RangeMarker => (NodeKind::RangeMarker, true),
        NodeKind::Multi => (NodeKind::Multi, true),
        NodeKind::CopySource(_) => (NodeKind::RangeMarker, true),
        NodeKind::MoveSource(_) => (NodeKind::Replace { text: String::new() }, false),
        NodeKind::MoveTarget { source } | NodeKind::CopyTarget { source } => {
            let content = tree
                .node(*source)
                .source_state()
                .and_then(|state| state.content.clone())
                .ok_or_else(|| {
                    EditError::internal("copied target precedes its source's capture")
                })?;
            (NodeKind::Insert { text: content }, false)
        }
    };
    let copy = tree.alloc(Node::fixed(kind, region));
    if descend {
        for child in tree.node(id).children.clone() {
            let child_copy = stand_in(tree, child, base)?;
            tree.node_mut(child_copy).parent = Some(copy);
            tree.node_mut(copy).children.push(child_copy);
        }
    }
    Ok(copy)
}

/// Runs the source modifier over the replayed text.
///
/// When a move carries children and regions are being updated, the
/// replacements are woven into a mirror of the scratch tree so the
/// children's regions reflect the modification; the mirror's positions
/// are copied back afterwards. Otherwise the replacements only have to
/// rewrite the text and are applied directly.
fn transform(
    tree: &mut EditTree,
    scratch_doc: &mut StringDocument,
    source: EditId,
    scratch: EditId,
    update: bool,
) -> Result<()> {
    let replacements = tree
        .node(source)
        .source_state()
        .and_then(|state| state.modifier.as_ref())
        .map(|modifier| modifier.modifications(scratch_doc.as_str()))
        .ok_or_else(|| EditError::internal("transformation without a modifier"))?;

    let weave = update
        && tree.node(source).kind() == EditKind::MoveSource
        && tree.has_children(scratch);
    if weave {
        weave_with_restore(tree, scratch_doc, scratch, replacements)
    } else {
        apply_direct(tree, scratch_doc, replacements)
    }
}

fn apply_direct(
    tree: &mut EditTree,
    scratch_doc: &mut StringDocument,
    replacements: Vec<SourceReplacement>,
) -> Result<()> {
    let root = tree.alloc(Node::fixed(
        NodeKind::Multi,
        Region::new(0, scratch_doc.len())?,
    ));
    for replacement in replacements {
        let edit = replacement_node(tree, replacement, scratch_doc.len())?;
        tree.attach_trusted(root, edit)?;
    }
    updater::run(tree, scratch_doc, root, false)?;
    Ok(())
}

fn weave_with_restore(
    tree: &mut EditTree,
    scratch_doc: &mut StringDocument,
    scratch: EditId,
    replacements: Vec<SourceReplacement>,
) -> Result<()> {
    let mirror_root = tree.alloc(Node::fixed(
        NodeKind::Multi,
        Region::new(0, scratch_doc.len())?,
    ));
    let mut map: Vec<(EditId, EditId)> = vec![(mirror_root, scratch)];
    build_mirror(tree, scratch, mirror_root, &mut map)?;

    let mut queue: Vec<EditId> = Vec::with_capacity(replacements.len());
    for replacement in replacements {
        queue.push(replacement_node(tree, replacement, scratch_doc.len())?);
    }
    let mut next = 0;
    while next < queue.len() {
        let edit = queue[next];
        next += 1;
        weave(tree, mirror_root, edit, &mut queue)?;
    }

    updater::run(tree, scratch_doc, mirror_root, true)?;

    for (marker, real) in map {
        if tree.node(marker).deleted {
            tree.node_mut(real).deleted = true;
        } else {
            tree.node_mut(real).region = tree.node(marker).region;
        }
    }
    Ok(())
}

/// Mirrors the live part of the scratch tree as range markers, so the
/// woven replacements can push the children around without touching
/// them. Edits already deleted by the replay are left out; they have no
/// position to track.
fn build_mirror(
    tree: &mut EditTree,
    real: EditId,
    mirror: EditId,
    map: &mut Vec<(EditId, EditId)>,
) -> Result<()> {
    for child in tree.node(real).children.clone() {
        if tree.node(child).deleted {
            continue;
        }
        let region = tree.node(child).region.get()?;
        let marker = tree.alloc(Node::fixed(NodeKind::RangeMarker, region));
        tree.node_mut(marker).parent = Some(mirror);
        tree.node_mut(mirror).children.push(marker);
        map.push((marker, child));
        build_mirror(tree, child, marker, map)?;
    }
    Ok(())
}

/// Sinks one replacement into the mirror tree.
///
/// A replacement falls through to the deepest marker that covers it. A
/// marker it covers becomes its child and will be reported deleted. A
/// marker it merely intersects splits the replacement at the marker
/// boundary: the fragment inside the marker sinks into it, the other
/// fragment is queued to be placed from the root again. The fragment
/// starting at the replacement's own offset keeps the new text, the
/// other one turns into a plain deletion.
fn weave(tree: &mut EditTree, parent: EditId, edit: EditId, queue: &mut Vec<EditId>) -> Result<()> {
    if !tree.has_children(parent) {
        return tree.attach_trusted(parent, edit);
    }
    let edit_region = tree.node(edit).region.get()?;
    for child in tree.node(parent).children.clone() {
        let child_region = tree.node(child).region.get()?;
        if tree.node(child).covers(&edit_region) {
            return weave(tree, child, edit, queue);
        }
        if tree.node(edit).covers(&child_region) {
            tree.node_mut(parent).children.retain(|&c| c != child);
            tree.node_mut(child).parent = None;
            tree.attach_trusted(edit, child)?;
            continue;
        }
        if let Some(overlap) = edit_region.intersection(&child_region) {
            let (inside, outside) = split(tree, edit, edit_region, overlap)?;
            weave(tree, child, inside, queue)?;
            queue.push(outside);
            return Ok(());
        }
    }
    tree.attach_trusted(parent, edit)
}

/// Splits a woven replacement at a marker boundary. The fragment lying
/// inside the marker comes first.
fn split(
    tree: &mut EditTree,
    edit: EditId,
    region: Region,
    overlap: Region,
) -> Result<(EditId, EditId)> {
    let text = match tree.node(edit).new_text() {
        Some(text) => String::from(text),
        None => return Err(EditError::internal("woven replacement carries no text")),
    };
    if region.offset() == overlap.offset() {
        let inside = tree.alloc(Node::fixed(NodeKind::Replace { text }, overlap));
        let outside = tree.alloc(Node::fixed(
            NodeKind::Replace { text: String::new() },
            Region::new(overlap.exclusive_end(), region.length() - overlap.length())?,
        ));
        Ok((inside, outside))
    } else {
        let inside = tree.alloc(Node::fixed(
            NodeKind::Replace {
                text: String::new(),
            },
            overlap,
        ));
        let outside = tree.alloc(Node::fixed(
            NodeKind::Replace { text },
            Region::new(region.offset(), overlap.offset() - region.offset())?,
        ));
        Ok((inside, outside))
    }
}

fn replacement_node(
    tree: &mut EditTree,
    replacement: SourceReplacement,
    limit: usize,
) -> Result<EditId> {
    let region = Region::new(replacement.offset, replacement.length)?;
    if region.exclusive_end() > limit {
        return Err(EditError::malformed(format!(
            "modifier replacement [{}, +{}) leaves the source text",
            region.offset(),
            region.length()
        )));
    }
    Ok(tree.alloc(Node::fixed(
        NodeKind::Replace {
            text: replacement.text,
        },
        region,
    )))
}
