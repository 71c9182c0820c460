//! Pre-application validation.
//!
//! Everything here is read-only. The whole tree is validated against
//! the document before the first byte changes, so a rejected tree
//! leaves the document exactly as it was.

#[cfg(not(feature = "std"))]
use alloc::{format, vec, vec::Vec};

use crate::document::Document;
use crate::errors::{EditError, Result};
use crate::tree::{EditId, EditKind, EditTree};

/// Outcome of a successful check: the move and copy sources whose text
/// must be captured before any mutation, in capture order.
///
/// Sources are ordered by nesting depth, innermost first, so that a
/// source enclosing other sources captures text those inner pairs have
/// already rewritten. Sources of equal depth cannot nest and keep
/// document order.
#[derive(Debug)]
pub(crate) struct CheckPlan {
    pub(crate) sources: Vec<EditId>,
}

pub(crate) fn check(tree: &EditTree, document: &dyn Document) -> Result<CheckPlan> {
    let root = tree.root();
    let span = tree.node(root).region.get()?;
    if span.exclusive_end() > document.len() {
        return Err(EditError::malformed_at(
            None,
            Some(root),
            format!(
                "edit tree [{}, +{}) does not fit a document of length {}",
                span.offset(),
                span.length(),
                document.len()
            ),
        ));
    }

    let mut reachable = vec![false; tree.node_count()];
    for id in tree.subtree(root) {
        reachable[id.index()] = true;
    }

    let mut sources: Vec<(u32, EditId)> = Vec::new();
    walk(tree, &reachable, root, &mut sources)?;
    sources.sort_by_key(|&(depth, _)| depth);
    Ok(CheckPlan {
        sources: sources.into_iter().map(|(_, id)| id).collect(),
    })
}

/// Validates the subtree under `id` and returns its source nesting
/// depth: zero without sources below, otherwise one more than the
/// deepest source chain inside.
fn walk(
    tree: &EditTree,
    reachable: &[bool],
    id: EditId,
    sources: &mut Vec<(u32, EditId)>,
) -> Result<u32> {
    let mut depth = 0;
    let mut previous_end: Option<usize> = None;
    for &child in tree.children(id) {
        let region = tree.node(child).region.get()?;
        if previous_end.is_some_and(|end| region.offset() < end) {
            return Err(EditError::malformed_at(
                Some(id),
                Some(child),
                format!(
                    "child [{}, +{}) overlaps a sibling",
                    region.offset(),
                    region.length()
                ),
            ));
        }
        previous_end = Some(region.exclusive_end());
        if !tree.node(id).covers(&region) {
            return Err(EditError::malformed_at(
                Some(id),
                Some(child),
                format!(
                    "child [{}, +{}) escapes its parent",
                    region.offset(),
                    region.length()
                ),
            ));
        }
        depth = depth.max(walk(tree, reachable, child, sources)?);
    }

    match tree.node(id).kind() {
        EditKind::MoveSource | EditKind::CopySource => {
            let target = tree.node(id).pair().ok_or_else(|| {
                EditError::malformed_at(None, Some(id), "source without a connected target")
            })?;
            ensure_connected(tree, reachable, id, target)?;
            depth += 1;
            sources.push((depth, id));
        }
        EditKind::MoveTarget | EditKind::CopyTarget => {
            let source = tree.node(id).pair().ok_or_else(|| {
                EditError::malformed_at(None, Some(id), "target without a connected source")
            })?;
            ensure_connected(tree, reachable, id, source)?;
        }
        _ => {}
    }
    Ok(depth)
}

fn ensure_connected(
    tree: &EditTree,
    reachable: &[bool],
    id: EditId,
    partner: EditId,
) -> Result<()> {
    if tree.node(partner).pair() != Some(id) {
        return Err(EditError::malformed_at(
            None,
            Some(id),
            "move or copy halves disagree about their pairing",
        ));
    }
    if !reachable[partner.index()] {
        return Err(EditError::malformed_at(
            None,
            Some(id),
            "connected pair partner is not part of the tree",
        ));
    }
    Ok(())
}
