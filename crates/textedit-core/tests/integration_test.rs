//! End-to-end fixtures for applying edit trees to in-memory documents.
//!
//! Unless a test says otherwise it starts from the ten character
//! document "0123456789", applies a tree with undo capture and region
//! updating, and checks the rewritten text, the updated regions and the
//! undo/redo round trip.

use pretty_assertions::assert_eq;
use textedit_core::*;

fn fixture() -> (StringDocument, EditTree) {
    (StringDocument::from("0123456789"), EditTree::new())
}

fn assert_span(tree: &EditTree, id: EditId, offset: usize, length: usize) {
    let region = tree.region(id).expect("region should be defined");
    assert_eq!((region.offset(), region.length()), (offset, length));
}

/// Applies the undo, the redo it returns, and the undo of the redo,
/// checking the document flips between `original` and `applied`.
fn undo_redo(undo: UndoEdit, doc: &mut StringDocument, original: &str, applied: &str) {
    let redo = undo.apply(doc).expect("undo should apply");
    assert_eq!(doc.as_str(), original);
    let undo = redo.apply(doc).expect("redo should apply");
    assert_eq!(doc.as_str(), applied);
    undo.apply(doc).expect("second undo should apply");
    assert_eq!(doc.as_str(), original);
}

#[derive(Debug, Clone)]
struct Rewrite {
    edits: Vec<(usize, usize, &'static str)>,
}

impl SourceModifier for Rewrite {
    fn modifications(&self, _source: &str) -> Vec<SourceReplacement> {
        self.edits
            .iter()
            .map(|&(offset, length, text)| SourceReplacement::new(offset, length, text))
            .collect()
    }

    fn copy(&self) -> Box<dyn SourceModifier> {
        Box::new(self.clone())
    }
}

fn rewrite(edits: &[(usize, usize, &'static str)]) -> Box<dyn SourceModifier> {
    Box::new(Rewrite {
        edits: edits.to_vec(),
    })
}

// ===== Inserts =====

#[test]
fn test_insert_before_replacement_at_the_same_offset() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let insert = tree.insert(2, "yy");
    let replace = tree.replace(2, 3, "3456").unwrap();
    tree.add_children(root, &[insert, replace]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01yy345656789");
    assert_span(&tree, root, 2, 6);
    assert_span(&tree, insert, 2, 2);
    assert_span(&tree, replace, 4, 4);
    undo_redo(undo, &mut doc, "0123456789", "01yy345656789");
}

#[test]
fn test_coincident_inserts_keep_insertion_order() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let first = tree.insert(2, "yy");
    let second = tree.insert(2, "xx");
    tree.add_children(root, &[first, second]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01yyxx23456789");
    assert_span(&tree, root, 2, 4);
    assert_span(&tree, first, 2, 2);
    assert_span(&tree, second, 4, 2);
    undo_redo(undo, &mut doc, "0123456789", "01yyxx23456789");
}

#[test]
fn test_insert_between_replacements() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let left = tree.replace(0, 2, "011").unwrap();
    let insert = tree.insert(2, "xx");
    let right = tree.replace(2, 2, "2").unwrap();
    tree.add_children(root, &[left, insert, right]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "011xx2456789");
    assert_span(&tree, root, 0, 6);
    assert_span(&tree, left, 0, 3);
    assert_span(&tree, insert, 3, 2);
    assert_span(&tree, right, 5, 1);
    undo_redo(undo, &mut doc, "0123456789", "011xx2456789");
}

#[test]
fn test_insert_at_document_start() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let insert = tree.insert(0, "xx");
    tree.add_child(root, insert).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.len(), 12);
    assert_eq!(doc.as_str(), "xx0123456789");
    assert_span(&tree, root, 0, 2);
    assert_span(&tree, insert, 0, 2);
    undo_redo(undo, &mut doc, "0123456789", "xx0123456789");
}

#[test]
fn test_insert_at_document_end() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let insert = tree.insert(10, "xx");
    tree.add_child(root, insert).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.len(), 12);
    assert_eq!(doc.as_str(), "0123456789xx");
    assert_span(&tree, root, 10, 2);
    assert_span(&tree, insert, 10, 2);
    undo_redo(undo, &mut doc, "0123456789", "0123456789xx");
}

#[test]
fn test_insert_sorts_before_a_replacement_it_touches() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let replace = tree.replace(2, 1, "y").unwrap();
    let insert = tree.insert(2, "xx");
    tree.add_children(root, &[replace, insert]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01xxy3456789");
    assert_span(&tree, root, 2, 3);
    assert_span(&tree, replace, 4, 1);
    assert_span(&tree, insert, 2, 2);
    undo_redo(undo, &mut doc, "0123456789", "01xxy3456789");
}

// ===== Deletes =====

#[test]
fn test_single_delete() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let delete = tree.delete(3, 1).unwrap();
    tree.add_child(root, delete).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "012456789");
    assert_span(&tree, root, 3, 0);
    assert_span(&tree, delete, 3, 0);
    undo_redo(undo, &mut doc, "0123456789", "012456789");
}

#[test]
fn test_neighbouring_deletes_collapse_to_one_point() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let middle = tree.delete(4, 1).unwrap();
    let left = tree.delete(3, 1).unwrap();
    let right = tree.delete(5, 1).unwrap();
    tree.add_children(root, &[middle, left, right]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0126789");
    assert_span(&tree, root, 3, 0);
    assert_span(&tree, middle, 3, 0);
    assert_span(&tree, left, 3, 0);
    assert_span(&tree, right, 3, 0);
    undo_redo(undo, &mut doc, "0123456789", "0126789");
}

#[test]
fn test_insert_survives_a_following_delete() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let insert = tree.insert(3, "x");
    let delete = tree.delete(3, 1).unwrap();
    tree.add_children(root, &[insert, delete]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "012x456789");
    assert_span(&tree, root, 3, 1);
    assert_span(&tree, insert, 3, 1);
    assert_span(&tree, delete, 4, 0);
    undo_redo(undo, &mut doc, "0123456789", "012x456789");
}

#[test]
fn test_replacement_deletes_its_children() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let delete = tree.delete(2, 6).unwrap();
    let multi = tree.multi_with_region(3, 3).unwrap();
    let first = tree.replace(3, 1, "xx").unwrap();
    let second = tree.replace(5, 1, "yy").unwrap();
    tree.add_children(multi, &[first, second]).unwrap();
    tree.add_child(delete, multi).unwrap();
    tree.add_child(root, delete).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0189");
    assert_span(&tree, root, 2, 0);
    assert_span(&tree, delete, 2, 0);
    assert!(tree.is_deleted(multi));
    assert!(tree.is_deleted(first));
    assert!(tree.is_deleted(second));
    undo_redo(undo, &mut doc, "0123456789", "0189");
}

// ===== Aggregate regions =====

#[test]
fn test_aggregates_stretch_around_their_children() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let low = tree.multi();
    let a = tree.insert(2, "aa");
    let b = tree.insert(4, "bb");
    tree.add_children(low, &[a, b]).unwrap();
    let high = tree.multi();
    let c = tree.insert(6, "cc");
    let d = tree.insert(8, "dd");
    tree.add_children(high, &[c, d]).unwrap();
    tree.add_children(root, &[low, high]).unwrap();

    // attaching froze the aggregates to their children's span
    assert_span(&tree, low, 2, 2);
    assert_span(&tree, high, 6, 2);

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01aa23bb45cc67dd89");
    assert_span(&tree, a, 2, 2);
    assert_span(&tree, b, 6, 2);
    assert_span(&tree, c, 10, 2);
    assert_span(&tree, d, 14, 2);
    assert_span(&tree, low, 2, 6);
    assert_span(&tree, high, 10, 6);
    assert_span(&tree, root, 2, 14);
    undo_redo(undo, &mut doc, "0123456789", "01aa23bb45cc67dd89");
}

// ===== Moves =====

#[test]
fn test_move_down() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 2).unwrap();
    let target = tree.move_target(5, source).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0142356789");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, target, 3, 2);
    undo_redo(undo, &mut doc, "0123456789", "0142356789");
}

#[test]
fn test_move_up() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(5, 2).unwrap();
    let target = tree.move_target(2, source).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0156234789");
    assert_span(&tree, source, 7, 0);
    assert_span(&tree, target, 2, 2);
    undo_redo(undo, &mut doc, "0123456789", "0156234789");
}

#[test]
fn test_move_down_past_a_replacement() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 2).unwrap();
    let target = tree.move_target(7, source).unwrap();
    let replace = tree.replace(4, 1, "x").unwrap();
    tree.add_children(root, &[source, target, replace]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01x5623789");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, target, 5, 2);
    assert_span(&tree, replace, 2, 1);
    undo_redo(undo, &mut doc, "0123456789", "01x5623789");
}

#[test]
fn test_move_up_past_a_replacement() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(7, 2).unwrap();
    let target = tree.move_target(2, source).unwrap();
    let replace = tree.replace(5, 1, "x").unwrap();
    tree.add_children(root, &[source, target, replace]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0178234x69");
    assert_span(&tree, source, 9, 0);
    assert_span(&tree, target, 2, 2);
    assert_span(&tree, replace, 7, 1);
    undo_redo(undo, &mut doc, "0123456789", "0178234x69");
}

#[test]
fn test_move_onto_its_own_right_edge() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 1).unwrap();
    let target = tree.move_target(3, source).unwrap();
    let inner = tree.replace(2, 1, "x").unwrap();
    tree.add_child(source, inner).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01x3456789");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, target, 2, 1);
    assert_span(&tree, inner, 2, 1);
    undo_redo(undo, &mut doc, "0123456789", "01x3456789");
}

#[test]
fn test_move_onto_its_own_left_edge() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 1).unwrap();
    let target = tree.move_target(2, source).unwrap();
    let inner = tree.replace(2, 1, "x").unwrap();
    tree.add_child(source, inner).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01x3456789");
    assert_span(&tree, source, 3, 0);
    assert_span(&tree, target, 2, 1);
    assert_span(&tree, inner, 2, 1);
    undo_redo(undo, &mut doc, "0123456789", "01x3456789");
}

#[test]
fn test_moved_text_is_rewritten_in_flight_down() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 3).unwrap();
    let target = tree.move_target(7, source).unwrap();
    let inner = tree.replace(3, 1, "x").unwrap();
    tree.add_child(source, inner).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01562x4789");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, target, 4, 3);
    assert_span(&tree, inner, 5, 1);
    undo_redo(undo, &mut doc, "0123456789", "01562x4789");
}

#[test]
fn test_moved_text_is_rewritten_in_flight_up() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(5, 3).unwrap();
    let target = tree.move_target(1, source).unwrap();
    let inner = tree.replace(6, 1, "x").unwrap();
    tree.add_child(source, inner).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "05x7123489");
    assert_span(&tree, source, 8, 0);
    assert_span(&tree, target, 1, 3);
    assert_span(&tree, inner, 2, 1);
    undo_redo(undo, &mut doc, "0123456789", "05x7123489");
}

#[test]
fn test_move_nested_inside_a_moved_region() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let outer_source = tree.move_source(1, 3).unwrap();
    let outer_target = tree.move_target(5, outer_source).unwrap();
    let inner_source = tree.move_source(1, 1).unwrap();
    let inner_target = tree.move_target(3, inner_source).unwrap();
    tree.add_children(outer_source, &[inner_source, inner_target])
        .unwrap();
    tree.add_children(root, &[outer_source, outer_target])
        .unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0421356789");
    assert_span(&tree, outer_source, 1, 0);
    assert_span(&tree, outer_target, 2, 3);
    assert_span(&tree, inner_source, 2, 0);
    assert_span(&tree, inner_target, 3, 1);
    undo_redo(undo, &mut doc, "0123456789", "0421356789");
}

#[test]
fn test_crossing_moves() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let down_source = tree.move_source(2, 2).unwrap();
    let down_target = tree.move_target(8, down_source).unwrap();
    let up_source = tree.move_source(5, 2).unwrap();
    let up_target = tree.move_target(1, up_source).unwrap();
    tree.add_children(root, &[down_source, down_target, up_source, up_target])
        .unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0561472389");
    assert_span(&tree, down_source, 4, 0);
    assert_span(&tree, down_target, 6, 2);
    assert_span(&tree, up_source, 5, 0);
    assert_span(&tree, up_target, 1, 2);
    undo_redo(undo, &mut doc, "0123456789", "0561472389");
}

#[test]
fn test_marker_travels_with_the_moved_text() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 2).unwrap();
    let target = tree.move_target(5, source).unwrap();
    let marker = tree.range_marker(2, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0142356789");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, target, 3, 2);
    assert_span(&tree, marker, 3, 2);
    undo_redo(undo, &mut doc, "0123456789", "0142356789");
}

#[test]
fn test_deleted_target_discards_the_moved_text() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 3).unwrap();
    let target = tree.move_target(7, source).unwrap();
    let delete = tree.delete(6, 2).unwrap();
    tree.add_child(delete, target).unwrap();
    tree.add_children(root, &[source, delete]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01589");
    assert_span(&tree, source, 2, 0);
    assert!(tree.is_deleted(target));
    assert_span(&tree, delete, 3, 0);
    undo_redo(undo, &mut doc, "0123456789", "01589");
}

#[test]
fn test_enclosing_delete_consumes_the_source_moving_up() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(5, 2).unwrap();
    let target = tree.move_target(2, source).unwrap();
    let delete = tree.delete(5, 2).unwrap();
    tree.add_child(delete, source).unwrap();
    let marker = tree.range_marker(5, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.add_children(root, &[delete, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0156234789");
    assert_span(&tree, target, 2, 2);
    assert_span(&tree, marker, 2, 2);
    assert!(tree.is_deleted(source));
    assert_span(&tree, delete, 7, 0);
    undo_redo(undo, &mut doc, "0123456789", "0156234789");
}

#[test]
fn test_enclosing_delete_consumes_the_source_moving_down() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 2).unwrap();
    let target = tree.move_target(7, source).unwrap();
    let delete = tree.delete(2, 2).unwrap();
    tree.add_child(delete, source).unwrap();
    let marker = tree.range_marker(2, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.add_children(root, &[target, delete]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0145623789");
    assert_span(&tree, delete, 2, 0);
    assert!(tree.is_deleted(source));
    assert_span(&tree, target, 5, 2);
    assert_span(&tree, marker, 5, 2);
    undo_redo(undo, &mut doc, "0123456789", "0145623789");
}

#[test]
fn test_move_down_between_unrelated_edits() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 2).unwrap();
    let insert = tree.insert(5, "x");
    let target = tree.move_target(7, source).unwrap();
    let delete = tree.delete(9, 1).unwrap();
    let marker = tree.range_marker(2, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.add_children(root, &[source, insert, target, delete])
        .unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "014x562378");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, insert, 3, 1);
    assert_span(&tree, target, 6, 2);
    assert_span(&tree, marker, 6, 2);
    assert_span(&tree, delete, 10, 0);
    undo_redo(undo, &mut doc, "0123456789", "014x562378");
}

#[test]
fn test_move_up_between_unrelated_edits() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(7, 2).unwrap();
    let target = tree.move_target(2, source).unwrap();
    let insert = tree.insert(5, "x");
    let delete = tree.delete(9, 1).unwrap();
    let marker = tree.range_marker(7, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.add_children(root, &[source, insert, target, delete])
        .unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0178234x56");
    assert_span(&tree, source, 10, 0);
    assert_span(&tree, insert, 7, 1);
    assert_span(&tree, target, 2, 2);
    assert_span(&tree, marker, 2, 2);
    assert_span(&tree, delete, 10, 0);
    undo_redo(undo, &mut doc, "0123456789", "0178234x56");
}

#[test]
fn test_move_up_over_an_edit_between_the_halves() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(7, 2).unwrap();
    let target = tree.move_target(2, source).unwrap();
    let replace = tree.replace(4, 1, "yy").unwrap();
    tree.add_children(root, &[target, replace, source]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "017823yy569");
    assert_span(&tree, source, 10, 0);
    assert_span(&tree, target, 2, 2);
    assert_span(&tree, replace, 6, 2);
    undo_redo(undo, &mut doc, "0123456789", "017823yy569");
}

#[test]
fn test_move_down_over_an_edit_between_the_halves() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 2).unwrap();
    let target = tree.move_target(7, source).unwrap();
    let replace = tree.replace(4, 1, "yy").unwrap();
    tree.add_children(root, &[target, replace, source]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01yy5623789");
    assert_span(&tree, source, 2, 0);
    assert_span(&tree, target, 6, 2);
    assert_span(&tree, replace, 2, 2);
    undo_redo(undo, &mut doc, "0123456789", "01yy5623789");
}

#[test]
fn test_move_up_inside_a_surrounding_marker() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let marker = tree.range_marker(2, 6).unwrap();
    let source = tree.move_source(4, 2).unwrap();
    let target = tree.move_target(3, source).unwrap();
    tree.add_children(marker, &[source, target]).unwrap();
    tree.add_child(root, marker).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0124536789");
    assert_span(&tree, marker, 2, 6);
    assert_span(&tree, target, 3, 2);
    assert_span(&tree, source, 6, 0);
    undo_redo(undo, &mut doc, "0123456789", "0124536789");
}

#[test]
fn test_move_down_inside_a_surrounding_marker() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let marker = tree.range_marker(2, 6).unwrap();
    let source = tree.move_source(2, 2).unwrap();
    let target = tree.move_target(5, source).unwrap();
    tree.add_children(marker, &[source, target]).unwrap();
    tree.add_child(root, marker).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0142356789");
    assert_span(&tree, marker, 2, 6);
    assert_span(&tree, target, 3, 2);
    assert_span(&tree, source, 2, 0);
    undo_redo(undo, &mut doc, "0123456789", "0142356789");
}

#[test]
fn test_nested_move_sources_unravel() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let s1 = tree.move_source(1, 5).unwrap();
    let s2 = tree.move_source(2, 3).unwrap();
    let s3 = tree.move_source(3, 1).unwrap();
    tree.add_child(s1, s2).unwrap();
    tree.add_child(s2, s3).unwrap();
    let t1 = tree.move_target(9, s1).unwrap();
    let t2 = tree.move_target(8, s2).unwrap();
    let t3 = tree.move_target(7, s3).unwrap();
    tree.add_children(root, &[s1, t1, t2, t3]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0637248159");
    assert_span(&tree, s1, 1, 0);
    assert_span(&tree, s2, 8, 0);
    assert_span(&tree, s3, 5, 0);
    assert_span(&tree, t1, 7, 2);
    assert_span(&tree, t2, 4, 2);
    assert_span(&tree, t3, 2, 1);
    undo_redo(undo, &mut doc, "0123456789", "0637248159");
}

#[test]
fn test_nested_move_sources_with_an_inner_insert() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let s1 = tree.move_source(1, 5).unwrap();
    let s2 = tree.move_source(2, 3).unwrap();
    let s3 = tree.move_source(3, 1).unwrap();
    let insert = tree.insert(4, "x");
    tree.add_child(s1, s2).unwrap();
    tree.add_child(s2, s3).unwrap();
    tree.add_child(s3, insert).unwrap();
    let t1 = tree.move_target(9, s1).unwrap();
    let t2 = tree.move_target(8, s2).unwrap();
    let t3 = tree.move_target(7, s3).unwrap();
    tree.add_children(root, &[s1, t1, t2, t3]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "063x7248159");
    assert_span(&tree, s1, 1, 0);
    assert_span(&tree, s2, 9, 0);
    assert_span(&tree, s3, 6, 0);
    assert_span(&tree, insert, 3, 1);
    assert_span(&tree, t1, 8, 2);
    assert_span(&tree, t2, 5, 2);
    assert_span(&tree, t3, 2, 2);
    undo_redo(undo, &mut doc, "0123456789", "063x7248159");
}

#[test]
fn test_move_target_inside_another_moved_region() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let s1 = tree.move_source(1, 2).unwrap();
    let s2 = tree.move_source(5, 3).unwrap();
    let t1 = tree.move_target(6, s1).unwrap();
    let t2 = tree.move_target(9, s2).unwrap();
    tree.add_child(s2, t1).unwrap();
    tree.add_children(root, &[s1, s2, t2]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0348512679");
    assert_span(&tree, s1, 1, 0);
    assert_span(&tree, s2, 3, 0);
    assert_span(&tree, t1, 5, 2);
    assert_span(&tree, t2, 4, 5);
    undo_redo(undo, &mut doc, "0123456789", "0348512679");
}

// ===== Copies =====

#[test]
fn test_copy_down() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.copy_source(2, 3).unwrap();
    let target = tree.copy_target(8, source).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0123456723489");
    assert_span(&tree, source, 2, 3);
    assert_span(&tree, target, 8, 3);
    undo_redo(undo, &mut doc, "0123456789", "0123456723489");
}

#[test]
fn test_copy_up() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.copy_source(7, 2).unwrap();
    let target = tree.copy_target(3, source).unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "012783456789");
    assert_span(&tree, source, 9, 2);
    assert_span(&tree, target, 3, 2);
    undo_redo(undo, &mut doc, "0123456789", "012783456789");
}

#[test]
fn test_copy_source_nested_in_another_copy() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let outer = tree.copy_source(5, 2).unwrap();
    let outer_target = tree.copy_target(8, outer).unwrap();
    let inner = tree.copy_source(5, 2).unwrap();
    let inner_target = tree.copy_target(2, inner).unwrap();
    tree.add_child(outer, inner).unwrap();
    tree.add_children(root, &[outer, outer_target, inner_target])
        .unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01562345675689");
    assert_span(&tree, outer, 7, 2);
    assert_span(&tree, outer_target, 10, 2);
    assert_span(&tree, inner, 7, 2);
    assert_span(&tree, inner_target, 2, 2);
    undo_redo(undo, &mut doc, "0123456789", "01562345675689");
}

#[test]
fn test_nested_copy_sources() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let s1 = tree.copy_source(1, 5).unwrap();
    let s2 = tree.copy_source(2, 3).unwrap();
    let s3 = tree.copy_source(3, 1).unwrap();
    tree.add_child(s1, s2).unwrap();
    tree.add_child(s2, s3).unwrap();
    let t1 = tree.copy_target(9, s1).unwrap();
    let t2 = tree.copy_target(8, s2).unwrap();
    let t3 = tree.copy_target(7, s3).unwrap();
    tree.add_children(root, &[s1, t1, t2, t3]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0123456372348123459");
    assert_span(&tree, s1, 1, 5);
    assert_span(&tree, s2, 2, 3);
    assert_span(&tree, s3, 3, 1);
    assert_span(&tree, t1, 13, 5);
    assert_span(&tree, t2, 9, 3);
    assert_span(&tree, t3, 7, 1);
    undo_redo(undo, &mut doc, "0123456789", "0123456372348123459");
}

#[test]
fn test_nested_copy_sources_with_an_inner_insert() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let s1 = tree.copy_source(1, 5).unwrap();
    let s2 = tree.copy_source(2, 3).unwrap();
    let s3 = tree.copy_source(3, 1).unwrap();
    let insert = tree.insert(4, "x");
    tree.add_child(s1, s2).unwrap();
    tree.add_child(s2, s3).unwrap();
    tree.add_child(s3, insert).unwrap();
    let t1 = tree.copy_target(9, s1).unwrap();
    let t2 = tree.copy_target(8, s2).unwrap();
    let t3 = tree.copy_target(7, s3).unwrap();
    tree.add_children(root, &[s1, t1, t2, t3]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0123x4563x723x48123x459");
    assert_span(&tree, s1, 1, 6);
    assert_span(&tree, s2, 2, 4);
    assert_span(&tree, s3, 3, 2);
    assert_span(&tree, insert, 4, 1);
    assert_span(&tree, t1, 16, 6);
    assert_span(&tree, t2, 11, 4);
    assert_span(&tree, t3, 8, 2);
    undo_redo(undo, &mut doc, "0123456789", "0123x4563x723x48123x459");
}

#[test]
fn test_copy_target_inside_another_copied_region() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let s1 = tree.copy_source(1, 2).unwrap();
    let s2 = tree.copy_source(5, 3).unwrap();
    let t1 = tree.copy_target(6, s1).unwrap();
    let t2 = tree.copy_target(9, s2).unwrap();
    tree.add_child(s2, t1).unwrap();
    tree.add_children(root, &[s1, s2, t2]).unwrap();

    let undo = tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01234512678512679");
    assert_span(&tree, s1, 1, 2);
    assert_span(&tree, s2, 5, 5);
    assert_span(&tree, t1, 6, 2);
    assert_span(&tree, t2, 11, 5);
    undo_redo(undo, &mut doc, "0123456789", "01234512678512679");
}

// ===== Swaps =====

#[test]
fn test_swap_spanning_the_document() {
    let mut doc = StringDocument::from("foo(1, 2), 3");
    let mut tree = EditTree::new();
    let root = tree.root();

    let call_source = tree.copy_source(0, 9).unwrap();
    let drop_call = tree.replace(0, 9, "").unwrap();
    tree.add_child(drop_call, call_source).unwrap();
    let call_target = tree.copy_target(11, call_source).unwrap();

    let drop_tail = tree.replace(11, 1, "").unwrap();
    let tail_source = tree.copy_source(11, 1).unwrap();
    tree.add_child(drop_tail, tail_source).unwrap();
    let tail_target = tree.copy_target(0, tail_source).unwrap();

    tree.add_children(root, &[drop_call, tail_target, drop_tail, call_target])
        .unwrap();
    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "3, foo(1, 2)");
}

#[test]
fn test_swap_adjacent_arguments() {
    let mut doc = StringDocument::from("foo(1, 2), 3");
    let mut tree = EditTree::new();
    let root = tree.root();

    let drop_first = tree.replace(4, 1, "").unwrap();
    let first_source = tree.copy_source(4, 1).unwrap();
    tree.add_child(drop_first, first_source).unwrap();
    let first_target = tree.copy_target(7, first_source).unwrap();

    let drop_second = tree.replace(7, 1, "").unwrap();
    let second_source = tree.copy_source(7, 1).unwrap();
    tree.add_child(drop_second, second_source).unwrap();
    let second_target = tree.copy_target(4, second_source).unwrap();

    tree.add_children(
        root,
        &[drop_first, second_target, drop_second, first_target],
    )
    .unwrap();
    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "foo(2, 1), 3");
}

#[test]
fn test_swap_nested_inside_a_swap() {
    let mut doc = StringDocument::from("foo(1, 2), 3");
    let mut tree = EditTree::new();
    let root = tree.root();

    // inner swap of the two arguments, built inside the copied call
    let call_source = tree.copy_source(0, 9).unwrap();
    let drop_first = tree.replace(4, 1, "").unwrap();
    let first_source = tree.copy_source(4, 1).unwrap();
    tree.add_child(drop_first, first_source).unwrap();
    let first_target = tree.copy_target(7, first_source).unwrap();
    let drop_second = tree.replace(7, 1, "").unwrap();
    let second_source = tree.copy_source(7, 1).unwrap();
    tree.add_child(drop_second, second_source).unwrap();
    let second_target = tree.copy_target(4, second_source).unwrap();
    tree.add_children(
        call_source,
        &[drop_first, second_target, drop_second, first_target],
    )
    .unwrap();

    // outer swap of the call and the trailing argument
    let drop_call = tree.replace(0, 9, "").unwrap();
    tree.add_child(drop_call, call_source).unwrap();
    let call_target = tree.copy_target(11, call_source).unwrap();
    let drop_tail = tree.replace(11, 1, "").unwrap();
    let tail_source = tree.copy_source(11, 1).unwrap();
    tree.add_child(drop_tail, tail_source).unwrap();
    let tail_target = tree.copy_target(0, tail_source).unwrap();

    tree.add_children(root, &[drop_call, tail_target, drop_tail, call_target])
        .unwrap();
    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "3, foo(2, 1)");
}

// ===== Source modifiers =====

#[test]
fn test_modifier_replacement_inside_a_marker() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 4).unwrap();
    let target = tree.move_target(9, source).unwrap();
    let marker = tree.range_marker(3, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.set_source_modifier(source, rewrite(&[(1, 1, "aa")]))
        .unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "016782aa459");
    assert_span(&tree, marker, 6, 3);
}

#[test]
fn test_modifier_replacement_covering_whole_markers() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 4).unwrap();
    let target = tree.move_target(9, source).unwrap();
    let left = tree.range_marker(3, 0).unwrap();
    let right = tree.range_marker(3, 0).unwrap();
    let tail = tree.range_marker(4, 2).unwrap();
    tree.add_children(source, &[left, right, tail]).unwrap();
    tree.set_source_modifier(source, rewrite(&[(0, 2, "aa")]))
        .unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01678aa459");
    assert!(tree.is_deleted(left));
    assert!(tree.is_deleted(right));
    assert_span(&tree, tail, 7, 2);
}

#[test]
fn test_modifier_replacement_split_at_a_marker_start() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 4).unwrap();
    let target = tree.move_target(9, source).unwrap();
    let marker = tree.range_marker(3, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.set_source_modifier(source, rewrite(&[(0, 2, "aa")]))
        .unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "01678aa459");
    assert_span(&tree, marker, 7, 1);
}

#[test]
fn test_modifier_replacement_split_at_a_marker_end() {
    let (mut doc, mut tree) = fixture();
    let root = tree.root();
    let source = tree.move_source(2, 4).unwrap();
    let target = tree.move_target(9, source).unwrap();
    let marker = tree.range_marker(3, 2).unwrap();
    tree.add_child(source, marker).unwrap();
    tree.set_source_modifier(source, rewrite(&[(2, 2, "aa")]))
        .unwrap();
    tree.add_children(root, &[source, target]).unwrap();

    tree.apply(&mut doc).unwrap();
    assert_eq!(doc.as_str(), "0167823aa9");
    assert_span(&tree, marker, 6, 3);
}
