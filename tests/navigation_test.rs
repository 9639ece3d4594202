//! Tests for next() navigation

use rstest::{fixture, rstest};

use domtree::{Document, NodeId, TagPattern};

struct Outline {
    doc: Document,
    root: NodeId,
    sec1: NodeId,
    p1: NodeId,
    inner_note: NodeId,
    outer_note: NodeId,
    sec2: NodeId,
}

/// root(sec1(p1, note), note, sec2)
#[fixture]
fn outline() -> Outline {
    let mut doc = Document::new();
    let root = doc.create_element("root", []);
    let sec1 = doc.create_element("section", []);
    let p1 = doc.create_element("para", []);
    let inner_note = doc.create_element("note", []);
    let outer_note = doc.create_element("note", []);
    let sec2 = doc.create_element("section", []);
    doc.append(root, [sec1, outer_note, sec2]).unwrap();
    doc.append(sec1, [p1, inner_note]).unwrap();
    doc.set_root(Some(root));
    Outline {
        doc,
        root,
        sec1,
        p1,
        inner_note,
        outer_note,
        sec2,
    }
}

#[rstest]
fn given_following_sibling_when_next_then_returns_it(outline: Outline) {
    assert_eq!(outline.doc.next(outline.p1, None), Some(outline.inner_note));
    assert_eq!(outline.doc.next(outline.sec1, None), Some(outline.outer_note));
}

#[rstest]
fn given_last_child_when_next_then_ascends_to_parent_sibling(outline: Outline) {
    assert_eq!(outline.doc.next(outline.inner_note, None), Some(outline.outer_note));
}

#[rstest]
fn given_ignore_pattern_when_next_then_skips_matching_tags_on_every_level(outline: Outline) {
    let ignore = TagPattern::new("note").unwrap();

    assert_eq!(outline.doc.next(outline.p1, Some(&ignore)), Some(outline.sec2));
    assert_eq!(outline.doc.next(outline.sec1, Some(&ignore)), Some(outline.sec2));
}

#[rstest]
fn given_partial_tag_match_when_next_then_sibling_is_not_skipped(outline: Outline) {
    let ignore = TagPattern::new("not").unwrap();

    assert_eq!(outline.doc.next(outline.p1, Some(&ignore)), Some(outline.inner_note));
}

#[rstest]
fn given_last_node_in_document_when_next_then_none(outline: Outline) {
    assert_eq!(outline.doc.next(outline.sec2, None), None);
}

#[rstest]
fn given_root_when_next_then_none(outline: Outline) {
    assert_eq!(outline.doc.next(outline.root, None), None);
}

#[rstest]
fn given_everything_after_ignored_when_next_then_none(outline: Outline) {
    let ignore = TagPattern::any_of(["note", "section"]).unwrap();

    assert_eq!(outline.doc.next(outline.p1, Some(&ignore)), None);
}
