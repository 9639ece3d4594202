#![allow(dead_code)]

use domtree::{Document, NodeId};

/// Builds `A(B, C(D))` with B and D as text nodes.
pub struct Sample {
    pub doc: Document,
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub d: NodeId,
}

pub fn sample() -> Sample {
    let mut doc = Document::new();
    let a = doc.create_element("A", []);
    let b = doc.create_element("B", []);
    let c = doc.create_element("C", []);
    let d = doc.create_element("D", []);
    doc.append(a, [b, c]).unwrap();
    doc.append(c, [d]).unwrap();
    doc.set_root(Some(a));
    Sample { doc, a, b, c, d }
}

pub fn tags(doc: &Document, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| doc.tag(id).to_string()).collect()
}

/// Every listed child points back to its parent, exactly once.
pub fn assert_consistent(doc: &Document, root: NodeId) {
    assert_eq!(doc.parent(root), None, "root must not have a parent");
    for (id, node) in doc.descendants(root) {
        for &child in node.children() {
            assert_eq!(doc.parent(child), Some(id), "parent of {}", child);
            let occurrences = node.children().iter().filter(|&&c| c == child).count();
            assert_eq!(occurrences, 1, "{} listed {} times", child, occurrences);
        }
    }
}
