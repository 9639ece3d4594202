use generational_arena::Arena;
use std::collections::HashMap;
use tracing::{instrument, trace};

use crate::errors::{DomError, DomResult};
use crate::node::{Node, NodeId};

/// Arena-backed document tree.
///
/// All nodes live in a generational arena and are addressed by [`NodeId`].
/// Children are owned through each node's child list; the child-to-parent
/// relation is a separate lookup table that owns nothing and is kept in
/// step by the mutation operations.
#[derive(Debug)]
pub struct Document {
    /// Arena storage for all nodes, attached or not
    arena: Arena<Node>,
    /// Child to parent lookup
    pub(crate) parents: HashMap<NodeId, NodeId>,
    /// Root element, None for empty documents
    root: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            parents: HashMap::new(),
            root: None,
        }
    }

    /// Inserts a detached node and returns its handle.
    #[instrument(level = "trace", skip(self, node), fields(tag = %node.tag))]
    pub fn insert(&mut self, node: Node) -> NodeId {
        NodeId(self.arena.insert(node))
    }

    pub fn create_element(
        &mut self,
        tag: impl Into<String>,
        attributes: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> NodeId {
        self.insert(Node::element(tag, attributes))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(Node::text(text))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    /// Mutable access to tag, attributes, text and internal data.
    ///
    /// Children stay reachable only through the mutation operations.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::UnknownNode(id))
    }

    /// Tag of a node, empty for stale handles.
    pub fn tag(&self, id: NodeId) -> &str {
        self.get(id).map(|n| n.tag.as_str()).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// Number of nodes held by the arena, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// True if `ancestor` is `id` itself or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Frees a detached node together with its subtree.
    ///
    /// Handles into the subtree go stale afterwards.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> DomResult<usize> {
        self.node(id)?;
        if self.parent(id).is_some() {
            return Err(DomError::StillAttached(id));
        }
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current.0) {
                stack.extend(node.children);
                removed += 1;
            }
            self.parents.remove(&current);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        trace!(removed, "discarded subtree");
        Ok(removed)
    }

    /// Pre-order iterator over `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(id))
    }

    /// Pre-order iterator over the whole tree below the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, self.root)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Concatenated text of all text nodes below `id`, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter(|(_, node)| node.is_text())
            .map(|(_, node)| node.text.as_str())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(doc: &'a Document, start: Option<NodeId>) -> Self {
        Self {
            doc,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.doc.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    doc: &'a Document,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(doc: &'a Document, start: Option<NodeId>) -> Self {
        Self {
            doc,
            stack: start.map(|id| (id, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.doc.get(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, [NodeId; 4]) {
        let mut doc = Document::new();
        let a = doc.create_element("a", []);
        let b = doc.create_text("b\n");
        let c = doc.create_element("c", []);
        let d = doc.create_text("d\n");
        doc.append(a, [b, c]).unwrap();
        doc.append(c, [d]).unwrap();
        doc.set_root(Some(a));
        (doc, [a, b, c, d])
    }

    #[test]
    fn test_iter_orders() {
        let (doc, [a, b, c, d]) = sample();
        let pre: Vec<_> = doc.iter().map(|(id, _)| id).collect();
        assert_eq!(pre, vec![a, b, c, d]);
        let post: Vec<_> = doc.iter_postorder().map(|(id, _)| id).collect();
        assert_eq!(post, vec![b, d, c, a]);
    }

    #[test]
    fn test_depth_and_text_content() {
        let (doc, [a, _, c, _]) = sample();
        assert_eq!(doc.depth(), 3);
        assert_eq!(doc.text_content(a), "b\nd\n");
        assert_eq!(doc.text_content(c), "d\n");
    }

    #[test]
    fn test_discard_makes_handles_stale() {
        let (mut doc, [a, _, c, d]) = sample();
        assert!(matches!(doc.discard(c), Err(DomError::StillAttached(_))));

        assert!(doc.detach(c).unwrap());
        assert_eq!(doc.discard(c).unwrap(), 2);
        assert!(!doc.contains(c));
        assert!(!doc.contains(d));
        assert_eq!(doc.parent(d), None);
        assert_eq!(doc.contents(a).len(), 1);
    }

    #[test]
    fn test_is_ancestor_or_self() {
        let (doc, [a, b, c, d]) = sample();
        assert!(doc.is_ancestor_or_self(a, d));
        assert!(doc.is_ancestor_or_self(c, c));
        assert!(!doc.is_ancestor_or_self(b, d));
    }
}
