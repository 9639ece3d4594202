//! Structural mutation of the document tree.
//!
//! Every operation here keeps the child lists and the parent table in step:
//! a node listed in `p`'s children has `p` as parent, and a node dropped from
//! a child list loses its parent entry unless it was put back.

use tracing::{instrument, trace, warn};

use crate::arena::Document;
use crate::errors::{DomError, DomResult};
use crate::node::NodeId;

impl Document {
    /// Adds `children` at the end, in argument order. Returns the new child count.
    #[instrument(level = "trace", skip(self, children))]
    pub fn append(
        &mut self,
        node: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> DomResult<usize> {
        let children: Vec<NodeId> = children.into_iter().collect();
        self.check_attach(node, &children)?;
        for &child in &children {
            self.adopt(node, child);
        }
        let target = self.node_mut(node)?;
        target.children.extend(children);
        Ok(target.children.len())
    }

    /// Adds `children` at the front, in argument order. Returns the new child count.
    #[instrument(level = "trace", skip(self, children))]
    pub fn prepend(
        &mut self,
        node: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> DomResult<usize> {
        let children: Vec<NodeId> = children.into_iter().collect();
        self.check_attach(node, &children)?;
        for &child in &children {
            self.adopt(node, child);
        }
        let target = self.node_mut(node)?;
        target.children.splice(0..0, children);
        Ok(target.children.len())
    }

    /// Installs `children` as the complete content of `node`.
    ///
    /// Returns the previous children; those not part of the new content lose
    /// their parent entry.
    #[instrument(level = "trace", skip(self, children))]
    pub fn replace(
        &mut self,
        node: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> DomResult<Vec<NodeId>> {
        let children: Vec<NodeId> = children.into_iter().collect();
        self.check_attach(node, &children)?;
        let old = std::mem::replace(&mut self.node_mut(node)?.children, children.clone());
        self.release(node, &old, &children);
        for &child in &children {
            self.adopt(node, child);
        }
        Ok(old)
    }

    /// Removes `count` children starting at `start` and inserts `children`
    /// in their place.
    ///
    /// `start` and `count` are clamped to the available range. Returns the
    /// removed nodes in their original order.
    #[instrument(level = "trace", skip(self, children))]
    pub fn splice(
        &mut self,
        node: NodeId,
        start: usize,
        count: usize,
        children: impl IntoIterator<Item = NodeId>,
    ) -> DomResult<Vec<NodeId>> {
        let children: Vec<NodeId> = children.into_iter().collect();
        self.check_attach(node, &children)?;
        let target = self.node_mut(node)?;
        let len = target.children.len();
        let start = start.min(len);
        let end = start.saturating_add(count).min(len);
        let removed: Vec<NodeId> = target
            .children
            .splice(start..end, children.iter().copied())
            .collect();
        self.release(node, &removed, &children);
        for &child in &children {
            self.adopt(node, child);
        }
        trace!(start, removed = removed.len(), inserted = children.len(), "spliced");
        Ok(removed)
    }

    /// Puts `replacements` into the slot `node` occupies in its parent.
    ///
    /// Returns `false` without touching anything when `node` has no parent or
    /// is not listed by it.
    #[instrument(level = "trace", skip(self, replacements))]
    pub fn substitute(
        &mut self,
        node: NodeId,
        replacements: impl IntoIterator<Item = NodeId>,
    ) -> DomResult<bool> {
        let Some(parent) = self.parent(node) else {
            return Ok(false);
        };
        let Some(position) = self.index(parent, node) else {
            return Ok(false);
        };
        self.splice(parent, position, 1, replacements)?;
        Ok(true)
    }

    /// Removes `node` from its parent.
    pub fn detach(&mut self, node: NodeId) -> DomResult<bool> {
        self.substitute(node, [])
    }

    /// Position of `child` among the children of `node`.
    pub fn index(&self, node: NodeId, child: NodeId) -> Option<usize> {
        self.contents(node).iter().position(|&c| c == child)
    }

    pub fn num_contents(&self, node: NodeId) -> usize {
        self.contents(node).len()
    }

    /// Children of `node` in order; empty for stale handles.
    pub fn contents(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn last(&self, node: NodeId) -> Option<NodeId> {
        self.contents(node).last().copied()
    }

    fn check_attach(&self, node: NodeId, children: &[NodeId]) -> DomResult<()> {
        let target = self.node(node)?;
        if target.is_text() && !children.is_empty() {
            return Err(DomError::TextNodeChildren(node));
        }
        for &child in children {
            self.node(child)?;
            if self.is_ancestor_or_self(child, node) {
                return Err(DomError::CycleDetected(child));
            }
        }
        Ok(())
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        if let Some(previous) = self.parents.insert(child, parent) {
            if previous != parent && self.index(previous, child).is_some() {
                warn!(%child, %previous, %parent, "node attached under a second parent");
            }
        }
    }

    fn release(&mut self, parent: NodeId, removed: &[NodeId], kept: &[NodeId]) {
        for child in removed {
            if !kept.contains(child) && self.parent(*child) == Some(parent) {
                self.parents.remove(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(doc: &mut Document, tags: &[&str]) -> Vec<NodeId> {
        tags.iter().map(|t| doc.create_element(*t, [])).collect()
    }

    #[test]
    fn test_append_sets_parent_and_returns_count() {
        let mut doc = Document::new();
        let ids = elements(&mut doc, &["p", "a", "b"]);
        assert_eq!(doc.append(ids[0], [ids[1], ids[2]]).unwrap(), 2);
        assert_eq!(doc.contents(ids[0]), &[ids[1], ids[2]]);
        assert_eq!(doc.parent(ids[1]), Some(ids[0]));
        assert_eq!(doc.last(ids[0]), Some(ids[2]));
    }

    #[test]
    fn test_text_node_rejects_children() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        let child = doc.create_element("b", []);
        assert!(matches!(
            doc.append(text, [child]),
            Err(DomError::TextNodeChildren(_))
        ));
        assert_eq!(doc.parent(child), None);
        assert_eq!(doc.append(text, []).unwrap(), 0);
    }

    #[test]
    fn test_cycle_is_rejected_without_changes() {
        let mut doc = Document::new();
        let ids = elements(&mut doc, &["a", "b", "c"]);
        doc.append(ids[0], [ids[1]]).unwrap();
        doc.append(ids[1], [ids[2]]).unwrap();

        assert!(matches!(
            doc.append(ids[2], [ids[0]]),
            Err(DomError::CycleDetected(_))
        ));
        assert!(matches!(
            doc.append(ids[1], [ids[1]]),
            Err(DomError::CycleDetected(_))
        ));
        assert_eq!(doc.num_contents(ids[2]), 0);
    }

    #[test]
    fn test_stale_handle_is_unknown() {
        let mut doc = Document::new();
        let ids = elements(&mut doc, &["a", "b"]);
        doc.discard(ids[1]).unwrap();
        assert!(matches!(
            doc.append(ids[0], [ids[1]]),
            Err(DomError::UnknownNode(_))
        ));
        assert_eq!(doc.index(ids[0], ids[1]), None);
    }
}
