//! Depth-first walkers over the document tree.
//!
//! [`Document::recurse`] visits nodes read-only. [`Document::reshape`] lets the
//! callback return replacement content for each node and splices the results
//! into the parent while walking, so a node's post call already sees its
//! reshaped children.

use std::fmt;
use tracing::{instrument, trace};

use crate::arena::Document;
use crate::errors::{CallbackError, DomError, DomResult};
use crate::node::NodeId;

/// When the callback runs relative to the node's descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Pre,
    #[default]
    Post,
    Both,
}

impl Order {
    fn has_pre(self) -> bool {
        matches!(self, Order::Pre | Order::Both)
    }

    fn has_post(self) -> bool {
        matches!(self, Order::Post | Order::Both)
    }
}

/// Which of the two possible invocations is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pre,
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pre => write!(f, "pre"),
            Phase::Post => write!(f, "post"),
        }
    }
}

/// Outcome of a [`Document::recurse`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Walk {
    #[default]
    Continue,
    /// Skip the node's children (and its post call). Only honoured in the pre call.
    Stop,
}

/// Replacement content returned by a [`Document::reshape`] callback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reshaped {
    #[default]
    Keep,
    Remove,
    Replace(Vec<NodeId>),
}

impl Reshaped {
    pub fn into_nodes(self, node: NodeId) -> Vec<NodeId> {
        match self {
            Reshaped::Keep => vec![node],
            Reshaped::Remove => Vec::new(),
            Reshaped::Replace(nodes) => nodes,
        }
    }
}

impl From<Vec<NodeId>> for Reshaped {
    fn from(nodes: Vec<NodeId>) -> Self {
        Reshaped::Replace(nodes)
    }
}

impl Document {
    /// Visits `node` and its descendants with `callback`.
    ///
    /// The first callback error aborts the walk.
    #[instrument(level = "debug", skip(self, callback))]
    pub fn recurse<F>(&self, node: NodeId, order: Order, mut callback: F) -> DomResult<()>
    where
        F: FnMut(&Document, NodeId, Phase) -> Result<Walk, CallbackError>,
    {
        self.recurse_node(node, order, &mut callback)
    }

    fn recurse_node<F>(&self, node: NodeId, order: Order, callback: &mut F) -> DomResult<()>
    where
        F: FnMut(&Document, NodeId, Phase) -> Result<Walk, CallbackError>,
    {
        if order.has_pre() {
            let walk = callback(self, node, Phase::Pre)
                .map_err(|e| self.callback_error(Phase::Pre, node, e))?;
            if walk == Walk::Stop {
                trace!(%node, "stopped before children");
                return Ok(());
            }
        }
        for &child in self.contents(node) {
            self.recurse_node(child, order, callback)?;
        }
        if order.has_post() {
            callback(self, node, Phase::Post)
                .map_err(|e| self.callback_error(Phase::Post, node, e))?;
        }
        Ok(())
    }

    /// Rewrites the subtree under `node` bottom-up and returns what `node`
    /// itself should be replaced with.
    ///
    /// The position of `node` in its own parent is left alone; use
    /// [`Document::substitute`] with the result if needed.
    #[instrument(level = "debug", skip(self, callback))]
    pub fn reshape<F>(&mut self, node: NodeId, order: Order, mut callback: F) -> DomResult<Vec<NodeId>>
    where
        F: FnMut(&mut Document, NodeId, Phase) -> Result<Reshaped, CallbackError>,
    {
        self.reshape_node(node, order, &mut callback)
    }

    fn reshape_node<F>(
        &mut self,
        node: NodeId,
        order: Order,
        callback: &mut F,
    ) -> DomResult<Vec<NodeId>>
    where
        F: FnMut(&mut Document, NodeId, Phase) -> Result<Reshaped, CallbackError>,
    {
        let mut result = Reshaped::Keep;
        if order.has_pre() {
            let pre = callback(self, node, Phase::Pre)
                .map_err(|e| self.callback_error(Phase::Pre, node, e))?;
            if order == Order::Pre {
                result = pre;
            }
        }

        let originals = self.contents(node).to_vec();
        let mut cursor = 0;
        for child in originals {
            let replacement: Vec<NodeId> = self
                .reshape_node(child, order, callback)?
                .into_iter()
                .filter(|&id| self.contains(id))
                .collect();
            let inserted = replacement.len();
            self.splice(node, cursor, 1, replacement)?;
            cursor += inserted;
        }

        if order.has_post() {
            result = callback(self, node, Phase::Post)
                .map_err(|e| self.callback_error(Phase::Post, node, e))?;
        }
        Ok(result.into_nodes(node))
    }

    fn callback_error(&self, phase: Phase, node: NodeId, source: CallbackError) -> DomError {
        DomError::Callback {
            phase,
            node,
            tag: self.tag(node).to_string(),
            source,
        }
    }
}
