use thiserror::Error;

use crate::node::NodeId;
use crate::traversal::Phase;

/// Error raised by a user-supplied traversal callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("{phase} callback failed on <{tag}> ({node}): {source}")]
    Callback {
        phase: Phase,
        node: NodeId,
        tag: String,
        #[source]
        source: CallbackError,
    },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Text node cannot take children: {0}")]
    TextNodeChildren(NodeId),

    #[error("Cycle detected: {0} would become its own descendant")]
    CycleDetected(NodeId),

    #[error("Node is still attached to a parent: {0}")]
    StillAttached(NodeId),

    #[error("Text outside of any element in {input}, line {line}")]
    TextOutsideElement { input: String, line: usize },

    #[error("No element found in {0}")]
    EmptyDocument(String),

    #[error("Invalid tag pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

impl DomError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type DomResult<T> = Result<T, DomError>;
