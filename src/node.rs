use generational_arena::Index;
use std::collections::HashMap;
use std::fmt;

/// Reserved tag marking a text node.
pub const PCDATA_TAG: &str = "#PCDATA";

/// Internal key holding the originating input identifier.
pub const SOURCE_KEY: &str = "source";
/// Internal key holding the 1-based source line a node was created from.
pub const LINE_KEY: &str = "line";

/// Handle of a node inside a [`Document`](crate::arena::Document).
///
/// Handles are generational: once a node is discarded its handle never
/// resolves again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// One element or one text run of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Element name, or [`PCDATA_TAG`] for text
    pub tag: String,
    /// Attribute values; `None` marks a bare attribute
    pub attributes: HashMap<String, Option<String>>,
    /// Text payload, only meaningful for text nodes
    pub text: String,
    /// Out-of-band bookkeeping, left alone by traversal
    pub internal: HashMap<String, String>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn element(
        tag: impl Into<String>,
        attributes: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attributes.into_iter().collect(),
            text: String::new(),
            internal: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: PCDATA_TAG.to_string(),
            attributes: HashMap::new(),
            text: text.into(),
            internal: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.tag == PCDATA_TAG
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Value of an attribute. Bare attributes yield `Some(None)`.
    pub fn attribute(&self, name: &str) -> Option<Option<&str>> {
        self.attributes.get(name).map(|v| v.as_deref())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Option<String>) {
        self.attributes.insert(name.into(), value);
    }

    pub fn source(&self) -> Option<&str> {
        self.internal.get(SOURCE_KEY).map(String::as_str)
    }

    pub fn line(&self) -> Option<usize> {
        self.internal.get(LINE_KEY).and_then(|l| l.parse().ok())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_text() {
            write!(f, "{} {:?}", self.tag, self.text)
        } else {
            write!(f, "<{}>", self.tag)
        }
    }
}
