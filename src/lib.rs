//! domtree - mutable document tree with an indentation-driven parser
//!
//! The tree lives in an arena ([`Document`]) and is addressed by [`NodeId`]
//! handles. Structure changes go through the mutation operations, which keep
//! the child lists and the child-to-parent table consistent. Two walkers are
//! provided: [`Document::recurse`] for read-only visits and
//! [`Document::reshape`] for rewriting a subtree while walking it.
//!
//! # Example
//!
//! ```
//! use domtree::Parser;
//!
//! let text = "<doc>\n  <para id=\"p1\">\n      Hello\n";
//! let doc = Parser::new().parse_str(text, "inline").unwrap();
//! let root = doc.root().unwrap();
//! let para = doc.contents(root)[0];
//! assert_eq!(doc.tag(para), "para");
//! assert_eq!(doc.text_content(para), "Hello\n");
//! ```

pub mod arena;
pub mod config;
pub mod errors;
pub mod mutation;
pub mod navigation;
pub mod node;
pub mod parser;
pub mod traversal;
pub mod util;

pub use arena::Document;
pub use config::{ParserSettings, Settings};
pub use errors::{CallbackError, DomError, DomResult};
pub use navigation::TagPattern;
pub use node::{Node, NodeId, PCDATA_TAG};
pub use parser::Parser;
pub use traversal::{Order, Phase, Reshaped, Walk};
