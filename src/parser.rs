//! Indentation-driven parser for the pseudo-markup format.
//!
//! An opening tag line `<name key="v" key='v' flag>` opens an element; every
//! other line is text. There are no closing tags: nesting follows from the
//! leading whitespace of each line, tracked on a stack of open elements.

use std::collections::HashMap;
use std::io::BufRead;

use regex::Regex;
use tracing::{debug, instrument, trace, warn};

use crate::arena::Document;
use crate::config::ParserSettings;
use crate::errors::{DomError, DomResult};
use crate::node::{NodeId, LINE_KEY, SOURCE_KEY};

type Attributes = HashMap<String, Option<String>>;

pub struct Parser {
    settings: ParserSettings,
    tag_regex: Regex,
    attr_regex: Regex,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Open element together with the indentation of its tag line.
struct Open {
    node: NodeId,
    indent: usize,
}

struct ParseState<'s> {
    doc: Document,
    stack: Vec<Open>,
    source: &'s str,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_settings(ParserSettings::default())
    }

    pub fn with_settings(settings: ParserSettings) -> Self {
        Self {
            settings,
            tag_regex: Regex::new(r"^<([A-Za-z_][\w.:-]*)(.*)>\s*$").unwrap(),
            attr_regex: Regex::new(r#"^\s+([^\s="'<>]+)(?:=(?:"([^"]*)"|'([^']*)'))?"#).unwrap(),
        }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Parses `first_line` followed by the lines of `rest`.
    ///
    /// `source` names the input; it ends up on the root's source attribute
    /// and in every node's internal data.
    #[instrument(level = "debug", skip(self, first_line, rest))]
    pub fn parse<R: BufRead>(&self, first_line: &str, rest: R, source: &str) -> DomResult<Document> {
        let mut state = ParseState {
            doc: Document::new(),
            stack: Vec::new(),
            source,
        };
        self.feed(&mut state, first_line, 1)?;
        for (i, line) in rest.lines().enumerate() {
            let number = i + 2;
            let line = line.map_err(|e| DomError::io(format!("read {} line {}", source, number), e))?;
            self.feed(&mut state, &line, number)?;
        }
        self.finish(state)
    }

    pub fn parse_str(&self, text: &str, source: &str) -> DomResult<Document> {
        match text.split_once('\n') {
            Some((first, rest)) => self.parse(first, rest.as_bytes(), source),
            None => self.parse(text, &b""[..], source),
        }
    }

    fn feed(&self, state: &mut ParseState<'_>, line: &str, number: usize) -> DomResult<()> {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

        if line.trim().is_empty() {
            if let Some(top) = state.stack.last() {
                let parent = top.node;
                self.add_text(state, parent, "", number)?;
            }
            return Ok(());
        }

        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        while let Some(top) = state.stack.last() {
            if top.indent + self.settings.indent_tolerance >= indent {
                state.stack.pop();
            } else {
                break;
            }
        }
        let top = state.stack.last().map(|open| (open.node, open.indent));
        trace!(number, indent, depth = state.stack.len(), "line");

        if let Some((tag, attributes)) = self.parse_open_tag(line.trim_start()) {
            let node = state.doc.create_element(tag, attributes);
            record(&mut state.doc, node, state.source, number);
            match top {
                Some((parent, _)) => {
                    state.doc.append(parent, [node])?;
                }
                None => {
                    if let Some(previous) = state.doc.root() {
                        warn!(%previous, line = number, "second top-level element replaces the root");
                    }
                    state.doc.set_root(Some(node));
                }
            }
            state.stack.push(Open { node, indent });
            return Ok(());
        }

        let Some((parent, parent_indent)) = top else {
            return Err(DomError::TextOutsideElement {
                input: state.source.to_string(),
                line: number,
            });
        };
        let text = strip_indent(line, parent_indent + self.settings.content_indent);
        self.add_text(state, parent, text, number)
    }

    /// Appends a text line to `parent`, merging into a trailing text node.
    fn add_text(
        &self,
        state: &mut ParseState<'_>,
        parent: NodeId,
        text: &str,
        number: usize,
    ) -> DomResult<()> {
        let doc = &mut state.doc;
        let trailing_text = doc
            .last(parent)
            .filter(|&id| doc.get(id).is_some_and(|n| n.is_text()));
        match trailing_text {
            Some(id) => {
                let node = doc.node_mut(id)?;
                node.text.push_str(text);
                node.text.push('\n');
            }
            None => {
                let id = doc.create_text(format!("{}\n", text));
                record(doc, id, state.source, number);
                doc.append(parent, [id])?;
            }
        }
        Ok(())
    }

    fn finish(&self, state: ParseState<'_>) -> DomResult<Document> {
        let mut doc = state.doc;
        let root = doc
            .root()
            .ok_or_else(|| DomError::EmptyDocument(state.source.to_string()))?;
        let node = doc.node_mut(root)?;
        node.set_attribute(
            self.settings.source_attribute.clone(),
            Some(state.source.to_string()),
        );
        debug!(nodes = doc.len(), depth = doc.depth(), "parsed document");
        Ok(doc)
    }

    /// Tag name and attributes of an opening tag line, or `None` if the line
    /// is text. Any unparseable attribute text makes the whole line text.
    fn parse_open_tag(&self, content: &str) -> Option<(String, Attributes)> {
        let caps = self.tag_regex.captures(content)?;
        let tag = caps.get(1)?.as_str();
        let mut rest = caps.get(2).map_or("", |m| m.as_str());
        let mut attributes = Attributes::new();

        while let Some(attr) = self.attr_regex.captures(rest) {
            let whole = attr.get(0)?;
            let name = attr.get(1)?.as_str().to_string();
            let value = attr.get(2).or_else(|| attr.get(3)).map(|m| m.as_str().to_string());
            attributes.insert(name, value);
            rest = &rest[whole.end()..];
        }

        if !rest.trim().is_empty() {
            debug!(tag, remainder = rest, "malformed attributes, treating line as text");
            return None;
        }
        Some((tag.to_string(), attributes))
    }
}

fn record(doc: &mut Document, node: NodeId, source: &str, number: usize) {
    if let Some(node) = doc.get_mut(node) {
        node.internal.insert(LINE_KEY.to_string(), number.to_string());
        node.internal.insert(SOURCE_KEY.to_string(), source.to_string());
    }
}

/// Drops up to `width` leading whitespace characters.
fn strip_indent(line: &str, width: usize) -> &str {
    let mut offset = 0;
    for (count, c) in line.chars().enumerate() {
        if count == width || !c.is_whitespace() {
            break;
        }
        offset += c.len_utf8();
    }
    &line[offset..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tag_with_mixed_attributes() {
        let parser = Parser::new();
        let (tag, attrs) = parser
            .parse_open_tag(r#"<image uri="a.png" alt='An image' inline>"#)
            .unwrap();
        assert_eq!(tag, "image");
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs["uri"].as_deref(), Some("a.png"));
        assert_eq!(attrs["alt"].as_deref(), Some("An image"));
        assert_eq!(attrs["inline"], None);
    }

    #[test]
    fn test_open_tag_allows_trailing_whitespace() {
        let parser = Parser::new();
        let (tag, attrs) = parser.parse_open_tag("<section  >  ").unwrap();
        assert_eq!(tag, "section");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_malformed_attributes_fall_through() {
        let parser = Parser::new();
        assert!(parser.parse_open_tag(r#"<a ok="1" bad=unquoted>"#).is_none());
        assert!(parser.parse_open_tag(r#"<a x="1"y="2">"#).is_none());
        assert!(parser.parse_open_tag(r#"<a x="unterminated>"#).is_none());
        assert!(parser.parse_open_tag("<a> trailing").is_none());
        assert!(parser.parse_open_tag("plain text").is_none());
    }

    #[test]
    fn test_strip_indent_stops_at_content() {
        assert_eq!(strip_indent("      text", 6), "text");
        assert_eq!(strip_indent("        text", 6), "  text");
        assert_eq!(strip_indent("    text", 6), "text");
        assert_eq!(strip_indent("text", 4), "text");
    }
}
