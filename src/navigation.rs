use regex::Regex;
use tracing::debug;

use crate::arena::Document;
use crate::errors::{DomError, DomResult};
use crate::node::NodeId;

/// Tag alternation matched against whole tag names.
#[derive(Debug, Clone)]
pub struct TagPattern {
    regex: Regex,
}

impl TagPattern {
    /// Compiles `pattern`, e.g. `"comment|#PCDATA"`. The pattern must match a
    /// tag in full.
    pub fn new(pattern: &str) -> DomResult<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            DomError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self { regex })
    }

    /// Pattern matching exactly the given tag names.
    pub fn any_of<I, S>(tags: I) -> DomResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternation = tags
            .into_iter()
            .map(|t| regex::escape(t.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        Self::new(&alternation)
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }
}

impl Document {
    /// Next node in document order outside the subtree of `node`.
    ///
    /// Siblings whose tag matches `ignore` are skipped at every level on the
    /// way up. Returns `None` once the top of the tree is passed.
    pub fn next(&self, node: NodeId, ignore: Option<&TagPattern>) -> Option<NodeId> {
        if self.parent(node).is_none() {
            debug!(%node, "next() called on a node without parent");
            return None;
        }
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            let siblings = self.contents(parent);
            let start = siblings.iter().position(|&c| c == current)? + 1;
            let found = siblings[start..]
                .iter()
                .copied()
                .find(|&sibling| !ignore.is_some_and(|p| p.matches(self.tag(sibling))));
            if found.is_some() {
                return found;
            }
            current = parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches_whole_tag() {
        let pattern = TagPattern::new("note|tip").unwrap();
        assert!(pattern.matches("note"));
        assert!(pattern.matches("tip"));
        assert!(!pattern.matches("notes"));
        assert!(!pattern.matches("footnote"));
    }

    #[test]
    fn test_any_of_escapes_reserved_characters() {
        let pattern = TagPattern::any_of(["#PCDATA", "a.b"]).unwrap();
        assert!(pattern.matches("#PCDATA"));
        assert!(pattern.matches("a.b"));
        assert!(!pattern.matches("axb"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = TagPattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, DomError::InvalidPattern { .. }));
    }
}
