//! WordprocessingML vocabulary
//!
//! The lookup is built once per process and only read afterwards. Matching is
//! by local name so that a document binding the main namespace to a prefix
//! other than `w` is handled the same way.

use crate::node::NodeId;
use crate::tree::XmlTree;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Main WordprocessingML namespace
pub const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Elements the merge engine cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordElement {
    Paragraph,
    Run,
    RunProperties,
    Text,
    FieldChar,
    InstrText,
    SimpleField,
    Break,
    Tab,
}

/// Read-only name table for WordprocessingML content
#[derive(Debug)]
pub struct WordMl {
    by_local_name: HashMap<&'static str, WordElement>,
}

/// Process-wide instance of the name table
pub static WORDML: Lazy<WordMl> = Lazy::new(WordMl::new);

impl WordMl {
    fn new() -> Self {
        let by_local_name = [
            ("p", WordElement::Paragraph),
            ("r", WordElement::Run),
            ("rPr", WordElement::RunProperties),
            ("t", WordElement::Text),
            ("fldChar", WordElement::FieldChar),
            ("instrText", WordElement::InstrText),
            ("fldSimple", WordElement::SimpleField),
            ("br", WordElement::Break),
            ("tab", WordElement::Tab),
        ]
        .into_iter()
        .collect();
        Self { by_local_name }
    }

    /// Local name used for an element kind
    pub fn local_name(&self, kind: WordElement) -> &'static str {
        self.by_local_name
            .iter()
            .find(|(_, k)| **k == kind)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }

    /// Classify an element node
    pub fn classify(&self, tree: &XmlTree, id: NodeId) -> Option<WordElement> {
        tree.local_name(id)
            .and_then(|name| self.by_local_name.get(name).copied())
    }

    /// Whether the node is an element of the given kind
    pub fn is(&self, tree: &XmlTree, id: NodeId, kind: WordElement) -> bool {
        self.classify(tree, id) == Some(kind)
    }

    /// Qualified name for a new element, reusing the prefix of `like`
    pub fn qualified(&self, tree: &XmlTree, like: NodeId, kind: WordElement) -> String {
        let local = self.local_name(kind);
        match tree.element(like).and_then(|e| e.prefix()) {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Nearest ancestor-or-self of the given kind
    pub fn enclosing(&self, tree: &XmlTree, id: NodeId, kind: WordElement) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is(tree, node, kind) {
                return Some(node);
            }
            current = tree.parent(node);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ignores_prefix() {
        let tree = XmlTree::parse("<x:r xmlns:x=\"urn:x\"><x:t>a</x:t></x:r>").unwrap();
        let ids: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(WORDML.classify(&tree, ids[0]), Some(WordElement::Run));
        assert_eq!(WORDML.classify(&tree, ids[1]), Some(WordElement::Text));
        assert_eq!(WORDML.classify(&tree, ids[2]), None);
    }

    #[test]
    fn test_qualified_reuses_prefix() {
        let tree = XmlTree::parse("<x:r xmlns:x=\"urn:x\"/>").unwrap();
        let run = tree.children(tree.root())[0];
        assert_eq!(WORDML.qualified(&tree, run, WordElement::Text), "x:t");
        let bare = XmlTree::parse("<r/>").unwrap();
        let run = bare.children(bare.root())[0];
        assert_eq!(WORDML.qualified(&bare, run, WordElement::Break), "br");
    }

    #[test]
    fn test_enclosing_run() {
        let tree = XmlTree::parse("<w:p><w:r><w:t>a</w:t></w:r></w:p>").unwrap();
        let t = tree.descendants(tree.root()).nth(2).unwrap();
        let run = WORDML.enclosing(&tree, t, WordElement::Run).unwrap();
        assert_eq!(tree.local_name(run), Some("r"));
        assert!(WORDML.enclosing(&tree, run, WordElement::SimpleField).is_none());
    }
}
