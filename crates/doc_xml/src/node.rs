//! Node identifiers and node payloads

use quick_xml::escape::escape;
use std::fmt;

/// Index of a node inside an [`XmlTree`](crate::XmlTree) arena.
///
/// Ids stay valid for the lifetime of the tree: detaching a node removes it from
/// its parent but never frees its slot, so ids computed before a mutation still
/// point at the same node afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Get the raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source markup captured for a parsed element
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Markup {
    pub(crate) open: String,
    pub(crate) close: Option<String>,
}

/// An element with its qualified name and unescaped attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    markup: Option<Markup>,
}

impl Element {
    /// Create a new element that will be serialized from its name and attributes
    pub fn new(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            attributes,
            markup: None,
        }
    }

    pub(crate) fn parsed(
        name: String,
        attributes: Vec<(String, String)>,
        open: String,
        close: Option<String>,
    ) -> Self {
        Self {
            name,
            attributes,
            markup: Some(Markup { open, close }),
        }
    }

    /// Qualified name, e.g. `w:r`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace prefix of the name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Local part of the name, e.g. `r` for `w:r`
    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(self.name.as_str(), |(_, local)| local)
    }

    /// All attributes in source order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Attribute value by exact qualified key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by local name, ignoring the prefix.
    ///
    /// Namespace declarations and `xml:` attributes never match.
    pub fn attribute_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| match k.split_once(':') {
                Some(("xmlns", _)) | Some(("xml", _)) => false,
                Some((_, l)) => l == local,
                None => k == local,
            })
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_close(&mut self, close: String) {
        if let Some(markup) = self.markup.as_mut() {
            markup.close = Some(close);
        }
    }

    pub(crate) fn write_open(&self, out: &mut String, has_children: bool) -> bool {
        if let Some(markup) = &self.markup {
            if markup.close.is_some() || !has_children {
                out.push_str(&markup.open);
                return markup.close.is_some();
            }
        }
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if has_children {
            out.push('>');
            true
        } else {
            out.push_str("/>");
            false
        }
    }

    pub(crate) fn write_close(&self, out: &mut String) {
        match self.markup.as_ref().and_then(|m| m.close.as_ref()) {
            Some(close) => out.push_str(close),
            None => {
                out.push_str("</");
                out.push_str(&self.name);
                out.push('>');
            }
        }
    }
}

/// Payload of a node in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root holding the top-level nodes
    Document,
    /// An element
    Element(Element),
    /// Character data, stored escaped exactly as it appears in markup
    Text(String),
    /// Declaration, comment, processing instruction, CDATA or doctype, verbatim
    Other(String),
}
