//! Arena-backed XML tree
//!
//! The tree keeps the exact source markup of every parsed node so that a part
//! serialized without edits comes back byte-for-byte. Edited and newly created
//! nodes are serialized from their name, attributes and text.

use crate::error::{XmlError, XmlResult};
use crate::node::{Element, NodeId, NodeKind};
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable XML document
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree {
    /// Create an empty tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse XML text into a tree
    pub fn parse(content: &str) -> XmlResult<Self> {
        let mut tree = Self::new();
        let mut reader = Reader::from_str(content);
        let mut stack = vec![tree.root()];
        let mut last = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Parse {
                position: reader.error_position() as usize,
                message: e.to_string(),
            })?;
            let position = reader.buffer_position() as usize;
            let raw = content.get(last..position).unwrap_or_default().to_string();
            last = position;
            let parent = stack.last().copied().unwrap_or_else(|| tree.root());

            match event {
                Event::Start(ref e) => {
                    let (name, attributes) = read_start(e)?;
                    let element = Element::parsed(name, attributes, raw, None);
                    let id = tree.push(NodeKind::Element(element), Some(parent));
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    let (name, attributes) = read_start(e)?;
                    let element = Element::parsed(name, attributes, raw, None);
                    tree.push(NodeKind::Element(element), Some(parent));
                }
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(XmlError::UnexpectedEnd(position));
                    }
                    if let Some(NodeKind::Element(element)) =
                        stack.pop().map(|id| &mut tree.nodes[id.0].kind)
                    {
                        element.set_close(raw);
                    }
                }
                Event::Text(_) => {
                    tree.push(NodeKind::Text(raw), Some(parent));
                }
                Event::Eof => break,
                _ => {
                    tree.push(NodeKind::Other(raw), Some(parent));
                }
            }
        }

        if stack.len() > 1 {
            let name = stack
                .last()
                .and_then(|id| tree.element(*id))
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            return Err(XmlError::UnclosedElement(name));
        }

        Ok(tree)
    }

    /// Serialize the tree back to XML text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_node(*child, &mut out);
        }
        out
    }

    /// Serialize a single subtree
    pub fn node_to_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Document => {
                for child in &node.children {
                    self.write_node(*child, out);
                }
            }
            NodeKind::Element(element) => {
                if element.write_open(out, !node.children.is_empty()) {
                    for child in &node.children {
                        self.write_node(*child, out);
                    }
                    element.write_close(out);
                }
            }
            NodeKind::Text(raw) | NodeKind::Other(raw) => out.push_str(raw),
        }
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// The synthetic document root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Payload of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// The element payload, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Local name of an element node
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    /// Attribute of an element by local name
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute_local(local))
    }

    /// Parent of a node, `None` for the root and detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All descendants of a node in document order, the node itself excluded
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// First child element with the given local name
    pub fn first_child_named(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.local_name(*child) == Some(local))
    }

    /// Unescaped text of a text node
    pub fn text(&self, id: NodeId) -> XmlResult<Cow<'_, str>> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(raw) => Ok(unescape(raw)?),
            _ => Err(XmlError::WrongNodeKind(id.0, "a text node")),
        }
    }

    /// Concatenated unescaped text of every text node under `id`
    pub fn text_content(&self, id: NodeId) -> XmlResult<String> {
        let mut out = String::new();
        if let NodeKind::Text(_) = self.kind(id) {
            out.push_str(&self.text(id)?);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(_) = self.kind(node) {
                out.push_str(&self.text(node)?);
            }
        }
        Ok(out)
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.push(NodeKind::Element(Element::new(name, attributes)), None)
    }

    /// Create a detached text node from unescaped text.
    ///
    /// Characters XML 1.0 does not allow are dropped.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(escape_text(text)), None)
    }

    /// Replace the content of a text node, or of an element with a single text child
    pub fn set_text(&mut self, id: NodeId, text: &str) -> XmlResult<()> {
        if let NodeKind::Text(raw) = &mut self.nodes[id.0].kind {
            *raw = escape_text(text);
            return Ok(());
        }
        if self.element(id).is_none() {
            return Err(XmlError::WrongNodeKind(id.0, "a text node or element"));
        }
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        let text = self.create_text(text);
        self.append_child(id, text);
        Ok(())
    }

    /// Remove a node from its parent; the subtree stays addressable
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `node` as the sibling immediately before `anchor`
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        self.insert_relative(anchor, node, 0);
    }

    /// Insert `node` as the sibling immediately after `anchor`
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        self.insert_relative(anchor, node, 1);
    }

    fn insert_relative(&mut self, anchor: NodeId, node: NodeId, offset: usize) {
        self.detach(node);
        let Some(parent) = self.nodes[anchor.0].parent else {
            return;
        };
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings
            .iter()
            .position(|child| *child == anchor)
            .map_or(siblings.len(), |i| i + offset);
        siblings.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
    }

    /// Copy a node without its children; the copy is detached
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        self.push(kind, None)
    }

    /// Copy a subtree; the copy is detached
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        let copy = self.push(kind, None);
        for child in self.children(id).to_vec() {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }
}

/// Whether XML 1.0 allows `c` in character data
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn escape_text(text: &str) -> String {
    if text.chars().all(is_xml_char) {
        return partial_escape(text).into_owned();
    }
    let allowed: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    partial_escape(allowed.as_str()).into_owned()
}

fn read_start(e: &BytesStart<'_>) -> XmlResult<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Escape(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok((name, attributes))
}

/// Depth-first, document-order iterator over a subtree
#[derive(Clone)]
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
