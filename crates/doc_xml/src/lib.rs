//! Doc XML - mutable trees for WordprocessingML content parts
//!
//! A content part (`word/document.xml`, headers, footers) is parsed into an
//! arena of nodes addressed by [`NodeId`]. The tree can be queried and edited
//! in place and serialized back; nodes that were never edited keep their
//! original markup, so untouched regions round-trip byte-for-byte.
//!
//! # Example
//!
//! ```rust
//! use doc_xml::{XmlTree, WORDML, WordElement};
//!
//! let mut tree = XmlTree::parse("<w:r><w:t>Hello</w:t></w:r>").unwrap();
//! let t = tree
//!     .descendants(tree.root())
//!     .find(|id| WORDML.is(&tree, *id, WordElement::Text))
//!     .unwrap();
//! tree.set_text(t, "Bye").unwrap();
//! assert_eq!(tree.to_xml(), "<w:r><w:t>Bye</w:t></w:r>");
//! ```

mod error;
mod node;
mod tree;
mod wordml;

pub use error::{XmlError, XmlResult};
pub use node::{Element, NodeId, NodeKind};
pub use tree::{is_xml_char, Descendants, XmlTree};
pub use wordml::{WordElement, WordMl, WORDML, W_NAMESPACE};
