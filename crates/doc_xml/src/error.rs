//! Error types for content-part XML handling

use thiserror::Error;

/// Errors raised while parsing or reading an XML content part
#[derive(Debug, Error)]
pub enum XmlError {
    /// The reader rejected the markup
    #[error("XML parsing error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// An element was still open when the input ended
    #[error("Unclosed element: {0}")]
    UnclosedElement(String),

    /// A closing tag with no matching open element
    #[error("Unexpected closing tag at byte {0}")]
    UnexpectedEnd(usize),

    /// Text or attribute value with a broken entity reference
    #[error("Invalid escape sequence: {0}")]
    Escape(String),

    /// Operation applied to a node of the wrong kind
    #[error("Node {0} is not {1}")]
    WrongNodeKind(usize, &'static str),
}

impl From<quick_xml::escape::EscapeError> for XmlError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        XmlError::Escape(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XmlError::Parse {
            position: 0,
            message: format!("Attribute error: {}", err),
        }
    }
}

/// Result type for XML operations
pub type XmlResult<T> = std::result::Result<T, XmlError>;
