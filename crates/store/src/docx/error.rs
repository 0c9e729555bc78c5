//! Error types for DOCX merge operations

use doc_xml::XmlError;
use mail_merge::MalformedField;
use thiserror::Error;

/// Errors that can occur while merging a DOCX package
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error in package metadata
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// A content part is not well-formed XML
    #[error("Content part `{part}` is not well-formed: {source}")]
    ContentPart {
        part: String,
        #[source]
        source: XmlError,
    },

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Invalid content type
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Relationship error
    #[error("Relationship error: {0}")]
    RelationshipError(String),

    /// Fields with broken structure or instruction syntax
    #[error("{} malformed field(s){}", .0.len(), first_malformed(.0))]
    MalformedFields(Vec<MalformedField>),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn first_malformed(fields: &[MalformedField]) -> String {
    fields
        .first()
        .map(|field| format!(", first: {}", field))
        .unwrap_or_default()
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocxError::XmlParse(format!("Attribute error: {}", err))
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
