//! DOCX Merge Module
//!
//! This module reads a Microsoft Word DOCX package, merges field values into
//! its content parts and writes the package back out.
//!
//! ## Structure
//!
//! A DOCX file is a ZIP archive containing XML files:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships, naming the main document part
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships
//! - `word/header*.xml`, `word/footer*.xml` - Headers and footers
//! - `word/footnotes.xml`, `word/endnotes.xml` - Notes content
//!
//! Only the content parts that actually change are rewritten; every other
//! entry is copied through byte for byte.

mod api;
mod content_types;
mod error;
mod package;
mod reader;
mod relationships;
mod report;
mod writer;

pub use api::{merge_docx, merge_docx_bytes, merge_part_xml};
pub use content_types::ContentTypes;
pub use error::{DocxError, DocxResult};
pub use package::{locate_parts, ContentPart, PartRole, DEFAULT_MAIN_PART};
pub use reader::{DocxReader, XmlParser};
pub use relationships::{rels_path_for, resolve_target, Relationship, Relationships, TargetMode};
pub use report::{MergeReport, MergeStatus, PartSummary};
pub use writer::PackageWriter;

/// Relationship types for DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const FOOTNOTES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const ENDNOTES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
}

/// Content types for DOCX parts
pub mod content_type_values {
    pub const DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const TEMPLATE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    pub const MACRO_DOCUMENT: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const MACRO_TEMPLATE: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

    /// Content types a main document part may carry
    pub const MAIN_DOCUMENT_TYPES: [&str; 4] = [DOCUMENT, TEMPLATE, MACRO_DOCUMENT, MACRO_TEMPLATE];
}
