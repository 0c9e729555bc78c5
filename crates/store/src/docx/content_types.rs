//! [Content_Types].xml parsing
//!
//! Used to check that the part a package calls its main document really is
//! WordprocessingML before any field is touched.

use crate::docx::content_type_values;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use quick_xml::events::Event;
use std::collections::HashMap;

/// Represents the content types in a DOCX package
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Default content types by extension (e.g., "xml" -> "application/xml")
    pub defaults: HashMap<String, String>,
    /// Override content types by part name (e.g., "/word/document.xml" -> "...")
    pub overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Parse [Content_Types].xml from its content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::default();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Default") {
                        if let (Some(ext), Some(ct)) = (
                            XmlParser::get_attribute(e, b"Extension"),
                            XmlParser::get_attribute(e, b"ContentType"),
                        ) {
                            result.defaults.insert(ext.to_ascii_lowercase(), ct);
                        }
                    } else if XmlParser::matches_element(name.as_ref(), "Override") {
                        if let (Some(part), Some(ct)) = (
                            XmlParser::get_attribute(e, b"PartName"),
                            XmlParser::get_attribute(e, b"ContentType"),
                        ) {
                            result.overrides.insert(part, ct);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Get the content type for a given path
    pub fn get_content_type(&self, path: &str) -> Option<&String> {
        // First check overrides
        let normalized_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        if let Some(ct) = self.overrides.get(&normalized_path) {
            return Some(ct);
        }

        // Then check defaults by extension
        path.rsplit_once('.')
            .and_then(|(_, ext)| self.defaults.get(&ext.to_ascii_lowercase()))
    }

    /// Ensure `part` is a WordprocessingML main document part
    pub fn check_main_part(&self, part: &str) -> DocxResult<()> {
        match self.get_content_type(part) {
            Some(ct) if content_type_values::MAIN_DOCUMENT_TYPES.contains(&ct.as_str()) => Ok(()),
            Some(ct) => Err(DocxError::InvalidContentType(format!("{} has content type {}", part, ct))),
            None => Err(DocxError::InvalidContentType(format!("{} has no content type", part))),
        }
    }
}
