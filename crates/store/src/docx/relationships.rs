//! Relationships (.rels) file parsing
//!
//! DOCX uses relationships to connect parts of the document together. The
//! merge only reads them, to find the main document part and the header,
//! footer and note parts hanging off it.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use quick_xml::events::Event;
use std::collections::HashMap;

/// A single relationship in a .rels file
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Collection of relationships from a .rels file
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Map of relationship ID to relationship
    relationships: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a .rels file from its XML content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::new();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Relationship") {
                        let id = XmlParser::get_attribute(e, b"Id")
                            .ok_or_else(|| DocxError::RelationshipError("Relationship missing Id".into()))?;
                        let rel_type = XmlParser::get_attribute(e, b"Type")
                            .ok_or_else(|| DocxError::RelationshipError("Relationship missing Type".into()))?;
                        let target = XmlParser::get_attribute(e, b"Target")
                            .ok_or_else(|| DocxError::RelationshipError("Relationship missing Target".into()))?;
                        let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                            .map(|m| if m == "External" { TargetMode::External } else { TargetMode::Internal })
                            .unwrap_or_default();

                        result.relationships.insert(id.clone(), Relationship {
                            id,
                            rel_type,
                            target,
                            target_mode,
                        });
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

    /// Get a relationship by type
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.values().find(|r| r.rel_type == rel_type)
    }

    /// Get all internal relationships of a given type, ordered by ID
    pub fn internal_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        let mut found: Vec<_> = self
            .relationships
            .values()
            .filter(|r| r.rel_type == rel_type && r.target_mode == TargetMode::Internal)
            .collect();
        found.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));
        found
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

/// Path of the .rels part that holds the relationships of `part`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship.
///
/// Targets starting with `/` are package-absolute; others are relative to the
/// directory of the source part. The result has no leading slash, matching
/// ZIP entry names.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = match target.strip_prefix('/') {
        Some(_) => Vec::new(),
        None => source_part
            .rsplit_once('/')
            .map(|(dir, _)| dir.split('/').collect())
            .unwrap_or_default(),
    };

    for segment in target.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
