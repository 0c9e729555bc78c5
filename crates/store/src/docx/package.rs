//! Locating the content parts of a package that can carry merge fields

use crate::docx::content_types::ContentTypes;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::DocxReader;
use crate::docx::relationship_types;
use crate::docx::relationships::{rels_path_for, resolve_target, Relationships};
use serde::Serialize;
use std::io::{Read, Seek};

/// Fallback location of the main document part
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// What a content part is to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    MainDocument,
    Header,
    Footer,
    Footnotes,
    Endnotes,
}

/// A content part to merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentPart {
    /// ZIP entry name
    pub path: String,
    pub role: PartRole,
}

const SECONDARY_PARTS: [(&str, PartRole); 4] = [
    (relationship_types::HEADER, PartRole::Header),
    (relationship_types::FOOTER, PartRole::Footer),
    (relationship_types::FOOTNOTES, PartRole::Footnotes),
    (relationship_types::ENDNOTES, PartRole::Endnotes),
];

/// Find the main document part and, if asked, the header, footer and note
/// parts it references. The main part always comes first.
pub fn locate_parts<R: Read + Seek>(
    reader: &mut DocxReader<R>,
    include_secondary: bool,
) -> DocxResult<Vec<ContentPart>> {
    if !reader.file_exists("[Content_Types].xml") {
        return Err(DocxError::MissingPart("[Content_Types].xml".to_string()));
    }
    let content_types = ContentTypes::parse(&reader.read_file_as_string("[Content_Types].xml")?)?;

    let main = main_part_path(reader)?;
    if !reader.file_exists(&main) {
        return Err(DocxError::MissingPart(main));
    }
    content_types.check_main_part(&main)?;

    let mut parts = vec![ContentPart {
        path: main.clone(),
        role: PartRole::MainDocument,
    }];
    if !include_secondary {
        return Ok(parts);
    }

    let rels_path = rels_path_for(&main);
    if !reader.file_exists(&rels_path) {
        return Ok(parts);
    }
    let rels = Relationships::parse(&reader.read_file_as_string(&rels_path)?)?;

    for (rel_type, role) in SECONDARY_PARTS {
        for rel in rels.internal_by_type(rel_type) {
            let path = resolve_target(&main, &rel.target);
            if !reader.file_exists(&path) {
                tracing::warn!(part = %path, id = %rel.id, "related part is missing from the package");
                continue;
            }
            if parts.iter().all(|p| p.path != path) {
                parts.push(ContentPart { path, role });
            }
        }
    }

    Ok(parts)
}

fn main_part_path<R: Read + Seek>(reader: &mut DocxReader<R>) -> DocxResult<String> {
    if !reader.file_exists("_rels/.rels") {
        tracing::debug!("package has no root relationships, using {}", DEFAULT_MAIN_PART);
        return Ok(DEFAULT_MAIN_PART.to_string());
    }
    let rels = Relationships::parse(&reader.read_file_as_string("_rels/.rels")?)?;
    let path = rels
        .get_by_type(relationship_types::DOCUMENT)
        .map(|rel| resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
    Ok(path)
}
