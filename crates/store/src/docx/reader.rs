//! ZIP archive reading and XML parsing utilities

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::writer::PackageWriter;
use quick_xml::events::BytesStart;
use quick_xml::Reader;
use std::io::{Read, Seek, Write};
use zip::ZipArchive;

/// A wrapper around a ZIP archive for reading DOCX files
pub struct DocxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> DocxReader<R> {
    /// Create a new DOCX reader from a source that implements Read + Seek
    pub fn new(reader: R) -> DocxResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read a file from the archive as a string
    pub fn read_file_as_string(&mut self, path: &str) -> DocxResult<String> {
        let bytes = self.read_file_as_bytes(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a file from the archive as bytes
    pub fn read_file_as_bytes(&mut self, path: &str) -> DocxResult<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| {
            if matches!(e, zip::result::ZipError::FileNotFound) {
                DocxError::MissingPart(path.to_string())
            } else {
                DocxError::from(e)
            }
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Check if a file exists in the archive
    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Name of the entry at `index`, in archive order
    pub fn entry_name(&mut self, index: usize) -> DocxResult<String> {
        let entry = self.archive.by_index_raw(index)?;
        Ok(entry.name().to_string())
    }

    /// Copy an entry into `writer` without decompressing it
    pub fn copy_raw_to<W: Write + Seek>(
        &mut self,
        index: usize,
        writer: &mut PackageWriter<W>,
    ) -> DocxResult<()> {
        let entry = self.archive.by_index_raw(index)?;
        writer.zip_mut().raw_copy_file(entry)?;
        Ok(())
    }
}

/// XML reader utilities for package metadata (`.rels`, content types)
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader from a string
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Get an attribute value from an event
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected || name_str.ends_with(&format!(":{}", expected))
    }
}
