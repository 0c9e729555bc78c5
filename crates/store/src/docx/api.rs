//! Public API for DOCX merging
//!
//! This module provides the main entry points for merging field values into
//! DOCX files.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::locate_parts;
use crate::docx::reader::DocxReader;
use crate::docx::report::MergeReport;
use crate::docx::writer::PackageWriter;
use crate::options::MergeOptions;
use doc_xml::XmlTree;
use mail_merge::{DateContext, FieldMerger, FieldValues, PassReport};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Merge field values into a DOCX file on disk
///
/// # Arguments
///
/// * `input` - Path to the source DOCX file
/// * `output` - Path where the merged DOCX file will be saved
/// * `values` - Field name to value mapping
/// * `options` - Date, locale and part selection
///
/// # Returns
///
/// * `Ok(MergeReport)` - What was merged, with all collected warnings
/// * `Err(DocxError)` - If the package cannot be read or written, or a field
///   is malformed while `fail_on_malformed` is set
///
/// # Example
///
/// ```ignore
/// use mail_merge::FieldValues;
/// use store::{merge_docx, MergeOptions};
/// use std::path::Path;
///
/// let values = FieldValues::new().with("FirstName", "Bill");
/// let report = merge_docx(
///     Path::new("letter.docx"),
///     Path::new("letter-bill.docx"),
///     &values,
///     &MergeOptions::default(),
/// )?;
/// ```
pub fn merge_docx(
    input: &Path,
    output: &Path,
    values: &FieldValues,
    options: &MergeOptions,
) -> DocxResult<MergeReport> {
    let bytes = std::fs::read(input).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocxError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", input.display()),
            ))
        } else {
            DocxError::Io(e)
        }
    })?;

    let (merged, report) = merge_docx_bytes(&bytes, values, options)?;

    // Create parent directories if they don't exist
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, merged)?;

    Ok(report)
}

/// Merge field values into DOCX bytes
///
/// Entries that need no change are copied without recompression. When no
/// part changes at all, the input bytes are returned as they are.
pub fn merge_docx_bytes(
    bytes: &[u8],
    values: &FieldValues,
    options: &MergeOptions,
) -> DocxResult<(Vec<u8>, MergeReport)> {
    let mut reader = DocxReader::new(Cursor::new(bytes))?;
    let parts = locate_parts(&mut reader, options.include_headers_footers)?;
    let date = options.date_context();

    let mut report = MergeReport::new();
    let mut rewritten = HashMap::new();

    for part in &parts {
        let xml = reader.read_file_as_string(&part.path)?;
        let (merged, pass) = merge_part_xml(&part.path, &xml, values, &date)?;
        tracing::info!(
            part = %part.path,
            merged = pass.merged,
            warnings = pass.warnings.len(),
            malformed = pass.malformed.len(),
            "Merged content part"
        );
        if let Some(merged) = merged {
            rewritten.insert(part.path.clone(), merged);
        }
        report.record_part(part, pass);
    }

    if options.fail_on_malformed && !report.malformed.is_empty() {
        return Err(DocxError::MalformedFields(report.malformed));
    }
    let report = report.finish();
    tracing::info!("{}", report.summary);

    if rewritten.is_empty() {
        return Ok((bytes.to_vec(), report));
    }

    let mut writer = PackageWriter::new(Cursor::new(Vec::new()));
    for index in 0..reader.len() {
        let name = reader.entry_name(index)?;
        match rewritten.get(&name) {
            Some(xml) => writer.write_file(&name, xml)?,
            None => reader.copy_raw_to(index, &mut writer)?,
        }
    }
    let output = writer.finish()?.into_inner();

    Ok((output, report))
}

/// Run every merge pass over the XML of one content part
///
/// Returns the new XML, or `None` when no field changed.
pub fn merge_part_xml(
    part: &str,
    xml: &str,
    values: &FieldValues,
    date: &DateContext<'_>,
) -> DocxResult<(Option<String>, PassReport)> {
    let mut tree = XmlTree::parse(xml).map_err(|source| DocxError::ContentPart {
        part: part.to_string(),
        source,
    })?;

    let pass = FieldMerger::new(values).with_date(*date).run_all(&mut tree);
    let merged = (pass.merged > 0).then(|| tree.to_xml());
    Ok((merged, pass))
}
