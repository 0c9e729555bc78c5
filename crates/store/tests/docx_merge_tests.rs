//! Integration tests for merging DOCX packages
//!
//! Packages are assembled in memory with the parts a word processor writes,
//! merged through the public API and read back entry by entry.

use chrono::NaiveDate;
use mail_merge::FieldValues;
use std::io::{Cursor, Read, Write};
use store::{merge_docx, merge_docx_bytes, DocxError, MergeOptions, MergeStatus};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"/></w:styles>"#;

/// Builder for small DOCX packages
struct PackageBuilder {
    body: String,
    header: Option<String>,
}

impl PackageBuilder {
    fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            header: None,
        }
    }

    fn with_header(mut self, content: &str) -> Self {
        self.header = Some(content.to_string());
        self
    }

    fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, content: &str| {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        add("[Content_Types].xml", CONTENT_TYPES);
        add("_rels/.rels", ROOT_RELS);
        add(
            "word/document.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{}</w:body></w:document>"#,
                self.body
            ),
        );
        add("word/styles.xml", STYLES);
        if let Some(header) = &self.header {
            add("word/_rels/document.xml.rels", DOCUMENT_RELS);
            add(
                "word/header1.xml",
                &format!(r#"<w:hdr xmlns:w="{W_NS}">{}</w:hdr>"#, header),
            );
        }

        zip.finish().unwrap().into_inner()
    }
}

fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(String::from).collect()
}

fn simple_field(instr: &str, placeholder: &str) -> String {
    format!(
        r#"<w:fldSimple w:instr="{instr}"><w:r><w:t>{placeholder}</w:t></w:r></w:fldSimple>"#
    )
}

fn complex_field(instr: &str, result: &str) -> String {
    format!(
        concat!(
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve">{}</w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:t>{}</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
        ),
        instr, result
    )
}

fn letter() -> Vec<u8> {
    let body = format!(
        "<w:p><w:r><w:t xml:space=\"preserve\">Dear </w:t></w:r>{}<w:r><w:t>,</w:t></w:r></w:p><w:p>{}</w:p>",
        simple_field(" MERGEFIELD FirstName ", "«FirstName»"),
        complex_field(" MERGEFIELD City \\* Upper ", "«City»"),
    );
    PackageBuilder::new(&body).build()
}

#[test]
fn test_merge_letter() {
    let values = FieldValues::new()
        .with("FirstName", "Bill")
        .with("City", "Seattle");

    let (output, report) = merge_docx_bytes(&letter(), &values, &MergeOptions::default()).unwrap();

    let document = read_entry(&output, "word/document.xml");
    assert!(document.contains(">Bill</w:t>"));
    assert!(document.contains(">SEATTLE</w:t>"));
    assert!(!document.contains("«FirstName»"));
    assert!(document.contains("MERGEFIELD City"));

    assert_eq!(report.status, MergeStatus::Completed);
    assert_eq!(report.fields_merged, 2);
    assert_eq!(report.parts_merged, vec!["word/document.xml"]);
}

#[test]
fn test_empty_values_return_input_bytes() {
    let input = letter();
    let (output, report) =
        merge_docx_bytes(&input, &FieldValues::new(), &MergeOptions::default()).unwrap();

    assert_eq!(output, input);
    assert_eq!(report.fields_merged, 0);
    // Both fields are reported as missing a value
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn test_second_merge_changes_nothing() {
    let values = FieldValues::new()
        .with("FirstName", "Bill")
        .with("City", "Seattle");
    let options = MergeOptions::default();

    let (first, _) = merge_docx_bytes(&letter(), &values, &options).unwrap();
    let (second, report) = merge_docx_bytes(&first, &values, &options).unwrap();

    assert_eq!(second, first);
    assert_eq!(report.status, MergeStatus::Unchanged);
    assert_eq!(report.fields_merged, 0);
}

#[test]
fn test_untouched_entries_survive() {
    let values = FieldValues::new().with("FirstName", "Bill");
    let input = letter();

    let (output, _) = merge_docx_bytes(&input, &values, &MergeOptions::default()).unwrap();

    assert_eq!(entry_names(&output), entry_names(&input));
    assert_eq!(read_entry(&output, "word/styles.xml"), STYLES);
    assert_eq!(read_entry(&output, "_rels/.rels"), ROOT_RELS);
}

#[test]
fn test_malformed_field_fails_by_default() {
    let body = format!(
        "<w:p>{}</w:p><w:p><w:r><w:fldChar w:fldCharType=\"begin\"/></w:r><w:r><w:instrText> MERGEFIELD Zip </w:instrText></w:r></w:p>",
        simple_field(" MERGEFIELD FirstName ", "«FirstName»"),
    );
    let input = PackageBuilder::new(&body).build();
    let values = FieldValues::new().with("FirstName", "Bill").with("Zip", "98101");

    let err = merge_docx_bytes(&input, &values, &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, DocxError::MalformedFields(ref fields) if fields.len() == 1));

    let options = MergeOptions::default().with_fail_on_malformed(false);
    let (output, report) = merge_docx_bytes(&input, &values, &options).unwrap();
    assert_eq!(report.status, MergeStatus::CompletedWithWarnings);
    assert_eq!(report.malformed.len(), 1);
    assert_eq!(report.fields_merged, 1);
    assert!(read_entry(&output, "word/document.xml").contains(">Bill</w:t>"));
}

#[test]
fn test_header_follows_option() {
    let body = format!("<w:p>{}</w:p>", simple_field(" MERGEFIELD FirstName ", "«FirstName»"));
    let header = format!("<w:p>{}</w:p>", simple_field(" MERGEFIELD Company ", "«Company»"));
    let input = PackageBuilder::new(&body).with_header(&header).build();
    let values = FieldValues::new()
        .with("FirstName", "Bill")
        .with("Company", "Contoso");

    let (output, report) = merge_docx_bytes(&input, &values, &MergeOptions::default()).unwrap();
    assert!(read_entry(&output, "word/header1.xml").contains(">Contoso</w:t>"));
    assert_eq!(report.parts.len(), 2);
    assert_eq!(report.fields_merged, 2);

    let options = MergeOptions::default().with_headers_footers(false);
    let (output, report) = merge_docx_bytes(&input, &values, &options).unwrap();
    assert!(read_entry(&output, "word/header1.xml").contains("«Company»"));
    assert_eq!(report.parts.len(), 1);
}

#[test]
fn test_date_field_uses_options() {
    let body = format!(
        "<w:p>{}</w:p>",
        complex_field(r#" DATE \@ "d MMMM yyyy" "#, "1 January 2000")
    );
    let input = PackageBuilder::new(&body).build();
    let date = NaiveDate::from_ymd_opt(2020, 4, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();

    let options = MergeOptions::default().with_date(date);
    let (output, _) = merge_docx_bytes(&input, &FieldValues::new(), &options).unwrap();
    assert!(read_entry(&output, "word/document.xml").contains(">1 April 2020</w:t>"));

    let options = options.with_date_format("yyyy-MM-dd");
    let (output, _) = merge_docx_bytes(&input, &FieldValues::new(), &options).unwrap();
    assert!(read_entry(&output, "word/document.xml").contains(">2020-04-01</w:t>"));
}

#[test]
fn test_missing_main_part() {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    let input = zip.finish().unwrap().into_inner();

    let err = merge_docx_bytes(&input, &FieldValues::new(), &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, DocxError::MissingPart(ref part) if part == "word/document.xml"));
}

#[test]
fn test_merge_docx_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("letter.docx");
    let output = dir.path().join("out").join("letter-bill.docx");
    std::fs::write(&input, letter()).unwrap();

    let values = FieldValues::new()
        .with("FirstName", "Bill")
        .with("City", "Seattle");
    let report = merge_docx(&input, &output, &values, &MergeOptions::default()).unwrap();

    assert_eq!(report.fields_merged, 2);
    let merged = std::fs::read(&output).unwrap();
    assert!(read_entry(&merged, "word/document.xml").contains(">Bill</w:t>"));
}

#[test]
fn test_merge_docx_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = merge_docx(
        &dir.path().join("nope.docx"),
        &dir.path().join("out.docx"),
        &FieldValues::new(),
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DocxError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}
