//! Merge passes over one content tree
//!
//! Passes run in a fixed order on the same tree: simple MERGEFIELDs, complex
//! MERGEFIELDs, then DATE fields in either form. Each pass scans the whole
//! tree before patching anything, so every node id it holds is still valid
//! when its turn comes.

use crate::date::DateContext;
use crate::error::{MailMergeError, MalformedField, MergeWarning};
use crate::field::{FieldCode, FieldKind, FieldOccurrence};
use crate::patcher::Patcher;
use crate::resolver::resolve;
use crate::scanner::FieldScanner;
use crate::values::FieldValues;
use doc_xml::{WordMl, XmlTree, WORDML};
use serde::Serialize;

/// One of the three merge passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    SimpleFields,
    ComplexFields,
    Dates,
}

impl Pass {
    pub const ORDER: [Pass; 3] = [Pass::SimpleFields, Pass::ComplexFields, Pass::Dates];

    fn accepts(&self, occurrence: &FieldOccurrence) -> bool {
        match self {
            Pass::SimpleFields => !occurrence.is_date() && occurrence.kind == FieldKind::Simple,
            Pass::ComplexFields => !occurrence.is_date() && occurrence.kind == FieldKind::Complex,
            Pass::Dates => occurrence.is_date(),
        }
    }

    /// Which pass owns a malformed field, so each is reported once.
    /// Structural problems with no known code belong to the complex pass.
    fn reports(&self, malformed: &MalformedField) -> bool {
        match (self, malformed.code, malformed.field_kind) {
            (Pass::Dates, code, _) => code == Some(FieldCode::Date),
            (_, Some(FieldCode::Date), _) => false,
            (Pass::SimpleFields, _, kind) => kind == FieldKind::Simple,
            (Pass::ComplexFields, _, kind) => kind == FieldKind::Complex,
        }
    }
}

/// Outcome of one or more passes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    /// Fields whose result was rewritten
    pub merged: usize,
    /// Fields that already showed their value
    pub unchanged: usize,
    pub warnings: Vec<MergeWarning>,
    pub malformed: Vec<MalformedField>,
}

impl PassReport {
    pub fn absorb(&mut self, other: PassReport) {
        self.merged += other.merged;
        self.unchanged += other.unchanged;
        self.warnings.extend(other.warnings);
        self.malformed.extend(other.malformed);
    }
}

/// Runs merge passes with one set of values and one date context
#[derive(Debug, Clone)]
pub struct FieldMerger<'a> {
    values: &'a FieldValues,
    date: DateContext<'a>,
    names: &'a WordMl,
}

impl<'a> FieldMerger<'a> {
    pub fn new(values: &'a FieldValues) -> Self {
        Self {
            values,
            date: DateContext::default(),
            names: &WORDML,
        }
    }

    pub fn with_date(mut self, date: DateContext<'a>) -> Self {
        self.date = date;
        self
    }

    /// Run all passes in order
    pub fn run_all(&self, tree: &mut XmlTree) -> PassReport {
        let mut report = PassReport::default();
        for pass in Pass::ORDER {
            report.absorb(self.run(tree, pass));
        }
        report
    }

    pub fn run(&self, tree: &mut XmlTree, pass: Pass) -> PassReport {
        let mut report = PassReport::default();
        let mut occurrences = Vec::new();

        for item in FieldScanner::new(tree, self.names) {
            match item {
                Ok(occurrence) if pass.accepts(&occurrence) => occurrences.push(occurrence),
                Ok(_) => {}
                Err(malformed) if pass.reports(&malformed) => {
                    tracing::debug!(?pass, error = %malformed, "malformed field");
                    report.malformed.push(malformed);
                }
                Err(_) => {}
            }
        }

        let patcher = Patcher::new(self.names);
        for occurrence in &occurrences {
            let replacement = match resolve(occurrence, self.values, &self.date) {
                Ok(replacement) => replacement,
                Err(unresolved) => {
                    if let Some(warning) = unresolved.into_warning() {
                        tracing::debug!(field = %occurrence.name, %warning, "field left unresolved");
                        report.warnings.push(warning);
                    }
                    continue;
                }
            };

            match patcher.apply(tree, occurrence, &replacement) {
                Ok(true) => {
                    tracing::debug!(field = %occurrence.name, kind = %occurrence.kind, "field merged");
                    report.merged += 1;
                }
                Ok(false) => report.unchanged += 1,
                Err(err) => report.malformed.push(patch_failure(occurrence, err)),
            }
        }

        tracing::debug!(
            ?pass,
            fields = occurrences.len(),
            merged = report.merged,
            warnings = report.warnings.len(),
            malformed = report.malformed.len(),
            "pass complete"
        );
        report
    }
}

fn patch_failure(occurrence: &FieldOccurrence, err: MailMergeError) -> MalformedField {
    match err {
        MailMergeError::Malformed(malformed) => malformed,
        MailMergeError::Xml(err) => MalformedField {
            kind: err.into(),
            field_kind: occurrence.kind,
            code: Some(occurrence.code),
            instruction: None,
            node: None,
        },
    }
}

/// Merge `w:fldSimple` MERGEFIELDs.
///
/// A `\@` picture on a MERGEFIELD is rendered with the default date
/// context, so month and day names are English. Use [`FieldMerger::with_date`]
/// to render them in another locale.
pub fn run_simple_field_pass(tree: &mut XmlTree, values: &FieldValues) -> PassReport {
    FieldMerger::new(values).run(tree, Pass::SimpleFields)
}

/// Merge begin/separate/end MERGEFIELDs.
///
/// Like [`run_simple_field_pass`], `\@` pictures use the default date
/// context and its English names.
pub fn run_complex_field_pass(tree: &mut XmlTree, values: &FieldValues) -> PassReport {
    FieldMerger::new(values).run(tree, Pass::ComplexFields)
}

/// Merge DATE fields, simple or complex
pub fn run_date_pass(tree: &mut XmlTree, values: &FieldValues, date: &DateContext<'_>) -> PassReport {
    FieldMerger::new(values).with_date(*date).run(tree, Pass::Dates)
}

/// Run all three passes in order
pub fn merge_fields(tree: &mut XmlTree, values: &FieldValues, date: &DateContext<'_>) -> PassReport {
    FieldMerger::new(values).with_date(*date).run_all(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedKind;
    use crate::test_support::{body, complex_field, run, simple_field};
    use chrono::NaiveDate;

    fn date_context() -> DateContext<'static> {
        DateContext::at(
            NaiveDate::from_ymd_opt(2020, 4, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn letter() -> String {
        body(&format!(
            "<w:p>{}</w:p><w:p>{}{}</w:p><w:p>{}{}</w:p>",
            simple_field(" MERGEFIELD FirstName ", &run("", "«FirstName»")),
            complex_field(
                " MERGEFIELD LastName \\* MERGEFORMAT ",
                &format!("{}{}", run("<w:b/>", "«Last"), run("", "Name»"))
            ),
            complex_field(" PAGE ", &run("", "1")),
            complex_field(" DATE \\@ \"d MMMM yyyy\" ", &run("", "31 December 1999")),
            simple_field(" DATE ", &run("", "1/1/2000")),
        ))
    }

    #[test]
    fn test_passes_split_work_by_kind() {
        let values = FieldValues::new()
            .with("FirstName", "Bill")
            .with("LastName", "Gates");
        let mut tree = XmlTree::parse(&letter()).unwrap();

        let simple = run_simple_field_pass(&mut tree, &values);
        assert_eq!(simple.merged, 1);
        let complex = run_complex_field_pass(&mut tree, &values);
        assert_eq!(complex.merged, 1);
        let dates = run_date_pass(&mut tree, &values, &date_context());
        assert_eq!(dates.merged, 2);

        let out = tree.to_xml();
        assert!(out.contains(">Bill<"));
        assert!(out.contains(
            "<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Gat</w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\">es</w:t></w:r>"
        ));
        assert!(out.contains(">1 April 2020<"));
        assert!(!out.contains("December"));
        assert!(out.contains("<w:instrText xml:space=\"preserve\"> PAGE </w:instrText>"));
    }

    #[test]
    fn test_missing_values_are_warnings() {
        let mut tree = XmlTree::parse(&letter()).unwrap();
        let report = merge_fields(&mut tree, &FieldValues::new(), &DateContext::default());
        assert_eq!(report.merged, 0);
        assert_eq!(
            report.warnings,
            vec![
                MergeWarning::MissingFieldValue {
                    field: "FirstName".to_string()
                },
                MergeWarning::MissingFieldValue {
                    field: "LastName".to_string()
                },
            ]
        );
        assert!(report.malformed.is_empty());
    }

    #[test]
    fn test_empty_values_without_date_leave_document_identical() {
        let xml = letter();
        let mut tree = XmlTree::parse(&xml).unwrap();
        merge_fields(&mut tree, &FieldValues::new(), &DateContext::default());
        assert_eq!(tree.to_xml(), xml);
    }

    #[test]
    fn test_second_merge_changes_nothing() {
        let values = FieldValues::new()
            .with("FirstName", "Bill")
            .with("LastName", "Gates");
        let mut tree = XmlTree::parse(&letter()).unwrap();
        let first = merge_fields(&mut tree, &values, &date_context());
        assert_eq!(first.merged, 4);
        let once = tree.to_xml();

        let second = merge_fields(&mut tree, &values, &date_context());
        assert_eq!(second.merged, 0);
        assert_eq!(second.unchanged, 4);
        assert_eq!(tree.to_xml(), once);
    }

    #[test]
    fn test_date_override_from_values() {
        let values = FieldValues::new().with("DATE", "1 April 2020");
        let xml = body(&format!(
            "<w:p>{}</w:p>",
            complex_field(" DATE \\@ \"yyyy\" ", &run("", "1999"))
        ));
        let mut tree = XmlTree::parse(&xml).unwrap();
        let other_day = DateContext::at(
            NaiveDate::from_ymd_opt(2001, 2, 3)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        let report = merge_fields(&mut tree, &values, &other_day);
        assert_eq!(report.merged, 1);
        assert!(tree.to_xml().contains(">1 April 2020<"));
    }

    #[test]
    fn test_malformed_field_does_not_block_earlier_field() {
        let xml = body(&format!(
            "<w:p>{}</w:p><w:p>\
             <w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>\
             <w:r><w:instrText> MERGEFIELD Broken </w:instrText></w:r>\
             <w:r><w:fldChar w:fldCharType=\"separate\"/></w:r>\
             <w:r><w:t>«Broken»</w:t></w:r></w:p>",
            complex_field(" MERGEFIELD Good ", &run("", "«Good»")),
        ));
        let values = FieldValues::new().with("Good", "fine").with("Broken", "nope");
        let mut tree = XmlTree::parse(&xml).unwrap();
        let report = merge_fields(&mut tree, &values, &DateContext::default());

        assert_eq!(report.merged, 1);
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.malformed[0].kind, MalformedKind::UnmatchedBegin);
        let out = tree.to_xml();
        assert!(out.contains(">fine<"));
        assert!(out.contains("<w:t>«Broken»</w:t>"));
    }

    #[test]
    fn test_missing_end_does_not_block_later_fields() {
        let xml = body(&format!(
            "<w:p>{}</w:p><w:p>\
             <w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>\
             <w:r><w:instrText> MERGEFIELD Broken </w:instrText></w:r>\
             </w:p><w:p>{}{}</w:p>",
            complex_field(" MERGEFIELD A ", &run("", "«A»")),
            complex_field(" MERGEFIELD B ", &run("", "«B»")),
            simple_field(" MERGEFIELD C ", &run("", "«C»")),
        ));
        let values = FieldValues::new()
            .with("A", "alpha")
            .with("Broken", "nope")
            .with("B", "beta")
            .with("C", "gamma");
        let mut tree = XmlTree::parse(&xml).unwrap();
        let report = merge_fields(&mut tree, &values, &DateContext::default());

        assert_eq!(report.merged, 3);
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.malformed[0].kind, MalformedKind::UnmatchedBegin);
        let out = tree.to_xml();
        for shown in [">alpha<", ">beta<", ">gamma<"] {
            assert!(out.contains(shown), "{} missing", shown);
        }
        assert!(!out.contains("nope"));
    }

    #[test]
    fn test_merge_field_picture_locale() {
        let xml = body(&format!(
            "<w:p>{}</w:p>",
            simple_field(" MERGEFIELD Due \\@ \"MMMM\" ", &run("", "«Due»"))
        ));
        let values = FieldValues::new().with("Due", "2020-04-01");

        let mut tree = XmlTree::parse(&xml).unwrap();
        assert_eq!(run_simple_field_pass(&mut tree, &values).merged, 1);
        assert!(tree.to_xml().contains(">April<"));

        let mut tree = XmlTree::parse(&xml).unwrap();
        let french = date_context().with_locale(chrono::Locale::fr_FR);
        FieldMerger::new(&values)
            .with_date(french)
            .run(&mut tree, Pass::SimpleFields);
        assert!(tree.to_xml().contains(">avril<"));
    }

    #[test]
    fn test_malformed_reported_once_across_passes() {
        let xml = body(&format!(
            "<w:p>{}{}</w:p>",
            simple_field(" MERGEFIELD \"Unclosed ", ""),
            simple_field(" DATE \\@ \"d MMM ", ""),
        ));
        let mut tree = XmlTree::parse(&xml).unwrap();
        let report = merge_fields(&mut tree, &FieldValues::new(), &date_context());
        assert_eq!(report.malformed.len(), 2);
        assert!(report
            .malformed
            .iter()
            .all(|m| m.kind == MalformedKind::UnterminatedQuote));
    }

    #[test]
    fn test_fields_do_not_disturb_each_other() {
        let xml = body(&format!(
            "<w:p>{}{}</w:p>",
            complex_field(" MERGEFIELD A ", &run("<w:i/>", "«A»")),
            complex_field(" MERGEFIELD B ", &run("<w:u w:val=\"single\"/>", "«B»")),
        ));
        let mut tree = XmlTree::parse(&xml).unwrap();
        run_complex_field_pass(&mut tree, &FieldValues::new().with("A", "a much longer value"));
        let out = tree.to_xml();
        assert!(out.contains(&complex_field(
            " MERGEFIELD B ",
            &run("<w:u w:val=\"single\"/>", "«B»")
        )));
    }
}
