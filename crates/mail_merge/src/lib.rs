//! Mail Merge Field Engine
//!
//! This crate finds MERGEFIELD and DATE fields in a WordprocessingML content
//! tree and replaces their cached results with caller-supplied values.
//!
//! # Features
//!
//! - Simple (`w:fldSimple`) and complex (begin/separate/end) fields, with
//!   instruction and result text split over any number of runs
//! - `\* MERGEFORMAT` keeps per-run formatting through a pluggable
//!   [`FormattingStrategy`]
//! - Text-case, `\b`/`\f` and date-picture switches
//! - DATE fields from an explicit `DATE` value or a date context, rendered
//!   with locale-aware month and day names
//! - Missing values and bad switches are warnings; broken field structure is
//!   reported per field and never blocks the rest of the document
//!
//! # Example
//!
//! ```rust
//! use doc_xml::XmlTree;
//! use mail_merge::{merge_fields, DateContext, FieldValues};
//!
//! let xml = r#"<w:p><w:fldSimple w:instr=" MERGEFIELD FirstName "><w:r><w:t>«FirstName»</w:t></w:r></w:fldSimple></w:p>"#;
//! let mut tree = XmlTree::parse(xml).unwrap();
//!
//! let values = FieldValues::new().with("FirstName", "Bill");
//! let report = merge_fields(&mut tree, &values, &DateContext::default());
//!
//! assert_eq!(report.merged, 1);
//! assert!(tree.to_xml().contains(">Bill</w:t>"));
//! ```

mod date;
mod error;
mod field;
mod formatting;
mod passes;
mod patcher;
mod resolver;
mod scanner;
mod switches;
mod values;

#[cfg(test)]
mod test_support;

pub use date::{format_date, parse_date_value, parse_locale, picture_to_strftime, DateContext, LONG_DATE_PICTURE};
pub use error::{MailMergeError, MalformedField, MalformedKind, MergeWarning, Result};
pub use field::{tokenize, FieldCode, FieldInstruction, FieldKind, FieldOccurrence, NodeSpan};
pub use formatting::{FirstRunFormatting, FormattingStrategy, ProportionalFormatting, RunSlice};
pub use passes::{
    merge_fields, run_complex_field_pass, run_date_pass, run_simple_field_pass, FieldMerger, Pass,
    PassReport,
};
pub use patcher::{apply, Patcher};
pub use resolver::{resolve, Replacement, Unresolved};
pub use scanner::{scan, FieldScanner};
pub use switches::{GeneralFormat, InvalidSwitch, Switch, SwitchSet};
pub use values::{FieldValues, DATE_KEY};

/// Re-exported so callers can name locales without depending on chrono directly
pub use chrono::Locale;
