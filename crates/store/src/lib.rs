//! Store - DOCX package I/O and merge orchestration
//!
//! This crate opens a DOCX package, finds the content parts that can carry
//! merge fields, runs the merge passes over each of them and writes the
//! package back out. Merge options can be persisted as JSON.

mod error;
mod options;
pub mod docx;

pub use error::*;
pub use options::*;

// Re-export DOCX functionality
pub use docx::{
    merge_docx, merge_docx_bytes, DocxError, DocxResult, MergeReport, MergeStatus,
};
