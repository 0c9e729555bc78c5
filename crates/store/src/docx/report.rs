//! Merge outcome for a whole package

use crate::docx::package::{ContentPart, PartRole};
use mail_merge::{MalformedField, MergeWarning, PassReport};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// At least one field was rewritten and nothing needs attention
    Completed,
    /// The document was produced but warnings or malformed fields were collected
    CompletedWithWarnings,
    /// No field needed a change; the output equals the input
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartSummary {
    pub part: String,
    pub role: PartRole,
    pub merged: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    pub status: MergeStatus,
    /// Parts that were rewritten
    pub parts_merged: Vec<String>,
    pub fields_merged: usize,
    pub warnings: Vec<MergeWarning>,
    pub malformed: Vec<MalformedField>,
    pub parts: Vec<PartSummary>,
    pub summary: String,
}

impl Default for MergeReport {
    fn default() -> Self {
        Self {
            status: MergeStatus::Unchanged,
            parts_merged: Vec::new(),
            fields_merged: 0,
            warnings: Vec::new(),
            malformed: Vec::new(),
            parts: Vec::new(),
            summary: String::new(),
        }
    }
}

impl MergeReport {
    pub fn new() -> Self { Self::default() }

    /// Add the outcome of the merge passes over one part
    pub fn record_part(&mut self, part: &ContentPart, pass: PassReport) {
        if pass.merged > 0 {
            self.parts_merged.push(part.path.clone());
        }
        self.fields_merged += pass.merged;
        self.parts.push(PartSummary {
            part: part.path.clone(),
            role: part.role,
            merged: pass.merged,
            unchanged: pass.unchanged,
        });
        self.warnings.extend(pass.warnings);
        self.malformed.extend(pass.malformed);
    }

    /// Settle status and summary once every part is recorded
    pub fn finish(mut self) -> Self {
        self.status = if !self.warnings.is_empty() || !self.malformed.is_empty() {
            MergeStatus::CompletedWithWarnings
        } else if self.fields_merged == 0 {
            MergeStatus::Unchanged
        } else {
            MergeStatus::Completed
        };
        self.summary = format!(
            "Merged {} field(s) in {} of {} part(s); {} warning(s), {} malformed field(s)",
            self.fields_merged,
            self.parts_merged.len(),
            self.parts.len(),
            self.warnings.len(),
            self.malformed.len()
        );
        self
    }
}
