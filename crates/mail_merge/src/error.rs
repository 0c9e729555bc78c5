//! Error and warning types for merge field processing

use crate::field::{FieldCode, FieldKind};
use doc_xml::XmlError;
use serde::Serialize;
use thiserror::Error;

/// What is structurally wrong with a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedKind {
    /// A begin marker whose end marker never arrives
    UnmatchedBegin,
    /// A separate marker outside an open field, or a second one
    UnexpectedSeparate,
    /// An end marker outside an open field
    UnexpectedEnd,
    /// A begin marker inside an open field
    NestedField,
    /// A double quote in the instruction that is never closed
    UnterminatedQuote,
    /// MERGEFIELD with no field name
    MissingFieldName,
    /// Text that could not be decoded
    InvalidText(String),
}

impl std::fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmatchedBegin => write!(f, "field begin marker has no matching end marker"),
            Self::UnexpectedSeparate => write!(f, "unexpected field separate marker"),
            Self::UnexpectedEnd => write!(f, "field end marker without a begin marker"),
            Self::NestedField => write!(f, "nested fields are not supported"),
            Self::UnterminatedQuote => write!(f, "unterminated quote in field instruction"),
            Self::MissingFieldName => write!(f, "MERGEFIELD without a field name"),
            Self::InvalidText(msg) => write!(f, "undecodable text: {}", msg),
        }
    }
}

/// A field whose structure or instruction cannot be parsed.
///
/// Only the affected field is skipped; other fields in the same part are
/// still merged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Malformed {field_kind} field{}: {kind}", quoted_instruction(.instruction))]
pub struct MalformedField {
    pub kind: MalformedKind,
    pub field_kind: FieldKind,
    /// Field code, when the instruction got far enough to tell
    pub code: Option<FieldCode>,
    /// Instruction text collected so far
    pub instruction: Option<String>,
    /// Arena index of the node where the problem was detected
    pub node: Option<usize>,
}

impl MalformedField {
    pub fn structural(kind: MalformedKind, node: doc_xml::NodeId) -> Self {
        Self {
            kind,
            field_kind: FieldKind::Complex,
            code: None,
            instruction: None,
            node: Some(node.index()),
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }
}

fn quoted_instruction(instruction: &Option<String>) -> String {
    instruction
        .as_deref()
        .map(|i| format!(" `{}`", i.trim()))
        .unwrap_or_default()
}

impl From<XmlError> for MalformedKind {
    fn from(err: XmlError) -> Self {
        MalformedKind::InvalidText(err.to_string())
    }
}

/// Advisory conditions collected during a merge; never fatal
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MergeWarning {
    /// The value mapping has no entry for the field
    #[error("No value for merge field `{field}`")]
    MissingFieldValue { field: String },

    /// A switch that is unknown for the field code or lacks its argument
    #[error("Invalid switch `{switch}` on field `{field}`: {reason}")]
    InvalidSwitch {
        field: String,
        switch: String,
        reason: String,
    },
}

/// Errors that abort work on a whole content part
#[derive(Debug, Error)]
pub enum MailMergeError {
    /// The content part is not well-formed XML
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// A field could not be patched
    #[error(transparent)]
    Malformed(#[from] MalformedField),
}

/// Result type for mail merge operations
pub type Result<T> = std::result::Result<T, MailMergeError>;
