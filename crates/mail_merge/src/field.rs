//! Field occurrences and field instruction parsing

use crate::error::MalformedKind;
use doc_xml::NodeId;
use serde::Serialize;
use std::fmt;

/// How a field is expressed in the content part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A `w:fldSimple` element carrying its instruction in `w:instr`
    Simple,
    /// A begin/separate/end `w:fldChar` triad with `w:instrText` runs
    Complex,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Simple => write!(f, "simple"),
            FieldKind::Complex => write!(f, "complex"),
        }
    }
}

/// Field codes the engine resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCode {
    MergeField,
    Date,
}

impl FieldCode {
    /// Recognize a field code word; matching is case-sensitive
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "MERGEFIELD" => Some(FieldCode::MergeField),
            "DATE" => Some(FieldCode::Date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCode::MergeField => "MERGEFIELD",
            FieldCode::Date => "DATE",
        }
    }
}

/// A parsed field instruction such as `MERGEFIELD Name \* MERGEFORMAT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInstruction {
    pub code: FieldCode,
    /// Field name; `DATE` for date fields
    pub name: String,
    /// Switch tokens in instruction order, quotes removed
    pub switches: Vec<String>,
}

impl FieldInstruction {
    /// Parse instruction text.
    ///
    /// Returns `Ok(None)` for field codes the engine does not handle.
    pub fn parse(instruction: &str) -> Result<Option<Self>, (Option<FieldCode>, MalformedKind)> {
        let code = match instruction.split_whitespace().next().and_then(FieldCode::from_word) {
            Some(code) => code,
            None => return Ok(None),
        };
        let tokens = tokenize(instruction).map_err(|kind| (Some(code), kind))?;
        let mut rest = tokens.into_iter().skip(1);

        let name = match code {
            FieldCode::MergeField => match rest.next() {
                Some(name) if !name.is_empty() && !name.starts_with('\\') => name,
                _ => return Err((Some(code), MalformedKind::MissingFieldName)),
            },
            FieldCode::Date => code.as_str().to_string(),
        };

        Ok(Some(Self {
            code,
            name,
            switches: rest.collect(),
        }))
    }
}

/// Split an instruction into tokens.
///
/// Whitespace separates tokens; a double-quoted token keeps its spaces and
/// `\"` inside quotes is a literal quote.
pub fn tokenize(instruction: &str) -> Result<Vec<String>, MalformedKind> {
    let mut tokens = Vec::new();
    let mut chars = instruction.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if ch == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' if chars.peek() == Some(&'"') => {
                        token.push('"');
                        chars.next();
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err(MalformedKind::UnterminatedQuote);
            }
        } else {
            // a quote ends an unquoted token, so `\@"d MMM"` splits in two
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Nodes a field occupies in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpan {
    /// The `w:fldSimple` element
    Simple { field: NodeId },
    /// Marker runs of a complex field plus the runs of its cached result
    Complex {
        begin: NodeId,
        separate: Option<NodeId>,
        end: NodeId,
        result_runs: Vec<NodeId>,
    },
}

/// One recognized field in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOccurrence {
    pub kind: FieldKind,
    pub code: FieldCode,
    pub name: String,
    pub switches: Vec<String>,
    pub span: NodeSpan,
}

impl FieldOccurrence {
    pub fn is_date(&self) -> bool {
        self.code == FieldCode::Date
    }
}
