//! Field token scanner
//!
//! Walks a content tree in document order and yields every MERGEFIELD and
//! DATE field it recognizes, simple or complex. The walk is a forward state
//! machine over the flattened element sequence:
//!
//! - `Outside`: looking for `w:fldSimple` or a `begin` marker
//! - `InInstruction`: collecting `w:instrText` until `separate` or `end`
//! - `InResult`: collecting result runs until `end`
//! - `Skipping`: inside a field that is malformed or holds a nested field
//!
//! Instruction and result text may be split over any number of runs, and the
//! result may cross paragraph boundaries.
//!
//! A `begin` marker whose `end` never arrives is only known to be broken at
//! the end of the content. It is reported as unmatched there, and the walk
//! picks up again right after that marker, so fields following it are still
//! found.

use crate::error::{MalformedField, MalformedKind};
use crate::field::{FieldCode, FieldInstruction, FieldKind, FieldOccurrence, NodeSpan};
use doc_xml::{Descendants, NodeId, WordElement, WordMl, XmlTree, WORDML};

/// Scan a whole tree with the process-wide name table
pub fn scan(tree: &XmlTree) -> FieldScanner<'_> {
    FieldScanner::new(tree, &WORDML)
}

/// A complex field whose end marker has not been seen yet
struct OpenField<'a> {
    begin: NodeId,
    instruction: String,
    separate: Option<NodeId>,
    /// Walk position just after the begin marker
    resume: Descendants<'a>,
}

enum ScanState<'a> {
    Outside,
    InInstruction(OpenField<'a>),
    InResult {
        field: OpenField<'a>,
        result_runs: Vec<NodeId>,
    },
    /// `depth` counts the fields open at this point, `field` included
    Skipping {
        depth: usize,
        field: OpenField<'a>,
        reported: bool,
    },
}

/// Lazy iterator over the fields of a tree.
///
/// Each call to [`scan`] starts a fresh walk; a walk cannot be rewound from
/// outside.
pub struct FieldScanner<'a> {
    tree: &'a XmlTree,
    names: &'a WordMl,
    nodes: Descendants<'a>,
    state: ScanState<'a>,
    /// Separate markers already consumed by an open field
    claimed: Vec<NodeId>,
    finished: bool,
}

impl<'a> FieldScanner<'a> {
    pub fn new(tree: &'a XmlTree, names: &'a WordMl) -> Self {
        Self {
            tree,
            names,
            nodes: tree.descendants(tree.root()),
            state: ScanState::Outside,
            claimed: Vec::new(),
            finished: false,
        }
    }

    fn visit(&mut self, node: NodeId) -> Option<Result<FieldOccurrence, MalformedField>> {
        match self.names.classify(self.tree, node)? {
            WordElement::SimpleField if matches!(self.state, ScanState::Outside) => {
                self.simple_field(node)
            }
            WordElement::FieldChar => self.field_char(node),
            WordElement::InstrText => {
                let ScanState::InInstruction(field) = &mut self.state else {
                    return None;
                };
                match self.tree.text_content(node) {
                    Ok(text) => {
                        field.instruction.push_str(&text);
                        None
                    }
                    Err(err) => {
                        let error = malformed(err.into(), FieldKind::Complex, field.begin, &field.instruction);
                        self.skip_reported(1);
                        Some(Err(error))
                    }
                }
            }
            WordElement::Run => {
                let is_marker = self.is_marker_run(node);
                if let ScanState::InResult { result_runs, .. } = &mut self.state {
                    if !is_marker {
                        result_runs.push(node);
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn is_marker_run(&self, run: NodeId) -> bool {
        self.tree
            .children(run)
            .iter()
            .any(|child| self.names.is(self.tree, *child, WordElement::FieldChar))
    }

    /// Move the open field into `Skipping` after its problem was reported
    fn skip_reported(&mut self, depth: usize) {
        self.state = match std::mem::replace(&mut self.state, ScanState::Outside) {
            ScanState::InInstruction(field) | ScanState::InResult { field, .. } => ScanState::Skipping {
                depth,
                field,
                reported: true,
            },
            other => other,
        };
    }

    fn simple_field(&self, node: NodeId) -> Option<Result<FieldOccurrence, MalformedField>> {
        let instruction = self.tree.attribute(node, "instr").unwrap_or_default();
        match FieldInstruction::parse(instruction) {
            Ok(Some(parsed)) => Some(Ok(FieldOccurrence {
                kind: FieldKind::Simple,
                code: parsed.code,
                name: parsed.name,
                switches: parsed.switches,
                span: NodeSpan::Simple { field: node },
            })),
            Ok(None) => {
                tracing::trace!(instruction, "skipping simple field with unhandled code");
                None
            }
            Err((code, kind)) => Some(Err(MalformedField {
                kind,
                field_kind: FieldKind::Simple,
                code,
                instruction: Some(instruction.to_string()),
                node: Some(node.index()),
            })),
        }
    }

    fn field_char(&mut self, node: NodeId) -> Option<Result<FieldOccurrence, MalformedField>> {
        let marker = self.tree.attribute(node, "fldCharType").unwrap_or_default();
        let run = self
            .names
            .enclosing(self.tree, node, WordElement::Run)
            .unwrap_or(node);
        let state = std::mem::replace(&mut self.state, ScanState::Outside);

        match (state, marker) {
            (ScanState::Outside, "begin") => {
                self.state = ScanState::InInstruction(OpenField {
                    begin: run,
                    instruction: String::new(),
                    separate: None,
                    resume: self.nodes.clone(),
                });
                None
            }
            (ScanState::Outside, "separate") if self.claimed.contains(&run) => None,
            (ScanState::Outside, "separate") => Some(Err(MalformedField::structural(
                MalformedKind::UnexpectedSeparate,
                run,
            ))),
            (ScanState::Outside, "end") => Some(Err(MalformedField::structural(
                MalformedKind::UnexpectedEnd,
                run,
            ))),
            (ScanState::InInstruction(mut field), "separate") => {
                self.claimed.push(run);
                field.separate = Some(run);
                self.state = ScanState::InResult {
                    field,
                    result_runs: Vec::new(),
                };
                None
            }
            (ScanState::InInstruction(field), "end") => self.complete(field, run, Vec::new()),
            (ScanState::InResult { field, result_runs }, "end") => self.complete(field, run, result_runs),
            (ScanState::InInstruction(field) | ScanState::InResult { field, .. }, "begin") => {
                // Nested, or the open field has no end; the end of the content tells which
                self.state = ScanState::Skipping {
                    depth: 2,
                    field,
                    reported: false,
                };
                None
            }
            (ScanState::InResult { field, .. }, "separate") => {
                self.claimed.push(run);
                let error = malformed(
                    MalformedKind::UnexpectedSeparate,
                    FieldKind::Complex,
                    field.begin,
                    &field.instruction,
                );
                self.state = ScanState::Skipping {
                    depth: 1,
                    field,
                    reported: true,
                };
                Some(Err(error))
            }
            (ScanState::Skipping { depth, field, reported }, "begin") => {
                self.state = ScanState::Skipping {
                    depth: depth + 1,
                    field,
                    reported,
                };
                None
            }
            (ScanState::Skipping { depth, field, reported }, "separate") => {
                if depth == 1 {
                    self.claimed.push(run);
                }
                self.state = ScanState::Skipping { depth, field, reported };
                None
            }
            (ScanState::Skipping { depth, field, reported }, "end") => {
                if depth > 1 {
                    self.state = ScanState::Skipping {
                        depth: depth - 1,
                        field,
                        reported,
                    };
                    None
                } else if reported {
                    None
                } else {
                    Some(Err(malformed(
                        MalformedKind::NestedField,
                        FieldKind::Complex,
                        field.begin,
                        &field.instruction,
                    )))
                }
            }
            (state, _) => {
                self.state = state;
                None
            }
        }
    }

    fn complete(
        &self,
        field: OpenField<'a>,
        end: NodeId,
        result_runs: Vec<NodeId>,
    ) -> Option<Result<FieldOccurrence, MalformedField>> {
        let OpenField {
            begin,
            instruction,
            separate,
            ..
        } = field;
        match FieldInstruction::parse(&instruction) {
            Ok(Some(parsed)) => Some(Ok(FieldOccurrence {
                kind: FieldKind::Complex,
                code: parsed.code,
                name: parsed.name,
                switches: parsed.switches,
                span: NodeSpan::Complex {
                    begin,
                    separate,
                    end,
                    result_runs,
                },
            })),
            Ok(None) => {
                tracing::trace!(instruction = instruction.trim(), "skipping field with unhandled code");
                None
            }
            Err((code, kind)) => Some(Err(MalformedField {
                kind,
                field_kind: FieldKind::Complex,
                code,
                instruction: Some(instruction),
                node: Some(begin.index()),
            })),
        }
    }
}

fn malformed(kind: MalformedKind, field_kind: FieldKind, node: NodeId, instruction: &str) -> MalformedField {
    MalformedField {
        kind,
        field_kind,
        code: instruction.split_whitespace().next().and_then(FieldCode::from_word),
        instruction: Some(instruction.to_string()),
        node: Some(node.index()),
    }
}

impl Iterator for FieldScanner<'_> {
    type Item = Result<FieldOccurrence, MalformedField>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            while let Some(node) = self.nodes.next() {
                if let Some(item) = self.visit(node) {
                    return Some(item);
                }
            }

            let (field, reported) = match std::mem::replace(&mut self.state, ScanState::Outside) {
                ScanState::Outside => {
                    self.finished = true;
                    return None;
                }
                ScanState::InInstruction(field) | ScanState::InResult { field, .. } => (field, false),
                ScanState::Skipping { field, reported, .. } => (field, reported),
            };
            tracing::trace!(begin = field.begin.index(), "field has no end marker, resuming after it");
            let error = malformed(
                MalformedKind::UnmatchedBegin,
                FieldKind::Complex,
                field.begin,
                &field.instruction,
            );
            self.nodes = field.resume;
            if !reported {
                return Some(Err(error));
            }
        }
    }
}
