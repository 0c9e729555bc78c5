//! Document patcher
//!
//! Writes resolved text into the result region of a field. Instruction
//! markup is never touched, so the host application can still update the
//! field later. Node ids of other fields stay valid across a patch because
//! the arena only ever grows.

use crate::error::Result;
use crate::field::{FieldOccurrence, NodeSpan};
use crate::formatting::{FirstRunFormatting, FormattingStrategy, ProportionalFormatting};
use crate::resolver::Replacement;
use doc_xml::{is_xml_char, NodeId, WordElement, WordMl, XmlResult, XmlTree, WORDML};
use std::borrow::Cow;

/// Patch one field with the process-wide name table.
///
/// Returns `false` when the field already shows the replacement text; the
/// tree is then left exactly as it was.
pub fn apply(tree: &mut XmlTree, occurrence: &FieldOccurrence, replacement: &Replacement) -> Result<bool> {
    Patcher::new(&WORDML).apply(tree, occurrence, replacement)
}

/// Rewrites field results in a content tree
#[derive(Debug, Clone, Copy)]
pub struct Patcher<'a> {
    names: &'a WordMl,
}

impl<'a> Patcher<'a> {
    pub fn new(names: &'a WordMl) -> Self {
        Self { names }
    }

    pub fn apply(
        &self,
        tree: &mut XmlTree,
        occurrence: &FieldOccurrence,
        replacement: &Replacement,
    ) -> Result<bool> {
        let strategy: &dyn FormattingStrategy = if replacement.preserve_formatting {
            &ProportionalFormatting
        } else {
            &FirstRunFormatting
        };

        let text = display_text(&replacement.text);
        match &occurrence.span {
            NodeSpan::Simple { field } => self.patch_simple(tree, *field, &text, strategy),
            NodeSpan::Complex {
                separate,
                end,
                result_runs,
                ..
            } => self.patch_complex(tree, *separate, *end, result_runs, &text, strategy),
        }
    }

    fn patch_simple(
        &self,
        tree: &mut XmlTree,
        field: NodeId,
        text: &str,
        strategy: &dyn FormattingStrategy,
    ) -> Result<bool> {
        let runs = self.result_runs(tree, field);
        if self.runs_text(tree, &runs)? == text {
            return Ok(false);
        }

        let new_runs = self.build_runs(tree, &runs, field, text, strategy)?;
        match runs.first() {
            Some(first) => {
                for run in &new_runs {
                    tree.insert_before(*first, *run);
                }
            }
            None => {
                for run in &new_runs {
                    tree.append_child(field, *run);
                }
            }
        }
        for run in runs {
            tree.detach(run);
        }
        Ok(true)
    }

    fn patch_complex(
        &self,
        tree: &mut XmlTree,
        separate: Option<NodeId>,
        end: NodeId,
        result_runs: &[NodeId],
        text: &str,
        strategy: &dyn FormattingStrategy,
    ) -> Result<bool> {
        if self.runs_text(tree, result_runs)? == text {
            return Ok(false);
        }

        let anchor = match separate {
            Some(separate) => separate,
            None => self.insert_separate(tree, end),
        };
        let new_runs = self.build_runs(tree, result_runs, anchor, text, strategy)?;

        let mut previous = anchor;
        for run in new_runs {
            tree.insert_after(previous, run);
            previous = run;
        }
        for run in result_runs {
            tree.detach(*run);
        }
        Ok(true)
    }

    /// Add the separate marker run a field without a result region lacks
    fn insert_separate(&self, tree: &mut XmlTree, end: NodeId) -> NodeId {
        let run_name = self.names.qualified(tree, end, WordElement::Run);
        let marker_name = self.names.qualified(tree, end, WordElement::FieldChar);
        let type_name = prefixed(tree, end, "fldCharType");

        let run = tree.create_element(&run_name, &[]);
        let marker = tree.create_element(&marker_name, &[(type_name.as_str(), "separate")]);
        tree.append_child(run, marker);
        tree.insert_before(end, run);
        run
    }

    fn build_runs(
        &self,
        tree: &mut XmlTree,
        originals: &[NodeId],
        like: NodeId,
        text: &str,
        strategy: &dyn FormattingStrategy,
    ) -> Result<Vec<NodeId>> {
        let lengths = self.run_lengths(tree, originals)?;

        let mut runs = Vec::new();
        for slice in strategy.distribute(&lengths, text) {
            let run = match originals.get(slice.source) {
                Some(template) => self.blank_run_like(tree, *template),
                None => {
                    let name = self.names.qualified(tree, like, WordElement::Run);
                    tree.create_element(&name, &[])
                }
            };
            self.append_text(tree, run, &slice.text);
            runs.push(run);
        }
        Ok(runs)
    }

    /// A copy of `template` holding only its run properties
    fn blank_run_like(&self, tree: &mut XmlTree, template: NodeId) -> NodeId {
        let props = self.run_properties(tree, template);
        let run = tree.shallow_clone(template);
        if let Some(props) = props {
            let copy = tree.deep_clone(props);
            tree.append_child(run, copy);
        }
        run
    }

    fn append_text(&self, tree: &mut XmlTree, run: NodeId, text: &str) {
        let mut pending = String::new();
        for ch in text.chars() {
            let kind = match ch {
                '\n' => WordElement::Break,
                '\t' => WordElement::Tab,
                _ => {
                    pending.push(ch);
                    continue;
                }
            };
            self.flush_text(tree, run, &mut pending);
            let name = self.names.qualified(tree, run, kind);
            let node = tree.create_element(&name, &[]);
            tree.append_child(run, node);
        }
        self.flush_text(tree, run, &mut pending);
    }

    fn flush_text(&self, tree: &mut XmlTree, run: NodeId, pending: &mut String) {
        if pending.is_empty() {
            return;
        }
        let name = self.names.qualified(tree, run, WordElement::Text);
        let t = tree.create_element(&name, &[("xml:space", "preserve")]);
        let text = tree.create_text(pending);
        tree.append_child(t, text);
        tree.append_child(run, t);
        pending.clear();
    }

    /// Display text of a run; breaks read as `\n` and tabs as `\t`
    pub fn run_text(&self, tree: &XmlTree, run: NodeId) -> XmlResult<String> {
        let mut out = String::new();
        for child in tree.children(run) {
            match self.names.classify(tree, *child) {
                Some(WordElement::Text) => out.push_str(&tree.text_content(*child)?),
                Some(WordElement::Break) => out.push('\n'),
                Some(WordElement::Tab) => out.push('\t'),
                _ => {}
            }
        }
        Ok(out)
    }

    fn runs_text(&self, tree: &XmlTree, runs: &[NodeId]) -> XmlResult<String> {
        runs.iter().map(|run| self.run_text(tree, *run)).collect()
    }

    fn run_lengths(&self, tree: &XmlTree, runs: &[NodeId]) -> XmlResult<Vec<usize>> {
        runs.iter()
            .map(|run| self.run_text(tree, *run).map(|t| t.chars().count()))
            .collect()
    }

    /// Runs shown by a simple field, including runs wrapped in hyperlinks,
    /// smart tags or revision marks
    fn result_runs(&self, tree: &XmlTree, field: NodeId) -> Vec<NodeId> {
        tree.descendants(field)
            .filter(|node| self.names.is(tree, *node, WordElement::Run))
            .collect()
    }

    fn run_properties(&self, tree: &XmlTree, run: NodeId) -> Option<NodeId> {
        tree.first_child_named(run, self.names.local_name(WordElement::RunProperties))
    }
}

/// Text as a run can show it. Vertical tabs and form feeds become line
/// breaks, carriage returns are dropped, and so is anything XML 1.0 forbids.
fn display_text(text: &str) -> Cow<'_, str> {
    let shown = |c: &char| *c != '\r' && is_xml_char(*c);
    if text.chars().all(|c| shown(&c)) {
        return Cow::Borrowed(text);
    }
    text.chars()
        .map(|c| match c {
            '\u{b}' | '\u{c}' => '\n',
            c => c,
        })
        .filter(shown)
        .collect()
}

/// Attribute name in the same prefix as `like`
fn prefixed(tree: &XmlTree, like: NodeId, local: &str) -> String {
    match tree.element(like).and_then(|e| e.prefix()) {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}
