//! Single-pass parser from flattened lines to elements

use super::csv_table::CsvTable;
use super::elements::{Element, Label};
use super::figure::Figure;
use crate::markup::{
    indentation, is_directive, is_footnote_definition, parse_label, underline_marker,
};

/// Directives captured as one paragraph when they directly follow a label
const LABELED_BLOCK_DIRECTIVES: [&str; 8] = [
    "versionadded",
    "versionchanged",
    "deprecated",
    "note",
    "warning",
    "important",
    "hint",
    "tip",
];

const LIST_CONTINUATION: &[Continuation] = &[Continuation::ListItem, Continuation::ListBody];
const BLOCK_CONTINUATION: &[Continuation] = &[Continuation::Indented];

/// Line shapes that continue an extracted block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    /// Indented by at least three spaces
    Indented,
    /// A further `- ` list item
    ListItem,
    /// Body of a list item, indented by at least two spaces
    ListBody,
}

impl Continuation {
    fn matches(self, line: &str) -> bool {
        match self {
            Continuation::Indented => indentation(line).contains("   "),
            Continuation::ListItem => line.trim_start_matches([' ', '\t']).starts_with("- "),
            Continuation::ListBody => indentation(line).contains("  "),
        }
    }
}

/// A label waiting for the element it names
#[derive(Debug)]
struct PendingLabel {
    label: Label,
    /// Number of elements that existed when the label was read
    elements_before: usize,
}

/// Parser state for converting flattened lines into elements
#[derive(Debug, Default)]
pub struct DocumentParser {
    /// Completed elements
    elements: Vec<Element>,
    /// Lines of the paragraph being accumulated
    paragraph: Vec<String>,
    /// Label read but not yet attached
    pending_label: Option<PendingLabel>,
}

impl DocumentParser {
    /// Create a parser with empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the flattened document
    ///
    /// # Parameters
    /// * `lines` - The flattened, substituted line sequence
    ///
    /// # Returns
    /// * `Vec<Element>` - Elements in document order
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Vec<Element> {
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim_end()).collect();
        let mut parser = Self::new();
        let mut idx = 0;
        while idx < lines.len() {
            idx = parser.step(&lines, idx);
        }
        parser.finish()
    }

    /// Handle the line at `idx`, returning the index of the next unhandled line
    fn step(&mut self, lines: &[&str], idx: usize) -> usize {
        let line = lines[idx];

        if let Some(anchor) = parse_label(line) {
            self.set_pending_label(Label::new(anchor));
            return idx + 1;
        }

        let next_is_underline = lines.get(idx + 1).and_then(|l| underline_marker(l)).is_some();
        if next_is_underline && !line.trim().is_empty() {
            self.flush_paragraph();
            self.push_header(lines, idx);
            return idx + 2;
        }

        if line.starts_with(".. csv-table::") {
            self.flush_paragraph();
            let (block, next) = extract_table_block(lines, idx);
            let label = self.take_label();
            self.elements.push(Element::CsvTable(CsvTable::parse(&block, label)));
            return next;
        }

        if line.starts_with(".. figure::") {
            self.flush_paragraph();
            let (block, next) = extract_block(lines, idx, BLOCK_CONTINUATION);
            let label = self.take_label();
            self.elements.push(Element::Figure(Figure::parse(&block, label)));
            return next;
        }

        if self.pending_label.is_some() {
            let continuation: Option<&[Continuation]> = if line.starts_with("- ") {
                Some(LIST_CONTINUATION)
            } else if LABELED_BLOCK_DIRECTIVES
                .iter()
                .any(|name| line.starts_with(".. ") && is_directive(line, name))
            {
                Some(BLOCK_CONTINUATION)
            } else {
                None
            };
            if let Some(continuation) = continuation {
                self.flush_paragraph();
                let (mut block, next) = extract_block(lines, idx, continuation);
                while block.last().is_some_and(|l| l.trim().is_empty()) {
                    block.pop();
                }
                self.elements.push(Element::Paragraph(block));
                self.attach_label_after_last();
                return next;
            }
        }

        if line.trim().is_empty() {
            self.flush_paragraph();
            let advanced = self
                .pending_label
                .as_ref()
                .is_some_and(|p| p.elements_before != self.elements.len());
            if advanced {
                self.attach_label_after_last();
            }
        } else {
            self.paragraph.push(line.to_string());
        }
        idx + 1
    }

    /// Close the parse, flushing open state
    fn finish(mut self) -> Vec<Element> {
        self.flush_paragraph();
        self.attach_label_after_last();
        self.elements
    }

    fn push_header(&mut self, lines: &[&str], idx: usize) {
        let underline = lines[idx + 1].to_string();
        // an overline directly above belongs to this heading
        let has_overline =
            idx > 0 && lines[idx - 1] == underline && self.paragraph_overline(&underline);
        let overline = if has_overline {
            match self.elements.pop() {
                Some(Element::Paragraph(mut p)) => p.pop(),
                _ => None,
            }
        } else {
            None
        };
        self.elements.push(Element::Header {
            overline,
            title: lines[idx].to_string(),
            underline,
        });
        self.attach_label_after_last();
    }

    /// Whether the last flushed paragraph is exactly the overline of a heading
    /// with `underline`
    fn paragraph_overline(&self, underline: &str) -> bool {
        matches!(
            self.elements.last(),
            Some(Element::Paragraph(p)) if p.len() == 1 && p[0] == underline
        )
    }

    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            let lines = std::mem::take(&mut self.paragraph);
            self.elements.push(Element::Paragraph(lines));
        }
    }

    fn set_pending_label(&mut self, label: Label) {
        if let Some(previous) = self.pending_label.take() {
            log::warn!(
                "Label '{}' is followed by label '{}' without content; emitting it standalone",
                previous.label.anchor_id,
                label.anchor_id
            );
            self.elements.push(Element::Label(previous.label));
        }
        self.pending_label = Some(PendingLabel {
            label,
            elements_before: self.elements.len(),
        });
    }

    fn take_label(&mut self) -> Option<Label> {
        self.pending_label.take().map(|p| p.label)
    }

    fn attach_label_after_last(&mut self) {
        if let Some(label) = self.take_label() {
            self.elements.push(Element::Label(label));
        }
    }
}

/// Collect the line at `start` plus every following line that is blank or
/// matches one of `continuation`
fn extract_block(
    lines: &[&str],
    start: usize,
    continuation: &[Continuation],
) -> (Vec<String>, usize) {
    let mut block = vec![lines[start].to_string()];
    let mut idx = start + 1;
    while idx < lines.len()
        && (lines[idx].is_empty() || continuation.iter().any(|c| c.matches(lines[idx])))
    {
        block.push(lines[idx].to_string());
        idx += 1;
    }
    (block, idx)
}

/// Collect a `csv-table` directive with its options, rows and the `.. [#tag]`
/// footnote definitions that follow it
///
/// The block ends after the last footnote definition and its indented
/// continuation lines. Blank lines after the block are left to the caller.
fn extract_table_block(lines: &[&str], start: usize) -> (Vec<String>, usize) {
    let body = |l: &str| !l.trim().is_empty() && Continuation::Indented.matches(l);
    let skip_blank = |from: usize| {
        (from..lines.len())
            .find(|&i| !lines[i].trim().is_empty())
            .unwrap_or(lines.len())
    };
    let run_end = |from: usize| {
        (from..lines.len())
            .find(|&i| !body(lines[i]))
            .unwrap_or(lines.len())
    };

    // options directly below the directive, then the rows after a blank line
    let mut end = run_end(start + 1);
    let rows = skip_blank(end);
    if rows < lines.len() && body(lines[rows]) {
        end = run_end(rows);
    }

    loop {
        let next = skip_blank(end);
        if next < lines.len() && is_footnote_definition(lines[next]) {
            end = run_end(next + 1);
        } else {
            break;
        }
    }

    let block = lines[start..end].iter().map(|l| l.to_string()).collect();
    (block, end)
}

/// Parse flattened lines into elements
pub fn parse_document<S: AsRef<str>>(lines: &[S]) -> Vec<Element> {
    DocumentParser::parse(lines)
}
