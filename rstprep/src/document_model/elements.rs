//! Elements of the parsed document

use super::csv_table::CsvTable;
use super::figure::Figure;

/// A cross-reference anchor (`.. _anchor:`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Anchor id as written after `.. _`
    pub anchor_id: String,
}

impl Label {
    /// Create a label for `anchor_id`
    pub fn new(anchor_id: impl Into<String>) -> Self {
        Self {
            anchor_id: anchor_id.into(),
        }
    }
}

/// One block of the linearized document
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A section heading, kept in markup form
    Header {
        /// Overline, for headings written with one
        overline: Option<String>,
        /// Heading text
        title: String,
        /// Underline below the heading text
        underline: String,
    },

    /// A standalone cross-reference anchor following the block it names
    Label(Label),

    /// Lines passed through unchanged
    Paragraph(Vec<String>),

    /// A `csv-table` directive
    CsvTable(CsvTable),

    /// A `figure` directive
    Figure(Figure),
}

impl Element {
    /// Short name of the element kind, used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Header { .. } => "header",
            Element::Label(_) => "label",
            Element::Paragraph(_) => "paragraph",
            Element::CsvTable(_) => "csv-table",
            Element::Figure(_) => "figure",
        }
    }
}
