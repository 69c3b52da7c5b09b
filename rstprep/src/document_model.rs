//! Document model for the flattened document
//!
//! The flattened line sequence is parsed into a flat list of [`Element`]s.
//! Headings and paragraphs stay in markup form; tables, figures and labels are
//! parsed into structured values so the exporter can lower them to LaTeX.

mod csv_table;
mod elements;
mod figure;
mod parser;

pub use csv_table::{split_csv_row, CsvTable, Footnote, TABLE_OPTION_KEYS};
pub use elements::{Element, Label};
pub use figure::Figure;
pub use parser::{parse_document, DocumentParser};

/// Element counts of a parsed document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Number of headers
    pub headers: usize,
    /// Number of standalone and attached labels
    pub labels: usize,
    /// Number of paragraphs
    pub paragraphs: usize,
    /// Number of tables
    pub tables: usize,
    /// Number of figures
    pub figures: usize,
}

impl DocumentStats {
    /// Count the elements of a parsed document
    pub fn collect(elements: &[Element]) -> Self {
        let mut stats = Self::default();
        for element in elements {
            match element {
                Element::Header { .. } => stats.headers += 1,
                Element::Label(_) => stats.labels += 1,
                Element::Paragraph(_) => stats.paragraphs += 1,
                Element::CsvTable(table) => {
                    stats.tables += 1;
                    stats.labels += usize::from(table.label.is_some());
                }
                Element::Figure(figure) => {
                    stats.figures += 1;
                    stats.labels += usize::from(figure.label.is_some());
                }
            }
        }
        stats
    }
}
