//! Raw-LaTeX lowering and serialization
//!
//! Headings and paragraphs are written back as markup. Labels, tables and
//! figures become `.. raw:: latex` islands so the downstream converter passes
//! them through untouched.

use crate::document_config::{FigureStyle, TableStyle};
use crate::document_model::{CsvTable, Element, Figure, Label};
use itertools::Itertools;

const RAW_LATEX_DIRECTIVE: &str = ".. raw:: latex";
const RAW_LATEX_INDENT: &str = "    ";
const ORIGINAL_FOOTNOTE_VALUE: &str = "\\numexpr\\value{originalfootnotevalue}";

/// Wrap LaTeX commands into a raw island
///
/// The island is surrounded by blank lines and every command is indented by
/// four spaces.
pub fn raw_latex_block<S: AsRef<str>>(commands: &[S]) -> Vec<String> {
    let mut lines = Vec::with_capacity(commands.len() + 4);
    lines.push(String::new());
    lines.push(RAW_LATEX_DIRECTIVE.to_string());
    lines.push(String::new());
    lines.extend(
        commands
            .iter()
            .map(|c| format!("{RAW_LATEX_INDENT}{}", c.as_ref())),
    );
    lines.push(String::new());
    lines
}

/// Running count of table footnotes in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FootnoteCounter {
    value: u32,
}

impl FootnoteCounter {
    /// Start counting after `start` footnotes
    pub fn new(start: u32) -> Self {
        Self { value: start }
    }

    /// Number of the last footnote issued
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Issue the next `count` numbers
    ///
    /// # Returns
    /// * The numbers issued, continuing from the current value
    pub fn advance(&mut self, count: u32) -> std::ops::RangeInclusive<u32> {
        let first = self.value + 1;
        self.value += count;
        first..=self.value
    }
}

/// A table footnote with its place in the document numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedFootnote {
    /// Tag including the leading `#`
    pub tag: String,
    /// Footnote text
    pub text: String,
    /// 1-based offset within its table
    pub offset: u32,
    /// Number in the whole document
    pub number: u32,
}

/// State carried across the rendering of one document
#[derive(Debug, Clone)]
pub struct RenderContext {
    table: TableStyle,
    figure: FigureStyle,
    footnotes: FootnoteCounter,
}

impl RenderContext {
    /// Create a context with the footnote counter at zero
    pub fn new(table: TableStyle, figure: FigureStyle) -> Self {
        Self {
            table,
            figure,
            footnotes: FootnoteCounter::default(),
        }
    }

    /// Footnote counter after everything rendered so far
    pub fn footnote_counter(&self) -> FootnoteCounter {
        self.footnotes
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(TableStyle::default(), FigureStyle::default())
    }
}

/// Render all elements, each followed by one blank line
///
/// # Parameters
/// * `elements` - Parsed document
/// * `ctx` - Render state; its footnote counter advances past every table
///
/// # Returns
/// * The output document as lines
pub fn to_rst(elements: &[Element], ctx: &mut RenderContext) -> Vec<String> {
    let mut lines = Vec::new();
    for element in elements {
        log::trace!("Rendering {}", element.kind());
        lines.extend(render_element(element, ctx));
        lines.push(String::new());
    }
    lines
}

/// Render all elements and join them into the output text
pub fn serialize(elements: &[Element], ctx: &mut RenderContext) -> String {
    to_rst(elements, ctx).join("\n")
}

/// Render one element
pub fn render_element(element: &Element, ctx: &mut RenderContext) -> Vec<String> {
    match element {
        Element::Header {
            overline,
            title,
            underline,
        } => overline
            .iter()
            .cloned()
            .chain([title.clone(), underline.clone()])
            .collect(),
        Element::Paragraph(lines) => lines.clone(),
        Element::Label(label) => raw_latex_block(&[label_command(label)]),
        Element::CsvTable(table) => raw_latex_block(&table_commands(table, ctx)),
        Element::Figure(figure) => raw_latex_block(&figure_commands(figure, &ctx.figure)),
    }
}

fn label_command(label: &Label) -> String {
    format!("\\label{{{}}}", label.anchor_id)
}

/// Number the footnotes of a table and advance the counter past them
pub fn number_footnotes(table: &CsvTable, counter: &mut FootnoteCounter) -> Vec<NumberedFootnote> {
    let numbers = counter.advance(table.footnotes.len() as u32);
    table
        .footnotes
        .iter()
        .zip(numbers)
        .zip(1..)
        .map(|((footnote, number), offset)| NumberedFootnote {
            tag: footnote.tag.clone(),
            text: footnote.text.clone(),
            offset,
            number,
        })
        .collect()
}

fn table_commands(table: &CsvTable, ctx: &mut RenderContext) -> Vec<String> {
    let style = &ctx.table;
    let mut commands = vec![
        "\\setcounter{originalfootnotevalue}{\\value{footnote}}".to_string(),
        "\\begin{table}[h!]".to_string(),
        "\\centering".to_string(),
        format!(
            "\\rowcolors{{1}}{{{}}}{{{}}}",
            style.even_row_color, style.odd_row_color
        ),
    ];
    if let Some(title) = &table.title {
        commands.push(format!("\\caption{{{title}}}"));
    }
    if let Some(label) = &table.label {
        commands.push(label_command(label));
    }

    let column_count = table.column_count();
    if column_count > 0 {
        commands.push(format!("\\begin{{tabular}}{{{}}}", column_spec(table, style)));
        commands.push("\\toprule".to_string());

        if let Some(titles) = table.header_titles() {
            commands.push(format!("\\rowcolor{{{}}}", style.header_color));
            commands.push(table_row(titles.iter().map(String::as_str)));
            commands.push("\\midrule".to_string());
        }

        for row in &table.rows {
            let cells = row.iter().map(|cell| table_cell(cell, table)).collect_vec();
            commands.push(table_row(cells.iter().map(String::as_str)));
        }

        commands.push("\\bottomrule".to_string());
        commands.push("\\end{tabular}".to_string());
    } else {
        log::warn!(
            "Table {} has no rows",
            table.title.as_deref().unwrap_or("(untitled)")
        );
    }
    commands.push("\\end{table}".to_string());

    let numbered = number_footnotes(table, &mut ctx.footnotes);
    if let Some(last) = numbered.last() {
        for footnote in &numbered {
            commands.push(format!(
                "\\footnotetext[{ORIGINAL_FOOTNOTE_VALUE}+{}]{{{}}}",
                footnote.offset, footnote.text
            ));
        }
        commands.push(format!(
            "\\setcounter{{footnote}}{{{ORIGINAL_FOOTNOTE_VALUE}+{}}}",
            last.offset
        ));
        log::debug!(
            "Table footnotes numbered {}..={}",
            numbered[0].number,
            last.number
        );
    }

    commands
}

fn column_spec(table: &CsvTable, style: &TableStyle) -> String {
    let equal = || "l".repeat(table.column_count());
    match table.column_widths() {
        None => equal(),
        Some(Ok(widths)) if !widths.is_empty() => widths
            .iter()
            .map(|&w| {
                format!(
                    "p{{{:?}\\linewidth}}",
                    f64::from(w) / f64::from(style.column_units)
                )
            })
            .join(" "),
        Some(Ok(_)) => equal(),
        Some(Err(raw)) => {
            log::warn!("Invalid csv-table widths '{}', using equal columns", raw);
            equal()
        }
    }
}

fn table_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    format!("{} \\\\", cells.format(" & "))
}

/// Lower one table cell: footnote references, string delimiters and escaped asterisks
fn table_cell(cell: &str, table: &CsvTable) -> String {
    replace_footnote_refs(cell, table)
        .trim_matches('\'')
        .replace("\\*", "$*$")
}

/// Replace `[#tag]_` references to footnotes of `table` with `\footnotemark`
///
/// References to tags the table does not define are left as written.
fn replace_footnote_refs(cell: &str, table: &CsvTable) -> String {
    let mut output = String::with_capacity(cell.len());
    let mut rest = cell;

    while let Some(start) = rest.find("[#") {
        let Some(len) = rest[start..].find("]_") else {
            break;
        };
        let tag = &rest[start + 1..start + len];
        output.push_str(&rest[..start]);
        match table.footnote_position(tag) {
            Some(offset) => output.push_str(&format!(
                "\\footnotemark[{ORIGINAL_FOOTNOTE_VALUE}+{offset}]"
            )),
            None => output.push_str(&rest[start..start + len + 2]),
        }
        rest = &rest[start + len + 2..];
    }
    output.push_str(rest);
    output
}

fn figure_commands(figure: &Figure, style: &FigureStyle) -> Vec<String> {
    let mut commands = vec!["\\begin{figure}[htbp]".to_string(), "\\centering".to_string()];
    if let Some(path) = &figure.path {
        commands.push(format!(
            "\\includegraphics[width={}, keepaspectratio]{{{path}}}",
            style.width
        ));
    }
    commands.push(format!("\\caption{{{}}}", figure.caption));
    if let Some(label) = &figure.label {
        commands.push(label_command(label));
    }
    commands.push("\\end{figure}".to_string());
    commands
}
