//! `csv-table` directives with their footnotes

use super::elements::Label;
use crate::markup::{directive_argument, parse_footnote_definition, parse_option_line};
use std::collections::BTreeMap;

/// Option keys of a `csv-table` the renderer understands
pub const TABLE_OPTION_KEYS: [&str; 2] = ["widths", "header"];

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// A footnote defined below a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    /// Footnote tag including the leading `#`
    pub tag: String,
    /// Footnote text, continuation lines joined with spaces
    pub text: String,
}

/// A parsed `csv-table` directive
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    /// Directive argument, used as the caption
    pub title: Option<String>,
    /// Recognized options (`widths`, `header`) with their raw values
    pub options: BTreeMap<String, String>,
    /// Data rows
    pub rows: Vec<Vec<String>>,
    /// Footnotes in definition order
    pub footnotes: Vec<Footnote>,
    /// Cross-reference label attached to the table
    pub label: Option<Label>,
}

impl CsvTable {
    /// Parse a table from its directive line, indented body and footnote definitions
    ///
    /// # Parameters
    /// * `lines` - The directive line followed by its body
    /// * `label` - Label that was pending when the directive started
    ///
    /// # Returns
    /// * `CsvTable` - The parsed table; missing parts are left empty
    pub fn parse<S: AsRef<str>>(lines: &[S], label: Option<Label>) -> Self {
        let line = |idx: usize| lines[idx].as_ref();
        let blank = |idx: usize| lines[idx].as_ref().trim().is_empty();

        let title = lines
            .first()
            .and_then(|first| directive_argument(first.as_ref(), "csv-table"))
            .map(|t| t.trim().to_string());

        let mut idx = 1;
        let mut options = BTreeMap::new();
        while idx < lines.len() && !blank(idx) {
            match parse_option_line(line(idx)) {
                Some((key, value)) if TABLE_OPTION_KEYS.contains(&key) => {
                    options.insert(key.to_string(), value.to_string());
                }
                Some((key, _)) => log::debug!("Ignoring csv-table option '{}'", key),
                None => {}
            }
            idx += 1;
        }
        idx += 1;

        let mut rows = Vec::new();
        while idx < lines.len() && !blank(idx) {
            rows.push(split_csv_row(line(idx).trim()));
            idx += 1;
        }

        let mut footnotes: Vec<Footnote> = Vec::new();
        while idx < lines.len() {
            if blank(idx) {
                idx += 1;
                continue;
            }
            let Some((tag, text)) = parse_footnote_definition(line(idx)) else {
                log::warn!("Dropping unrecognized line in csv-table: {}", line(idx).trim());
                idx += 1;
                continue;
            };
            let mut text = text.to_string();
            idx += 1;
            while idx < lines.len() && !blank(idx) && parse_footnote_definition(line(idx)).is_none()
            {
                let continuation = line(idx).trim();
                if text.is_empty() {
                    text = continuation.to_string();
                } else {
                    text.push(' ');
                    text.push_str(continuation);
                }
                idx += 1;
            }
            match footnotes.iter_mut().find(|f| f.tag == tag) {
                Some(existing) => existing.text = text,
                None => footnotes.push(Footnote {
                    tag: tag.to_string(),
                    text,
                }),
            }
        }

        Self {
            title,
            options,
            rows,
            footnotes,
            label,
        }
    }

    /// Widest row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Position (1-based) of a footnote tag in definition order
    pub fn footnote_position(&self, tag: &str) -> Option<usize> {
        self.footnotes.iter().position(|f| f.tag == tag).map(|p| p + 1)
    }

    /// Column widths from the `widths` option
    ///
    /// # Returns
    /// * `None` - No `widths` option
    /// * `Some(Err(value))` - The option is present but not a list of integers
    /// * `Some(Ok(widths))` - Parsed widths
    pub fn column_widths(&self) -> Option<Result<Vec<u32>, String>> {
        let raw = self.options.get("widths")?;
        let parsed = raw
            .split(DELIMITER)
            .map(|w| w.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| raw.clone());
        Some(parsed)
    }

    /// Column titles from the `header` option
    pub fn header_titles(&self) -> Option<Vec<String>> {
        self.options.get("header").map(|raw| split_csv_row(raw))
    }
}

/// Split one CSV row into trimmed, unquoted fields
///
/// The delimiter only splits outside double quotes. Quote characters are kept
/// while scanning and stripped from both ends of each field afterwards. A field
/// whose quote is still open at the end of the row is dropped.
pub fn split_csv_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in row.chars() {
        match c {
            QUOTE => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            DELIMITER if !in_quotes => {
                fields.push(finish_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() && !in_quotes {
        fields.push(finish_field(&current));
    }
    fields
}

fn finish_field(raw: &str) -> String {
    raw.trim().trim_matches(QUOTE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_split_quoted_delimiter() {
        assert_eq!(split_csv_row(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_split_trims_fields() {
        assert_eq!(
            split_csv_row(r#" "Name" ,  Value , "Long, quoted""#),
            vec!["Name", "Value", "Long, quoted"]
        );
    }

    #[test]
    fn test_split_unterminated_quote_drops_field() {
        assert_eq!(split_csv_row(r#"a,b,"unterminated, field"#), vec!["a", "b"]);
    }

    #[test]
    fn test_split_trailing_delimiter() {
        assert_eq!(split_csv_row("a,b,"), vec!["a", "b"]);
        assert_eq!(split_csv_row(""), Vec::<String>::new());
    }

    #[test]
    fn test_parse_table() {
        let input = lines(
            r#".. csv-table:: Supported readers
   :header: "Reader", "Status"
   :widths: 80, 40
   :align: left

   "Reader A", "OK [#usb]_"
   Reader B, "Limited [#nfc]_"

.. [#usb] Only via USB.
.. [#nfc] Requires NFC
   on Android.
"#,
        );
        let table = CsvTable::parse(&input, Some(Label::new("readers")));
        assert_eq!(table.title.as_deref(), Some("Supported readers"));
        assert_eq!(table.options.len(), 2);
        assert_eq!(
            table.header_titles(),
            Some(vec!["Reader".to_string(), "Status".to_string()])
        );
        assert_eq!(table.column_widths(), Some(Ok(vec![80, 40])));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Reader B", "Limited [#nfc]_"]);
        assert_eq!(table.column_count(), 2);
        assert_eq!(
            table.footnotes,
            vec![
                Footnote {
                    tag: "#usb".to_string(),
                    text: "Only via USB.".to_string()
                },
                Footnote {
                    tag: "#nfc".to_string(),
                    text: "Requires NFC on Android.".to_string()
                },
            ]
        );
        assert_eq!(table.footnote_position("#nfc"), Some(2));
        assert_eq!(table.label, Some(Label::new("readers")));
    }

    #[test]
    fn test_parse_table_without_title_or_options() {
        let input = lines(".. csv-table::\n\n   1,2,3\n   4,5\n");
        let table = CsvTable::parse(&input, None);
        assert_eq!(table.title, None);
        assert!(table.options.is_empty());
        assert_eq!(table.column_count(), 3);
        assert!(table.footnotes.is_empty());
        assert_eq!(table.column_widths(), None);
    }

    #[test]
    fn test_invalid_widths() {
        let input = lines(".. csv-table::\n   :widths: auto\n\n   a\n");
        let table = CsvTable::parse(&input, None);
        assert_eq!(table.column_widths(), Some(Err("auto".to_string())));
    }

    #[test]
    fn test_untagged_footnote_is_skipped() {
        let input = lines(".. csv-table::\n\n   a\n\n.. [#] untagged\n.. [#x] Tagged\n");
        let table = CsvTable::parse(&input, None);
        assert_eq!(
            table.footnotes,
            vec![Footnote {
                tag: "#x".to_string(),
                text: "Tagged".to_string()
            }]
        );
    }

    #[test]
    fn test_footnotes_separated_by_blank_lines() {
        let input = lines(".. csv-table::\n\n   a [#x]_\n\n.. [#x] First\n\n.. [#y]\n   Second\n");
        let table = CsvTable::parse(&input, None);
        assert_eq!(table.footnotes.len(), 2);
        assert_eq!(table.footnotes[1].text, "Second");
    }
}
