//! Text-level rewrites of the flattened document
//!
//! Placeholders like `|AppName|` are replaced by literal values, and manual
//! table-of-contents style headings are turned into unnumbered LaTeX sections
//! so they do not become parents of the rest of the document.

use crate::latex_exporter::raw_latex_block;
use crate::markup::{is_heading_underline, resize_heading};

/// Heading titles that are rendered as unnumbered sections by default
pub const DEFAULT_TOC_HEADERS: [&str; 3] =
    ["Table of contents", "Inhaltsverzeichnis", "Release Notes"];

/// Replace every `|name|` with `value`
///
/// When a replaced line is a heading title, its underline is resized to the
/// new title length.
pub fn replace_placeholder<S: AsRef<str>>(lines: &[S], name: &str, value: &str) -> Vec<String> {
    let token = format!("|{name}|");
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut replaced = 0usize;

    for (idx, line) in lines.iter().map(AsRef::as_ref).enumerate() {
        if line.contains(&token) {
            replaced += 1;
            output.push(line.replace(&token, value));
        } else {
            output.push(line.to_string());
        }
        let title_replaced = idx > 0 && lines[idx - 1].as_ref().contains(&token);
        if title_replaced && is_heading_underline(line) {
            resize_heading(&mut output, idx);
        }
    }

    log::debug!("Replaced {} on {} lines", token, replaced);
    output
}

/// Replace listed headings with raw `\section*{...}` islands
///
/// Every other line is passed through with trailing whitespace trimmed.
pub fn inline_toc_headers<S: AsRef<str>, T: AsRef<str>>(
    lines: &[S],
    titles: &[T],
) -> Vec<String> {
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx].as_ref().trim();
        let is_toc_title = titles.iter().any(|title| title.as_ref() == line);
        let underlined = lines
            .get(idx + 1)
            .is_some_and(|next| is_heading_underline(next.as_ref()));

        if is_toc_title && underlined {
            log::debug!("Inlining heading '{}' as unnumbered section", line);
            if has_overline(lines, idx) {
                output.pop();
            }
            output.extend(raw_latex_block(&[format!("\\section*{{{line}}}")]));
            idx += 2;
        } else {
            output.push(lines[idx].as_ref().trim_end().to_string());
            idx += 1;
        }
    }

    output
}

/// Whether the heading title at `idx` has an overline matching its underline
///
/// The overline must start the input or follow a blank line; otherwise it is
/// the underline of the heading before.
fn has_overline<S: AsRef<str>>(lines: &[S], idx: usize) -> bool {
    if idx == 0 {
        return false;
    }
    let underline = lines[idx + 1].as_ref().trim_end();
    let candidate = lines[idx - 1].as_ref().trim_end();
    let separated = idx == 1 || lines[idx - 2].as_ref().trim().is_empty();
    candidate == underline && separated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_replace_placeholder_everywhere() {
        let input = lines("Welcome to |AppName|.\n\nUse |AppName| |version| today.");
        let output = replace_placeholder(&input, "AppName", "Ausweis App");
        assert_eq!(
            output,
            lines("Welcome to Ausweis App.\n\nUse Ausweis App |version| today.")
        );
    }

    #[test]
    fn test_replace_placeholder_resizes_underline() {
        let input = lines("|AppName| manual\n================\n\nText");
        let output = replace_placeholder(&input, "AppName", "App");
        assert_eq!(output, lines("App manual\n==========\n\nText"));
    }

    #[test]
    fn test_replace_placeholder_leaves_other_underlines() {
        let input = lines("Title\n=====\n\n|version|");
        let output = replace_placeholder(&input, "version", "2.3.1");
        assert_eq!(output, lines("Title\n=====\n\n2.3.1"));
    }

    #[test]
    fn test_inline_toc_header() {
        let input = lines(
            "Table of contents\n#################\n\nRelease Notes\n*************\nBody\nTable of contents",
        );
        let output = inline_toc_headers(&input, &DEFAULT_TOC_HEADERS);
        assert_eq!(
            output,
            vec![
                "",
                ".. raw:: latex",
                "",
                "    \\section*{Table of contents}",
                "",
                "",
                "",
                ".. raw:: latex",
                "",
                "    \\section*{Release Notes}",
                "",
                "Body",
                "Table of contents",
            ]
        );
    }

    #[test]
    fn test_inline_toc_header_keeps_other_headings() {
        let input = lines("Introduction\n============\n\nText   ");
        let output = inline_toc_headers(&input, &DEFAULT_TOC_HEADERS);
        assert_eq!(output, lines("Introduction\n============\n\nText"));
    }

    #[test]
    fn test_inline_toc_header_with_overline() {
        let input = lines("#############\nRelease Notes\n#############\nBody");
        let output = inline_toc_headers(&input, &["Release Notes"]);
        assert_eq!(output[0], "");
        assert_eq!(output[3], "    \\section*{Release Notes}");
        assert_eq!(output.last().unwrap(), "Body");
        assert!(!output.iter().any(|l| l.starts_with("###")));
    }

    #[test]
    fn test_inline_toc_header_after_heading_with_same_underline() {
        let input = lines("Whole chapter\n=============\nRelease Notes\n=============\nx");
        let output = inline_toc_headers(&input, &["Release Notes"]);
        assert_eq!(
            output,
            vec![
                "Whole chapter",
                "=============",
                "",
                ".. raw:: latex",
                "",
                "    \\section*{Release Notes}",
                "",
                "x",
            ]
        );
    }

    #[test]
    fn test_inline_toc_header_overline_after_blank_line() {
        let input = lines("Text\n\n=============\nRelease Notes\n=============\n");
        let output = inline_toc_headers(&input, &["Release Notes"]);
        assert_eq!(output[..2], ["Text", ""]);
        assert!(!output.iter().any(|l| l.starts_with("===")));
    }
}
