//! Line scanners for the reStructuredText subset the preprocessor understands
//!
//! Every stage works on plain line sequences. The helpers here recognise the
//! handful of line shapes that matter (heading underlines, directive lines,
//! option lines, labels, footnote definitions) and return structured values.

/// Heading underline characters, outermost (depth 0) to innermost (depth 6)
pub const HEADING_MARKERS: [char; 7] = ['#', '*', '=', '-', '"', '^', '~'];

/// Minimum number of repetitions for a line to count as an underline
const MIN_UNDERLINE_LEN: usize = 3;

/// Return the marker character if `line` is a heading underline
///
/// A line qualifies when, ignoring trailing whitespace, it consists of a single
/// character from [`HEADING_MARKERS`] repeated at least three times. Table rules
/// such as `+----+` or `==== ====` never qualify.
pub fn underline_marker(line: &str) -> Option<char> {
    let trimmed = line.trim_end();
    let first = trimmed.chars().next()?;
    if !HEADING_MARKERS.contains(&first) {
        return None;
    }
    if trimmed.chars().count() < MIN_UNDERLINE_LEN {
        return None;
    }
    trimmed.chars().all(|c| c == first).then_some(first)
}

/// Check whether `line` is a heading underline
pub fn is_heading_underline(line: &str) -> bool {
    underline_marker(line).is_some()
}

/// Global depth of a heading marker, if it is part of the alphabet
pub fn marker_depth(marker: char) -> Option<usize> {
    HEADING_MARKERS.iter().position(|&c| c == marker)
}

/// Build an underline of `marker` matching the visible length of `title`
pub fn underline_for(title: &str, marker: char) -> String {
    marker.to_string().repeat(title.trim_end().chars().count())
}

/// Regenerate the underline at `underline_idx` (and a matching overline above
/// the title, if present) so it fits the title directly above it.
pub fn resize_heading(lines: &mut [String], underline_idx: usize) {
    if underline_idx == 0 || underline_idx >= lines.len() {
        return;
    }
    let Some(marker) = underline_marker(&lines[underline_idx]) else {
        return;
    };
    let title_idx = underline_idx - 1;
    if lines[title_idx].trim().is_empty() {
        return;
    }
    let resized = underline_for(&lines[title_idx], marker);
    if title_idx > 0 && underline_marker(&lines[title_idx - 1]) == Some(marker) {
        lines[title_idx - 1] = resized.clone();
    }
    lines[underline_idx] = resized;
}

/// Check whether `line` opens the directive `name` (e.g. `.. toctree::`)
pub fn is_directive(line: &str, name: &str) -> bool {
    line.trim()
        .strip_prefix(".. ")
        .and_then(|rest| rest.strip_prefix(name))
        .is_some_and(|rest| rest.starts_with("::"))
}

/// Return the argument of a directive line, e.g. `intro.rst` for
/// `.. include:: intro.rst`
///
/// Returns `None` when the line is not the directive or carries no argument.
pub fn directive_argument<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.trim().strip_prefix(".. ")?.strip_prefix(name)?;
    let argument = rest.strip_prefix(":: ")?;
    (!argument.trim().is_empty()).then_some(argument)
}

/// Parse a directive option line of the form `:key: value`
///
/// Keys are ASCII alphanumeric. A line without a value does not parse.
pub fn parse_option_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix(':')?;
    let (key, value) = rest.split_once(": ")?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((key, value))
}

/// Parse a cross-reference label line `.. _anchor:` into its anchor id
///
/// External hyperlink targets (`.. _name: https://...`) are not labels.
pub fn parse_label(line: &str) -> Option<&str> {
    let rest = line.trim_end().strip_prefix(".. _")?;
    let anchor = rest.strip_suffix(':')?;
    (!anchor.is_empty()).then_some(anchor)
}

/// Check whether `line` starts an auto-numbered footnote definition
pub fn is_footnote_definition(line: &str) -> bool {
    line.trim_start().starts_with(".. [#")
}

/// Parse a footnote definition `.. [#tag] text` into `("#tag", "text")`
///
/// The text may be empty when it starts on the following line.
pub fn parse_footnote_definition(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix(".. [")?;
    let end = rest.find(']')?;
    let tag = &rest[..end];
    if !tag.starts_with('#') || tag.len() < 2 {
        return None;
    }
    let after = &rest[end + 1..];
    if after.is_empty() {
        return Some((tag, ""));
    }
    after.strip_prefix(' ').map(|text| (tag, text.trim()))
}

/// Leading run of spaces and tabs
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underline_detection() {
        assert_eq!(underline_marker("====="), Some('='));
        assert_eq!(underline_marker("###   "), Some('#'));
        assert_eq!(underline_marker("~~"), None);
        assert_eq!(underline_marker("+----+"), None);
        assert_eq!(underline_marker("==== ===="), None);
        assert_eq!(underline_marker("_____"), None);
        assert_eq!(underline_marker("  ----"), None);
        assert_eq!(underline_marker(""), None);
    }

    #[test]
    fn test_resize_heading_with_overline() {
        let mut lines = vec![
            "###".to_string(),
            "Longer title".to_string(),
            "###".to_string(),
        ];
        resize_heading(&mut lines, 2);
        assert_eq!(lines[0], "############");
        assert_eq!(lines[2], "############");
    }

    #[test]
    fn test_directive_argument() {
        assert_eq!(
            directive_argument(".. include:: intro.rst", "include"),
            Some("intro.rst")
        );
        assert_eq!(directive_argument(".. include::", "include"), None);
        assert_eq!(directive_argument(".. include::    ", "include"), None);
        assert!(is_directive("   .. toctree::", "toctree"));
        assert!(!is_directive(".. toctreex::", "toctree"));
    }

    #[test]
    fn test_option_line() {
        assert_eq!(parse_option_line("   :caption: Usage"), Some(("caption", "Usage")));
        assert_eq!(parse_option_line(":widths: 30, 70"), Some(("widths", "30, 70")));
        assert_eq!(parse_option_line(":caption:"), None);
        assert_eq!(parse_option_line(":header-rows: 1"), None);
        assert_eq!(parse_option_line("plain text"), None);
    }

    #[test]
    fn test_label_line() {
        assert_eq!(parse_label(".. _install-guide:"), Some("install-guide"));
        assert_eq!(parse_label(".. _site: https://example.org"), None);
        assert_eq!(parse_label(".. _:"), None);
    }

    #[test]
    fn test_footnote_definition() {
        assert_eq!(
            parse_footnote_definition(".. [#note] Only on Android"),
            Some(("#note", "Only on Android"))
        );
        assert_eq!(parse_footnote_definition(".. [#x]"), Some(("#x", "")));
        assert_eq!(parse_footnote_definition(".. [1] manual"), None);
        assert_eq!(parse_footnote_definition(".. [#]"), None);
        assert!(is_footnote_definition(".. [#x] text"));
        assert!(!is_footnote_definition(".. [1] numbered"));
        assert!(!is_footnote_definition(".. [citation] text"));
    }
}
