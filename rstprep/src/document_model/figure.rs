//! `figure` directives

use super::elements::Label;
use crate::markup::{directive_argument, parse_option_line};

/// A parsed `figure` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    /// Image path as written in the directive
    pub path: Option<String>,
    /// Caption paragraph joined into one line
    pub caption: String,
    /// Cross-reference label attached to the figure
    pub label: Option<Label>,
}

impl Figure {
    /// Parse a figure from its directive line and indented body
    ///
    /// Option lines such as `:width:` are skipped; the caption is the first
    /// paragraph after them.
    pub fn parse<S: AsRef<str>>(lines: &[S], label: Option<Label>) -> Self {
        let path = lines
            .first()
            .and_then(|first| directive_argument(first.as_ref(), "figure"))
            .map(|p| p.trim().to_string());

        let body = lines.iter().skip(1).map(|l| l.as_ref().trim());
        let caption = body
            .skip_while(|l| l.is_empty() || parse_option_line(l).is_some())
            .take_while(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            path,
            caption,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_figure() {
        let input = lines(
            ".. figure:: images/start.png\n\n   The start screen\n   of the app.\n\n",
        );
        let figure = Figure::parse(&input, None);
        assert_eq!(figure.path.as_deref(), Some("images/start.png"));
        assert_eq!(figure.caption, "The start screen of the app.");
    }

    #[test]
    fn test_parse_figure_with_options() {
        let input = lines(
            ".. figure:: a.png\n   :width: 80%\n   :alt: Screen\n\n   Caption\n\n   Legend text\n",
        );
        let figure = Figure::parse(&input, Some(Label::new("fig-a")));
        assert_eq!(figure.caption, "Caption");
        assert_eq!(figure.label, Some(Label::new("fig-a")));
    }

    #[test]
    fn test_parse_figure_without_path() {
        let figure = Figure::parse(&lines(".. figure::\n\n   Only caption"), None);
        assert_eq!(figure.path, None);
        assert_eq!(figure.caption, "Only caption");
    }
}
