//! Translation of source files through gettext catalogs
//!
//! Catalog keys are whole logical sentences while the `.rst` sources are
//! hard-wrapped, so wrapped lines are joined back together before any lookup.
//! Each logical line receives at most one substitution: the longest catalog
//! phrase it contains.

mod catalog;

pub use catalog::Catalog;

use crate::markup::{is_heading_underline, resize_heading};
use std::path::{Path, PathBuf};

/// Location of the catalog for `file` in `language`
///
/// `<dir>/locales/<language>/LC_MESSAGES/<stem>.po`
pub fn catalog_path(file: &Path, language: &str) -> PathBuf {
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join("locales")
        .join(language)
        .join("LC_MESSAGES")
        .join(format!("{stem}.po"))
}

/// Translate a file's lines with `catalog`
///
/// # Parameters
/// * `lines` - Raw lines of one source file
/// * `catalog` - Translations for that file
///
/// # Returns
/// * `Vec<String>` - Logical lines with translations applied and underlines resized
pub fn translate_lines<S: AsRef<str>>(lines: &[S], catalog: &Catalog) -> Vec<String> {
    let merged = merge_wrapped_lines(lines);
    let mut translated = 0usize;

    let mut output: Vec<String> = merged
        .into_iter()
        .map(|line| match catalog.longest_match(&line) {
            Some((source, target)) => {
                translated += 1;
                line.trim_end().replace(source, target)
            }
            None => line,
        })
        .collect();

    log::debug!("Translated {} of {} logical lines", translated, output.len());

    for idx in 1..output.len() {
        if is_heading_underline(&output[idx]) {
            resize_heading(&mut output, idx);
        }
    }
    output
}

/// Join hard-wrapped lines into logical lines
///
/// A line is appended to the previous one (separated by a single space) when
/// the previous line ends in a merge character, the current line starts with
/// one (directly, or after deep literal indentation of more than three
/// columns), neither line is a heading underline or overline and the current
/// line does not start a line block (`| `).
pub fn merge_wrapped_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines.iter().map(AsRef::as_ref) {
        match merged.last_mut() {
            Some(previous) if continues_previous(previous, line) => {
                previous.push(' ');
                previous.push_str(line.trim_start_matches(' '));
            }
            _ => merged.push(line.to_string()),
        }
    }
    merged
}

/// Characters that may end a wrapped line or start its continuation
fn is_merge_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '.' | ',' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')' | '|' | ':' | '\\'
        )
}

/// Whether `line` starts with a merge character, directly or after more than
/// three columns of indentation
fn starts_continuation(line: &str) -> bool {
    if line.chars().next().is_some_and(is_merge_char) {
        return true;
    }
    let Some(rest) = line.strip_prefix("   ") else {
        return false;
    };
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    rest.trim_start().chars().next().is_some_and(is_merge_char)
}

fn continues_previous(previous: &str, line: &str) -> bool {
    previous.chars().last().is_some_and(is_merge_char)
        && !is_heading_underline(previous)
        && starts_continuation(line)
        && !is_heading_underline(line)
        && !line.trim_start().starts_with("| ")
}
