//! Heading normalization
//!
//! Each source file picks its own underline characters in whatever order it
//! likes. When files are stitched together their headings have to agree on a
//! single hierarchy, so every file's local order of first appearance is mapped
//! onto [`HEADING_MARKERS`] starting at the depth the file is included at.

use super::error::SourceTreeError;
use crate::markup::{underline_marker, HEADING_MARKERS};
use std::path::Path;

/// Underline characters of one file in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingHierarchy {
    markers: Vec<char>,
}

impl HeadingHierarchy {
    /// Scan a file's lines for the underline characters it uses
    pub fn scan<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut markers = Vec::new();
        for marker in lines.iter().filter_map(|line| underline_marker(line.as_ref())) {
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }
        Self { markers }
    }

    /// Local markers, outermost first
    pub fn markers(&self) -> &[char] {
        &self.markers
    }

    /// Check that the hierarchy fits into the global alphabet below `starting_level`
    ///
    /// # Returns
    /// * `Ok(())` - Every local level maps to a global marker
    /// * `Err(usize)` - The first global depth that has no marker
    pub fn check_fits(&self, starting_level: usize) -> Result<(), usize> {
        let deepest = starting_level + self.markers.len();
        if deepest > HEADING_MARKERS.len() {
            return Err(HEADING_MARKERS.len().max(starting_level));
        }
        Ok(())
    }

    /// Global marker for a local marker when the file starts at `starting_level`
    pub fn global_marker(&self, local: char, starting_level: usize) -> Option<char> {
        let index = self.markers.iter().position(|&c| c == local)?;
        HEADING_MARKERS.get(starting_level + index).copied()
    }
}

/// Rewrite the heading underlines of one file onto the global alphabet
///
/// Trailing whitespace is trimmed from every line.
///
/// # Parameters
/// * `lines` - Raw lines of the file
/// * `starting_level` - Global depth the file's outermost heading maps to
/// * `path` - Path of the file, for error reporting
///
/// # Returns
/// * `Ok(Vec<String>)` - Lines with normalized underlines
/// * `Err(SourceTreeError::HeadingDepthExceeded)` - The file needs more levels than remain
pub fn normalize_headings<S: AsRef<str>>(
    lines: &[S],
    starting_level: usize,
    path: &Path,
) -> Result<Vec<String>, SourceTreeError> {
    let hierarchy = HeadingHierarchy::scan(lines);
    hierarchy
        .check_fits(starting_level)
        .map_err(|depth| SourceTreeError::HeadingDepthExceeded {
            path: path.to_path_buf(),
            depth,
            max: HEADING_MARKERS.len(),
        })?;

    if !hierarchy.markers().is_empty() {
        log::debug!(
            "{}: heading markers {:?} mapped from level {}",
            path.display(),
            hierarchy.markers(),
            starting_level
        );
    }

    let normalized = lines
        .iter()
        .map(|line| {
            let line = line.as_ref().trim_end();
            match underline_marker(line).and_then(|c| hierarchy.global_marker(c, starting_level)) {
                Some(global) => global.to_string().repeat(line.chars().count()),
                None => line.to_string(),
            }
        })
        .collect();

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_hierarchy_first_appearance_order() {
        let input = lines("Title\n~~~~~\n\nSub\n^^^\n\nOther\n~~~~~\n\nDeep\n=====\n");
        let hierarchy = HeadingHierarchy::scan(&input);
        assert_eq!(hierarchy.markers(), &['~', '^', '=']);
    }

    #[test]
    fn test_normalize_maps_to_starting_level() {
        let input = lines("Title\n~~~~~\n\nSub\n^^^\ntext   ");
        let output = normalize_headings(&input, 2, Path::new("a.rst")).unwrap();
        assert_eq!(output, lines("Title\n=====\n\nSub\n---\ntext"));
    }

    #[test]
    fn test_normalize_is_noop_for_global_prefix() {
        let input = lines("Doc\n###\n\nPart\n***\n\nbody line\n");
        let output = normalize_headings(&input, 0, Path::new("a.rst")).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_table_rules_are_not_headings() {
        let input = lines("+-----+-----+\n| a   | b   |\n+=====+=====+\n===  ===\n");
        let hierarchy = HeadingHierarchy::scan(&input);
        assert!(hierarchy.markers().is_empty());
    }

    #[test]
    fn test_overflow_is_rejected() {
        let input = lines("A\n###\nB\n***\nC\n===\nD\n---\n");
        let result = normalize_headings(&input, 4, Path::new("deep.rst"));
        assert!(matches!(
            result,
            Err(SourceTreeError::HeadingDepthExceeded { depth: 7, max: 7, .. })
        ));
        assert!(normalize_headings(&input, 3, Path::new("deep.rst")).is_ok());
    }

    #[test]
    fn test_full_alphabet_only_fits_at_top() {
        let input = lines("A\n~~~\nB\n^^^\nC\n\"\"\"\nD\n---\nE\n===\nF\n***\nG\n###\n");
        let hierarchy = HeadingHierarchy::scan(&input);
        assert_eq!(hierarchy.markers(), &['~', '^', '"', '-', '=', '*', '#']);
        assert!(hierarchy.check_fits(0).is_ok());
        assert!(hierarchy.check_fits(1).is_err());
    }
}
