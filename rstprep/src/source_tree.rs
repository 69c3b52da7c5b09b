//! Flattening of a multi-file document tree
//!
//! Starting from the root file, every `.. include::` and `.. toctree::`
//! directive is replaced by the flattened content of the files it references.
//! Each file is translated (when a language is requested) and has its headings
//! normalized to the depth it is included at before its own directives are
//! resolved.

mod error;
mod headings;

pub use error::SourceTreeError;
pub use headings::{normalize_headings, HeadingHierarchy};

use crate::latex_exporter::raw_latex_block;
use crate::markup::{
    directive_argument, is_directive, marker_depth, parse_option_line, underline_for,
    underline_marker, HEADING_MARKERS,
};
use crate::translation::{self, Catalog};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

/// State carried through one flattening run
#[derive(Debug, Default)]
pub struct FlattenContext {
    /// Target language, if the run translates
    language: Option<String>,
    /// Whether the table of contents marker has been emitted
    toc_inserted: bool,
    /// Files currently being flattened, outermost first
    include_stack: Vec<PathBuf>,
    /// Number of files flattened so far
    files_flattened: usize,
}

impl FlattenContext {
    /// Create a context for a run, optionally translating into `language`
    pub fn new(language: Option<String>) -> Self {
        Self {
            language: language.filter(|l| !l.is_empty()),
            ..Self::default()
        }
    }

    /// Whether a toctree has been seen (and the table of contents inserted)
    pub fn toc_inserted(&self) -> bool {
        self.toc_inserted
    }

    /// Number of files flattened so far
    pub fn files_flattened(&self) -> usize {
        self.files_flattened
    }
}

/// Flatten the document tree rooted at `root`
///
/// # Parameters
/// * `root` - Root `.rst` file
/// * `ctx` - Run state, including the optional translation language
///
/// # Returns
/// * `Ok(Vec<String>)` - The whole document as one line sequence
/// * `Err(SourceTreeError)` - A referenced file, catalog or directive could not be resolved
pub fn flatten_tree(root: &Path, ctx: &mut FlattenContext) -> Result<Vec<String>, SourceTreeError> {
    flatten_file(root, 0, ctx)
}

/// Flatten one file whose outermost heading sits at `starting_level`
pub fn flatten_file(
    path: &Path,
    starting_level: usize,
    ctx: &mut FlattenContext,
) -> Result<Vec<String>, SourceTreeError> {
    let canonical = path.canonicalize().map_err(|source| SourceTreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if ctx.include_stack.contains(&canonical) {
        let chain = ctx
            .include_stack
            .iter()
            .chain(std::iter::once(&canonical))
            .map(|p| p.display().to_string())
            .join(" -> ");
        return Err(SourceTreeError::CircularInclude {
            path: path.to_path_buf(),
            chain,
        });
    }

    ctx.include_stack.push(canonical);
    let result = expand_file(path, starting_level, ctx);
    ctx.include_stack.pop();
    result
}

/// Read, translate, normalize and expand the directives of one file
fn expand_file(
    path: &Path,
    starting_level: usize,
    ctx: &mut FlattenContext,
) -> Result<Vec<String>, SourceTreeError> {
    log::info!("Flattening {} at level {}", path.display(), starting_level);
    ctx.files_flattened += 1;

    let content = fs::read_to_string(path).map_err(|source| SourceTreeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    if let Some(language) = ctx.language.clone() {
        lines = translate_file(&lines, path, &language)?;
    }

    let lines = normalize_headings(&lines, starting_level, path)?;

    let mut output = Vec::with_capacity(lines.len());
    let mut current_level = starting_level;
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        if let Some(depth) = underline_marker(line).and_then(marker_depth) {
            current_level = depth;
            output.push(line.clone());
            idx += 1;
        } else if is_directive(line, "toctree") {
            idx = expand_toctree(&lines, idx, current_level, path, ctx, &mut output)?;
        } else if is_directive(line, "include") {
            let target = directive_argument(line, "include").ok_or_else(|| {
                SourceTreeError::UnparsableDirective {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    content: line.clone(),
                }
            })?;
            log::debug!("{}: include {}", path.display(), target);
            output.extend(include_file(target, path, current_level, ctx)?);
            output.push(String::new());
            idx += 1;
        } else {
            output.push(line.clone());
            idx += 1;
        }
    }

    Ok(output)
}

/// Translate one file with the catalog next to it
fn translate_file(
    lines: &[String],
    path: &Path,
    language: &str,
) -> Result<Vec<String>, SourceTreeError> {
    let catalog_path = translation::catalog_path(path, language);
    if !catalog_path.is_file() {
        return Err(SourceTreeError::MissingTranslationCatalog {
            language: language.to_string(),
            file: path.to_path_buf(),
            catalog: catalog_path,
        });
    }
    let content = fs::read_to_string(&catalog_path).map_err(|source| SourceTreeError::Io {
        path: catalog_path.clone(),
        source,
    })?;
    let catalog = Catalog::parse(&content);
    log::debug!(
        "Loaded {} translations from {}",
        catalog.len(),
        catalog_path.display()
    );
    Ok(translation::translate_lines(lines, &catalog))
}

/// Resolve `reference` relative to `parent` and flatten it
fn include_file(
    reference: &str,
    parent: &Path,
    level: usize,
    ctx: &mut FlattenContext,
) -> Result<Vec<String>, SourceTreeError> {
    let dir = parent.parent().unwrap_or_else(|| Path::new(""));
    let target = dir.join(reference.trim());
    if !target.is_file() {
        return Err(SourceTreeError::MissingFile {
            path: target,
            referenced_from: parent.to_path_buf(),
        });
    }
    flatten_file(&target, level, ctx)
}

/// Expand the toctree starting at `start`, appending to `output`
///
/// Returns the index of the first line after the toctree's entry list.
fn expand_toctree(
    lines: &[String],
    start: usize,
    level: usize,
    parent: &Path,
    ctx: &mut FlattenContext,
    output: &mut Vec<String>,
) -> Result<usize, SourceTreeError> {
    let mut idx = start + 1;
    let mut level = level;

    if !ctx.toc_inserted {
        log::debug!("{}: inserting table of contents", parent.display());
        output.extend(raw_latex_block(&["\\tableofcontents", "\\newpage"]));
        ctx.toc_inserted = true;
    }

    let mut caption = None;
    while idx < lines.len() && !lines[idx].trim().is_empty() {
        if let Some((key, value)) = parse_option_line(&lines[idx]) {
            if key == "caption" {
                caption = Some(value.to_string());
            }
        }
        idx += 1;
    }
    idx += 1;

    if let Some(caption) = caption {
        let marker = HEADING_MARKERS.get(level).copied().ok_or_else(|| {
            SourceTreeError::HeadingDepthExceeded {
                path: parent.to_path_buf(),
                depth: level,
                max: HEADING_MARKERS.len(),
            }
        })?;
        output.push(String::new());
        output.push(caption.clone());
        output.push(underline_for(&caption, marker));
        output.push(String::new());
        level += 1;
    }

    while idx < lines.len() && !lines[idx].trim().is_empty() {
        let stem = lines[idx].trim();
        log::debug!("{}: toctree entry {}", parent.display(), stem);
        output.extend(include_file(&format!("{stem}.rst"), parent, level, ctx)?);
        output.push(String::new());
        idx += 1;
    }

    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn flatten(root: &Path) -> Result<Vec<String>, SourceTreeError> {
        let mut ctx = FlattenContext::new(None);
        flatten_tree(root, &mut ctx)
    }

    #[test]
    fn test_plain_file_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "index.rst", "Doc\n###\n\nSome text   \n\nPart\n****\n");
        let output = flatten(&root).unwrap();
        assert_eq!(output, vec!["Doc", "###", "", "Some text", "", "Part", "****"]);
    }

    #[test]
    fn test_include_splices_at_current_level() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "part.rst", "Part\n====\n\nBody\n");
        let root = write(
            dir.path(),
            "index.rst",
            "Doc\n###\n\nChapter\n*******\n\n.. include:: part.rst\nAfter\n",
        );
        let output = flatten(&root).unwrap();
        assert_eq!(
            output,
            vec![
                "Doc", "###", "", "Chapter", "*******", "", "Part", "****", "", "Body", "",
                "After"
            ]
        );
    }

    #[test]
    fn test_toctree_with_caption() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "intro.rst", "Intro\n-----\n\nHello\n");
        write(dir.path(), "sub/usage.rst", "Usage\n~~~~~\n");
        let root = write(
            dir.path(),
            "index.rst",
            "Doc\n###\n\n.. toctree::\n   :maxdepth: 2\n   :caption: Guide\n\n   intro\n   sub/usage\n\nEnd\n",
        );
        let output = flatten(&root).unwrap();
        let expected = vec![
            "",
            ".. raw:: latex",
            "",
            "    \\tableofcontents",
            "    \\newpage",
            "",
            "",
            "Guide",
            "#####",
            "",
            "Intro",
            "*****",
            "",
            "Hello",
            "",
            "Usage",
            "*****",
            "",
            "",
            "End",
        ];
        assert_eq!(&output[..3], &["Doc", "###", ""]);
        assert_eq!(&output[3..], expected.as_slice());
    }

    #[test]
    fn test_only_first_toctree_inserts_toc() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.rst", "A\n===\n\n.. toctree::\n\n   c\n");
        write(dir.path(), "b.rst", "B\n===\n");
        write(dir.path(), "c.rst", "C\n===\n");
        let root = write(
            dir.path(),
            "index.rst",
            "Doc\n###\n\n.. toctree::\n\n   a\n\n.. toctree::\n\n   b\n",
        );
        let mut ctx = FlattenContext::new(None);
        let output = flatten_tree(&root, &mut ctx).unwrap();
        assert!(ctx.toc_inserted());
        assert_eq!(ctx.files_flattened(), 4);
        let markers = output.iter().filter(|l| l.contains("\\tableofcontents")).count();
        assert_eq!(markers, 1);
        let toc = output.iter().position(|l| l.contains("\\tableofcontents")).unwrap();
        let first_entry = output.iter().position(|l| l == "A").unwrap();
        assert!(toc < first_entry);
    }

    #[test]
    fn test_missing_include_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "index.rst", ".. include:: nowhere.rst\n");
        let err = flatten(&root).unwrap_err();
        assert!(matches!(err, SourceTreeError::MissingFile { .. }));
    }

    #[test]
    fn test_missing_toctree_entry_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "index.rst", ".. toctree::\n\n   ghost\n");
        let err = flatten(&root).unwrap_err();
        assert!(matches!(err, SourceTreeError::MissingFile { .. }));
    }

    #[test]
    fn test_include_without_argument_is_unparsable() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "index.rst", "Text\n\n.. include::\n");
        match flatten(&root).unwrap_err() {
            SourceTreeError::UnparsableDirective { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_circular_include_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.rst", ".. include:: b.rst\n");
        write(dir.path(), "b.rst", ".. include:: a.rst\n");
        let root = write(dir.path(), "index.rst", ".. include:: a.rst\n");
        let err = flatten(&root).unwrap_err();
        assert!(matches!(err, SourceTreeError::CircularInclude { .. }));
    }

    #[test]
    fn test_same_file_may_be_included_twice() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "note.rst", "Note\n");
        let root = write(
            dir.path(),
            "index.rst",
            ".. include:: note.rst\n.. include:: note.rst\n",
        );
        let output = flatten(&root).unwrap();
        assert_eq!(output, vec!["Note", "", "Note", ""]);
    }

    #[test]
    fn test_translation_applies_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "locales/de/LC_MESSAGES/index.po",
            "msgid \"\"\nmsgstr \"\"\n\nmsgid \"Welcome\"\nmsgstr \"Willkommen\"\n",
        );
        let root = write(dir.path(), "index.rst", "Welcome\n=======\n");
        let mut ctx = FlattenContext::new(Some("de".to_string()));
        let output = flatten_tree(&root, &mut ctx).unwrap();
        assert_eq!(output, vec!["Willkommen", "##########"]);
    }

    #[test]
    fn test_missing_catalog_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "index.rst", "Welcome\n=======\n");
        let mut ctx = FlattenContext::new(Some("fr".to_string()));
        let err = flatten_tree(&root, &mut ctx).unwrap_err();
        assert!(matches!(err, SourceTreeError::MissingTranslationCatalog { .. }));
    }

    #[test]
    fn test_empty_language_means_no_translation() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "index.rst", "Welcome\n");
        let mut ctx = FlattenContext::new(Some(String::new()));
        assert_eq!(flatten_tree(&root, &mut ctx).unwrap(), vec!["Welcome"]);
    }
}
