//! Error types for flattening a source tree

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort flattening of the document tree
#[derive(Error, Debug)]
pub enum SourceTreeError {
    /// A file could not be read
    #[error("IO error reading {path}: {source}", path = .path.display())]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// An `include` or `toctree` entry points at a file that does not exist
    #[error(
        "Referenced file {path} does not exist (referenced from {parent})",
        path = .path.display(),
        parent = .referenced_from.display()
    )]
    MissingFile {
        /// Resolved path of the missing file
        path: PathBuf,
        /// File containing the directive
        referenced_from: PathBuf,
    },

    /// A translation was requested but the catalog file is missing
    #[error(
        "Translation '{language}' for {file} does not exist at {catalog}",
        file = .file.display(),
        catalog = .catalog.display()
    )]
    MissingTranslationCatalog {
        /// Requested language code
        language: String,
        /// File being translated
        file: PathBuf,
        /// Expected catalog location
        catalog: PathBuf,
    },

    /// A directive line does not match its grammar
    #[error("Could not parse directive in {path} line {line}: {content}", path = .path.display())]
    UnparsableDirective {
        /// File containing the directive
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// The offending line
        content: String,
    },

    /// A file includes itself, directly or through other files
    #[error("Circular include of {path}: {chain}", path = .path.display())]
    CircularInclude {
        /// File that was entered a second time
        path: PathBuf,
        /// The include chain, outermost first, joined with ` -> `
        chain: String,
    },

    /// Heading levels ran past the last marker of the heading alphabet
    #[error(
        "Heading depth {depth} in {path} exceeds the {max} available heading levels",
        path = .path.display()
    )]
    HeadingDepthExceeded {
        /// File whose headings overflowed
        path: PathBuf,
        /// Requested 0-based depth
        depth: usize,
        /// Number of available levels
        max: usize,
    },
}
