//! Five-stage preprocessing pipeline
//!
//! This module orchestrates the stages of one preprocessing run:
//! 1. **Flattening**: Resolve includes and toctrees, translating and normalizing each file
//! 2. **Substitution**: Replace `|AppName|`, `|version|` and configured placeholders
//! 3. **Heading inlining**: Turn table-of-contents headings into unnumbered sections
//! 4. **Parsing**: Build the element list from the flattened lines
//! 5. **Rendering**: Lower tables, figures and labels to raw LaTeX and write the output
//!
//! Every stage works in memory; the output file is only written once all
//! stages have succeeded.

use crate::document_config::{DocumentConfig, DocumentConfigError};
use crate::document_model::{parse_document, DocumentStats, Element};
use crate::latex_exporter::{serialize, RenderContext};
use crate::source_tree::{flatten_tree, FlattenContext, SourceTreeError};
use crate::substitution::{inline_toc_headers, replace_placeholder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder replaced by the application name
pub const APP_NAME_PLACEHOLDER: &str = "AppName";

/// Placeholder replaced by the version string
pub const VERSION_PLACEHOLDER: &str = "version";

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root `.rst` file
    pub input: PathBuf,
    /// File the processed document is written to
    pub output: PathBuf,
    /// Value for `|AppName|`
    pub app_name: String,
    /// Value for `|version|`
    pub version: String,
    /// Translation language; `None` or an empty string disables translation
    pub language: Option<String>,
    /// Loaded configuration
    pub config: DocumentConfig,
}

/// Facts about a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Number of files flattened into the document
    pub files_flattened: usize,
    /// Whether a table of contents was inserted
    pub toc_inserted: bool,
    /// Element counts of the parsed document
    pub stats: DocumentStats,
    /// Number of table footnotes in the document
    pub footnotes: u32,
    /// Number of lines written
    pub lines_written: usize,
}

/// Load the configuration file, or the defaults when none is given
///
/// # Parameters
/// * `path` - Optional path to a TOML configuration file
///
/// # Returns
/// * `Ok(DocumentConfig)` - Loaded or default configuration
/// * `Err(PipelineError)` - The file could not be read or parsed
pub fn load_config(path: Option<&Path>) -> Result<DocumentConfig, PipelineError> {
    match path {
        Some(path) => DocumentConfig::load(path)
            .map_err(|e| PipelineError::ConfigError(path.to_path_buf(), Box::new(e))),
        None => Ok(DocumentConfig::default()),
    }
}

/// Stage 1: Flatten the document tree
///
/// # Parameters
/// * `input` - Root `.rst` file
/// * `ctx` - Flattening state; holds the language and reports counts afterwards
///
/// # Returns
/// * `Ok(Vec<String>)` - The flattened line sequence
/// * `Err(PipelineError)` - A file, catalog or directive could not be resolved
pub fn flatten(input: &Path, ctx: &mut FlattenContext) -> Result<Vec<String>, PipelineError> {
    Ok(flatten_tree(input, ctx)?)
}

/// Stage 2: Replace placeholders
///
/// `|AppName|` is replaced first, then `|version|`, then the configured
/// placeholders in name order.
pub fn substitute<S: AsRef<str>>(
    lines: &[S],
    app_name: &str,
    version: &str,
    config: &DocumentConfig,
) -> Vec<String> {
    let mut lines = replace_placeholder(lines, APP_NAME_PLACEHOLDER, app_name);
    lines = replace_placeholder(&lines, VERSION_PLACEHOLDER, version);
    for (name, value) in &config.placeholders {
        lines = replace_placeholder(&lines, name, value);
    }
    lines
}

/// Stage 3: Inline the configured table-of-contents headings
pub fn inline_toc<S: AsRef<str>>(lines: &[S], config: &DocumentConfig) -> Vec<String> {
    inline_toc_headers(lines, &config.toc_headers)
}

/// Stage 4: Parse the processed lines into elements
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Vec<Element> {
    let elements = parse_document(lines);
    log::info!("Parsed {} elements", elements.len());
    elements
}

/// Stage 5a: Render elements into the output text
///
/// # Returns
/// * The output text and the render state after the last element
pub fn render(elements: &[Element], config: &DocumentConfig) -> (String, RenderContext) {
    let mut ctx = RenderContext::new(config.table.clone(), config.figure.clone());
    let text = serialize(elements, &mut ctx);
    (text, ctx)
}

/// Stage 5b: Write the output text
pub fn write_output(output: &Path, text: &str) -> Result<(), PipelineError> {
    std::fs::write(output, text).map_err(|e| PipelineError::OutputError(output.to_path_buf(), e))?;
    log::info!("Wrote {}", output.display());
    Ok(())
}

/// Progress reported by [`process_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent<'a> {
    /// A stage is about to run
    StageStarted {
        /// Stage number, from 1 up to [`STAGE_COUNT`]
        index: usize,
        /// What the stage does
        description: &'static str,
    },
    /// The document tree was flattened
    Flattened {
        /// Files read, the root included
        files: usize,
        /// Lines in the flattened document
        lines: usize,
    },
    /// Placeholders were replaced
    Substituted {
        /// Placeholder definitions applied
        placeholders: usize,
    },
    /// Table-of-contents headings were inlined
    TocInlined {
        /// Heading titles checked
        titles: usize,
    },
    /// The document was parsed
    Parsed {
        /// Number of elements
        elements: usize,
        /// Element counts by kind
        stats: &'a DocumentStats,
    },
    /// The output file was written
    Written {
        /// Path of the written file
        output: &'a Path,
        /// Table footnotes in the document
        footnotes: u32,
    },
}

/// Number of stages reported through [`PipelineEvent::StageStarted`]
pub const STAGE_COUNT: usize = 5;

/// Run all stages
///
/// # Parameters
/// * `options` - Input, output, placeholder values, language and configuration
///
/// # Returns
/// * `Ok(PipelineSummary)` - The output file was written
/// * `Err(PipelineError)` - A stage failed; the output file was not touched
pub fn process(options: &PipelineOptions) -> Result<PipelineSummary, PipelineError> {
    process_with(options, |_| {})
}

/// Run all stages, reporting progress to `on_event`
pub fn process_with<F>(
    options: &PipelineOptions,
    mut on_event: F,
) -> Result<PipelineSummary, PipelineError>
where
    F: FnMut(PipelineEvent<'_>),
{
    let config = &options.config;

    on_event(PipelineEvent::StageStarted {
        index: 1,
        description: "Flattening document tree",
    });
    let mut flatten_ctx = FlattenContext::new(options.language.clone());
    let lines = flatten(&options.input, &mut flatten_ctx)?;
    on_event(PipelineEvent::Flattened {
        files: flatten_ctx.files_flattened(),
        lines: lines.len(),
    });

    on_event(PipelineEvent::StageStarted {
        index: 2,
        description: "Replacing placeholders",
    });
    let lines = substitute(&lines, &options.app_name, &options.version, config);
    on_event(PipelineEvent::Substituted {
        placeholders: 2 + config.placeholders.len(),
    });

    on_event(PipelineEvent::StageStarted {
        index: 3,
        description: "Inlining table of contents headings",
    });
    let lines = inline_toc(&lines, config);
    on_event(PipelineEvent::TocInlined {
        titles: config.toc_headers.len(),
    });

    on_event(PipelineEvent::StageStarted {
        index: 4,
        description: "Parsing document",
    });
    let elements = parse(&lines);
    let stats = DocumentStats::collect(&elements);
    on_event(PipelineEvent::Parsed {
        elements: elements.len(),
        stats: &stats,
    });

    on_event(PipelineEvent::StageStarted {
        index: 5,
        description: "Rendering raw LaTeX",
    });
    let (text, render_ctx) = render(&elements, config);
    write_output(&options.output, &text)?;
    let footnotes = render_ctx.footnote_counter().value();
    on_event(PipelineEvent::Written {
        output: &options.output,
        footnotes,
    });

    Ok(PipelineSummary {
        files_flattened: flatten_ctx.files_flattened(),
        toc_inserted: flatten_ctx.toc_inserted(),
        stats,
        footnotes,
        lines_written: text.lines().count(),
    })
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document tree could not be flattened
    #[error("Error flattening document tree: {0}")]
    SourceTreeError(#[from] SourceTreeError),

    /// The configuration file could not be loaded
    #[error("Config error loading {path}: {source}", path = .0.display(), source = .1)]
    ConfigError(PathBuf, #[source] Box<DocumentConfigError>),

    /// The output file could not be written
    #[error("IO error writing {path}: {source}", path = .0.display(), source = .1)]
    OutputError(PathBuf, #[source] std::io::Error),
}
