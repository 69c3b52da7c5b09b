//! Command-line interface definitions for rstprep

use clap::Parser;
use std::path::PathBuf;

/// CLI structure for the rstprep application
#[derive(Parser)]
#[command(name = "rstprep")]
#[command(version)]
#[command(
    about = "Flatten, translate and prepare a reStructuredText document tree for LaTeX",
    long_about = None
)]
pub struct Cli {
    /// Root .rst file of the document tree
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// File the processed document is written to
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Replacement for |AppName|
    #[arg(value_name = "APP_NAME")]
    pub app_name: String,

    /// Replacement for |version|
    #[arg(id = "doc_version", value_name = "VERSION")]
    pub version: String,

    /// Translate into this language using locales/<LANG>/LC_MESSAGES catalogs
    #[arg(short, long, value_name = "LANG")]
    pub translate: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Requested translation language, with an empty value meaning none
    pub fn language(&self) -> Option<&str> {
        self.translate.as_deref().filter(|l| !l.is_empty())
    }
}
