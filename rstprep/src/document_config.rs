//! Preprocessor configuration from an optional TOML file

use crate::substitution::DEFAULT_TOC_HEADERS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Main preprocessor configuration
///
/// Every field has a default, so an empty file (or no file at all) yields the
/// built-in behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Heading titles rendered as unnumbered sections outside the hierarchy
    pub toc_headers: Vec<String>,

    /// Extra `|name|` placeholders replaced after `AppName` and `version`
    pub placeholders: BTreeMap<String, String>,

    /// Table rendering settings
    pub table: TableStyle,

    /// Figure rendering settings
    pub figure: FigureStyle,
}

/// LaTeX settings for lowered `csv-table` directives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    /// Total of the `widths` units that spans the full line width
    pub column_units: u32,

    /// Color name for even rows
    pub even_row_color: String,

    /// Color name for odd rows
    pub odd_row_color: String,

    /// Color name for the header row
    pub header_color: String,
}

/// LaTeX settings for lowered `figure` directives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    /// Value of the `width` key passed to `\includegraphics`
    pub width: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            toc_headers: DEFAULT_TOC_HEADERS.iter().map(|s| s.to_string()).collect(),
            placeholders: BTreeMap::new(),
            table: TableStyle::default(),
            figure: FigureStyle::default(),
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            column_units: 120,
            even_row_color: "table_even_row_color".to_string(),
            odd_row_color: "table_odd_row_color".to_string(),
            header_color: "table_header_color".to_string(),
        }
    }
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            width: "\\textwidth".to_string(),
        }
    }
}

impl DocumentConfig {
    /// Load configuration from a TOML file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DocumentConfig)` - Successfully loaded configuration
    /// * `Err(DocumentConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentConfigError> {
        let content = fs::read_to_string(&path).map_err(DocumentConfigError::IoError)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, DocumentConfigError> {
        let config: DocumentConfig = toml::from_str(content)?;
        if config.table.column_units == 0 {
            return Err(DocumentConfigError::InvalidValue(
                "table.column_units must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Errors that can occur when loading the configuration
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum DocumentConfigError {
    /// IO error when reading the file
    #[error("IO error: {0}")]
    IoError(#[source] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value is outside its allowed range
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
