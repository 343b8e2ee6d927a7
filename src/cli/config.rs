//! TOML configuration file support.
//!
//! Settings for the validate command can live in a config file instead of
//! flags; flags given on the command line win:
//!
//! ```toml
//! # mztab.toml
//! [validation]
//! level = "warn"
//! max_errors = 500
//! mapping = "mzTab-M-mapping.xml"
//! ontology = "psi-ms.obo"
//! strict_terms = true
//! lookup_timeout_ms = 2000
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for mztab.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Configuration for the validate command.
#[derive(Debug, Default, Deserialize)]
pub struct ValidationConfig {
    /// Minimum diagnostic level: info, warn or error.
    pub level: Option<String>,

    /// Diagnostic capacity before the run is aborted.
    pub max_errors: Option<usize>,

    /// CV mapping rule file (XML or JSON).
    pub mapping: Option<PathBuf>,

    /// OBO ontology resolving term hierarchies.
    pub ontology: Option<PathBuf>,

    /// Report parameters outside a rule as errors.
    pub strict_terms: Option<bool>,

    /// Timeout for each term lookup, in milliseconds.
    pub lookup_timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
