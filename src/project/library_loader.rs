//! Loading the implicit supertype table from configuration files.
//!
//! A table file maps declaration kinds to roles and library paths:
//!
//! ```yaml
//! Feature:
//!   base: Base::things
//!   object: Objects::objects
//! Structure:
//!   base: Objects::Object
//! ```
//!
//! Files ending in `.yaml`/`.yml` are read as YAML, everything else as JSON.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::hir::ImplicitSupertypes;

/// Errors that can occur while loading a library table.
#[derive(Debug, Error)]
pub enum LibraryConfigError {
    /// IO error while reading the file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// File format of a library table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryFormat {
    Json,
    Yaml,
}

impl LibraryFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Reads and writes [`ImplicitSupertypes`] tables.
#[derive(Clone, Debug)]
pub struct LibraryLoader {
    path: PathBuf,
    format: LibraryFormat,
}

impl LibraryLoader {
    /// Create a loader for `path`, with the format chosen by extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = LibraryFormat::from_path(&path);
        Self { path, format }
    }

    /// Override the detected format.
    pub fn with_format(mut self, format: LibraryFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LibraryFormat {
        self.format
    }

    /// Read the table from disk.
    pub fn load(&self) -> Result<ImplicitSupertypes, LibraryConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| LibraryConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let table = Self::parse(&content, self.format)?;
        debug!(path = %self.path.display(), entries = table.len(), "library table loaded");
        Ok(table)
    }

    /// Write `table` to disk.
    pub fn save(&self, table: &ImplicitSupertypes) -> Result<(), LibraryConfigError> {
        let content = Self::render(table, self.format)?;
        std::fs::write(&self.path, content).map_err(|source| LibraryConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Parse a table from text.
    pub fn parse(
        content: &str,
        format: LibraryFormat,
    ) -> Result<ImplicitSupertypes, LibraryConfigError> {
        Ok(match format {
            LibraryFormat::Json => serde_json::from_str(content)?,
            LibraryFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Render a table as text.
    pub fn render(
        table: &ImplicitSupertypes,
        format: LibraryFormat,
    ) -> Result<String, LibraryConfigError> {
        Ok(match format {
            LibraryFormat::Json => serde_json::to_string_pretty(table)?,
            LibraryFormat::Yaml => serde_yaml::to_string(table)?,
        })
    }
}
