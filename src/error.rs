//! Error types for the composition and rendering pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the pipeline stages.
///
/// Each variant corresponds to one failure category; variants carrying a
/// path identify the offending file. `Validation` and `Decrypt` wrap the
/// opaque errors of the injected capabilities.
#[derive(Debug, Error)]
pub enum Error {
    /// A file or directory could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid YAML or does not have a
    /// mapping at its root.
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// One or more configuration documents failed to load. The loader
    /// finishes its pass before reporting, so this carries every file-level
    /// error from the run.
    #[error("{} configuration document(s) failed to load:\n{}", .errors.len(), join_errors(.errors))]
    Documents { errors: Vec<Error> },

    /// The merged configuration was rejected by the schema validator.
    #[error("schema validation failed: {cause}")]
    Validation { cause: anyhow::Error },

    /// A secret token could not be decrypted. The token name is the text
    /// between the `$$` delimiters, passed verbatim to the backend.
    #[error("failed to decrypt secret '{name}': {cause}")]
    Decrypt { name: String, cause: anyhow::Error },

    /// A template file could not be parsed.
    #[error("{path}: {source}")]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// A template parsed but failed during rendering, e.g. a missing
    /// variable or a filter error.
    #[error("{path}: {source}")]
    TemplateExec {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
