//! Pipeline wiring: compose, validate, resolve, render.
//!
//! Each stage is a total function over the previous stage's output and the
//! first failure aborts the run. Validation and secret resolution are
//! optional stages, active only when the corresponding capability has been
//! injected; composition and rendering always run.

use crate::config::{self, LoadedConfig};
use crate::error::{Error, Result};
use crate::render::{FunctionRegistry, Renderer};
use crate::schema::SchemaValidator;
use crate::secrets::{self, Decryptor};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directories consumed and produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineDirs {
    pub base_dir: PathBuf,
    pub overlay_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Counters from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Configuration documents merged.
    pub documents: usize,
    /// Decrypt calls performed.
    pub secrets_resolved: usize,
    /// Template files written.
    pub files_rendered: usize,
}

/// The composition-validation-resolution-rendering pipeline.
#[derive(Default)]
pub struct Pipeline {
    validator: Option<Box<dyn SchemaValidator>>,
    decryptor: Option<Box<dyn Decryptor>>,
    functions: FunctionRegistry,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the merged tree before secrets are resolved.
    pub fn with_validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Resolve `$$name$$` tokens after validation has passed.
    pub fn with_decryptor(mut self, decryptor: impl Decryptor + 'static) -> Self {
        self.decryptor = Some(Box::new(decryptor));
        self
    }

    /// Helper registry handed to the renderer.
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Run the full pipeline.
    pub fn run(&self, dirs: &PipelineDirs) -> Result<PipelineReport> {
        let loaded = self.load_only(&dirs.base_dir, &dirs.overlay_dir)?;
        let mut tree = loaded.tree;

        self.validate_tree(&tree)?;

        let secrets_resolved = match self.decryptor.as_deref() {
            Some(decryptor) => {
                let resolved = secrets::resolve_secrets(&mut tree, decryptor)?;
                info!(resolved, "resolved secret tokens");
                resolved
            }
            None => 0,
        };

        let renderer = Renderer::new(self.functions.clone());
        let files_rendered = renderer.render(&dirs.template_dir, &dirs.output_dir, &tree)?;

        Ok(PipelineReport {
            documents: loaded.documents,
            secrets_resolved,
            files_rendered,
        })
    }

    /// Compose only: load and merge both directory trees. Secret tokens
    /// stay unresolved.
    pub fn load_only(&self, base_dir: &Path, overlay_dir: &Path) -> Result<LoadedConfig> {
        info!(
            base = %base_dir.display(),
            overlay = %overlay_dir.display(),
            "composing configuration"
        );
        let loaded = config::load_config_dirs(base_dir, overlay_dir)?;
        info!(documents = loaded.documents, "composed configuration tree");
        Ok(loaded)
    }

    /// Compose and validate, without resolving secrets or rendering.
    pub fn validate_only(&self, base_dir: &Path, overlay_dir: &Path) -> Result<LoadedConfig> {
        let loaded = self.load_only(base_dir, overlay_dir)?;
        self.validate_tree(&loaded.tree)?;
        Ok(loaded)
    }

    fn validate_tree(&self, tree: &Value) -> Result<()> {
        if let Some(validator) = &self.validator {
            validator
                .validate(tree)
                .map_err(|cause| Error::Validation { cause })?;
            info!("schema validation passed");
        }
        Ok(())
    }
}
