//! Arguments for the render command.

use crate::pipeline::PipelineDirs;
use crate::secrets::DEFAULT_ENV_PREFIX;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Secret decryption backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SecretsBackend {
    /// Leave `$$name$$` tokens untouched (default)
    #[default]
    Skip,
    /// Replace every token with a fixed placeholder
    Example,
    /// Read secrets from prefixed environment variables
    Env,
}

/// Arguments for the `render` command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Directory of base configuration documents
    #[arg(long, default_value = "data/base")]
    pub base_dir: PathBuf,

    /// Directory of overlay documents merged over the base
    #[arg(long, default_value = "data/overlays/dev")]
    pub overlay_dir: PathBuf,

    /// Directory of templates to render
    #[arg(long, default_value = "templates")]
    pub template_dir: PathBuf,

    /// Output directory (destroyed and rebuilt on every run)
    #[arg(short, long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Schema file to validate the merged tree against (validation is
    /// skipped when absent)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Secret decryption backend
    #[arg(long, value_enum, default_value_t = SecretsBackend::Skip)]
    pub secrets: SecretsBackend,

    /// Environment variable prefix for the `env` secrets backend
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
}

impl RenderArgs {
    /// Directories for the pipeline run.
    pub fn dirs(&self) -> PipelineDirs {
        PipelineDirs {
            base_dir: self.base_dir.clone(),
            overlay_dir: self.overlay_dir.clone(),
            template_dir: self.template_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}
