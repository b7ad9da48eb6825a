//! Arguments for the show command.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Output format for the merged tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShowFormat {
    /// YAML document (default)
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Arguments for the `show` command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Directory of base configuration documents
    #[arg(long, default_value = "data/base")]
    pub base_dir: PathBuf,

    /// Directory of overlay documents merged over the base
    #[arg(long, default_value = "data/overlays/dev")]
    pub overlay_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = ShowFormat::Yaml)]
    pub format: ShowFormat,
}
