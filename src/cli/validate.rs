//! Arguments for the validate command.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory of base configuration documents
    #[arg(long, default_value = "data/base")]
    pub base_dir: PathBuf,

    /// Directory of overlay documents merged over the base
    #[arg(long, default_value = "data/overlays/dev")]
    pub overlay_dir: PathBuf,

    /// Schema file to validate the merged tree against
    #[arg(long)]
    pub schema: PathBuf,
}
