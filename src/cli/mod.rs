//! CLI command definitions for envstamp
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod render;
pub mod show;
pub mod validate;

use clap::{Parser, Subcommand};
use render::RenderArgs;
use show::ShowArgs;
use validate::ValidateArgs;

/// Compose layered configuration, validate it, resolve secrets, and render templates
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline: compose, validate, resolve secrets, render
    Render(RenderArgs),

    /// Compose and validate the configuration without rendering
    Validate(ValidateArgs),

    /// Print the merged configuration tree
    Show(ShowArgs),
}
