//! envstamp
//!
//! Composes layered YAML configuration, validates it against a schema,
//! resolves `$$name$$` secret tokens, and renders a template tree into an
//! output directory.

use anyhow::Result;
use clap::Parser;
use envstamp::cli::render::{RenderArgs, SecretsBackend};
use envstamp::cli::show::{ShowArgs, ShowFormat};
use envstamp::cli::validate::ValidateArgs;
use envstamp::cli::{Cli, Command};
use envstamp::pipeline::Pipeline;
use envstamp::render::FunctionRegistry;
use envstamp::schema::JsonSchemaValidator;
use envstamp::secrets::{EnvDecryptor, ExampleDecryptor};
use std::fs::OpenOptions;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Command::Render(args) => run_render(args),
        Command::Validate(args) => run_validate(args),
        Command::Show(args) => run_show(args),
    }
}

/// Run the full pipeline
fn run_render(args: RenderArgs) -> Result<()> {
    let mut pipeline = Pipeline::new().with_functions(FunctionRegistry::standard());

    if let Some(ref schema) = args.schema {
        pipeline = pipeline.with_validator(JsonSchemaValidator::from_file(schema)?);
    }

    pipeline = match args.secrets {
        SecretsBackend::Skip => pipeline,
        SecretsBackend::Example => pipeline.with_decryptor(ExampleDecryptor),
        SecretsBackend::Env => {
            pipeline.with_decryptor(EnvDecryptor::new(args.env_prefix.clone()))
        }
    };

    let report = pipeline.run(&args.dirs())?;

    println!(
        "Rendered {} file(s) to {} ({} document(s) merged, {} secret(s) resolved)",
        report.files_rendered,
        args.output_dir.display(),
        report.documents,
        report.secrets_resolved,
    );
    Ok(())
}

/// Validate the merged configuration against a schema
fn run_validate(args: ValidateArgs) -> Result<()> {
    let validator = JsonSchemaValidator::from_file(&args.schema)?;
    let pipeline = Pipeline::new().with_validator(validator);
    let loaded = pipeline.validate_only(&args.base_dir, &args.overlay_dir)?;
    println!(
        "Configuration is valid ({} document(s) merged)",
        loaded.documents
    );
    Ok(())
}

/// Print the merged configuration
fn run_show(args: ShowArgs) -> Result<()> {
    let loaded = Pipeline::new().load_only(&args.base_dir, &args.overlay_dir)?;
    match args.format {
        ShowFormat::Yaml => print!("{}", serde_yaml::to_string(&loaded.tree)?),
        ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&loaded.tree)?),
    }
    Ok(())
}
