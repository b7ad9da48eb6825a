//! Template rendering into a mirrored output tree.
//!
//! Every file under the template directory is treated as a template and
//! rendered against the final configuration tree; the result lands at the
//! same relative path under the output directory. Rendering is a batch
//! operation: the output directory is destroyed and rebuilt on every run,
//! so its contents always reflect exactly one template tree and one
//! configuration.

mod functions;

pub use functions::{FilterFn, FunctionRegistry, TemplateFn};

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;
use tera::{Context, Tera};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Renders a directory tree of templates against a configuration tree.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    functions: FunctionRegistry,
}

impl Renderer {
    /// Create a renderer with the given helper registry. The registry is
    /// installed into the engine before any template is parsed.
    pub fn new(functions: FunctionRegistry) -> Self {
        Self { functions }
    }

    /// Render every file under `template_dir` to its mirrored path under
    /// `output_dir`, returning the number of files written.
    ///
    /// The context must be a mapping; its keys become the top-level
    /// template variables. Files are visited in name order, directories
    /// are recreated as encountered, and no extension filtering is
    /// applied: every regular file is a template.
    ///
    /// The output directory is removed wholesale before rendering, so
    /// stale files never survive. The first parse, render, or I/O failure
    /// aborts the run; files written before the failure remain on disk and
    /// are cleaned up by the wipe at the start of the next run.
    pub fn render(&self, template_dir: &Path, output_dir: &Path, context: &Value) -> Result<usize> {
        let meta =
            std::fs::metadata(template_dir).map_err(|source| Error::io(template_dir, source))?;
        if !meta.is_dir() {
            let source = std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory");
            return Err(Error::io(template_dir, source));
        }

        match std::fs::remove_dir_all(output_dir) {
            Ok(()) => debug!(path = %output_dir.display(), "removed previous output directory"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(Error::io(output_dir, source)),
        }
        std::fs::create_dir_all(output_dir).map_err(|source| Error::io(output_dir, source))?;

        let mut tera = Tera::default();
        self.functions.install(&mut tera);
        let context = Context::from_serialize(context).map_err(|source| Error::TemplateExec {
            path: template_dir.to_path_buf(),
            source,
        })?;

        let mut rendered = 0;
        for entry in WalkDir::new(template_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|err| walk_error(template_dir, err))?;
            let path = entry.path();
            let relative = relative_to(path, template_dir)?;
            let target = output_dir.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target).map_err(|source| Error::io(&target, source))?;
                continue;
            }

            let name = relative.to_string_lossy();
            let source = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
            tera.add_raw_template(&name, &source)
                .map_err(|source| Error::TemplateParse {
                    path: path.to_path_buf(),
                    source,
                })?;
            let output = tera
                .render(&name, &context)
                .map_err(|source| Error::TemplateExec {
                    path: path.to_path_buf(),
                    source,
                })?;
            std::fs::write(&target, output).map_err(|source| Error::io(&target, source))?;
            debug!(template = %name, "rendered template");
            rendered += 1;
        }

        info!(files = rendered, output = %output_dir.display(), "rendered template tree");
        Ok(rendered)
    }
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root).map_err(|_| {
        let source =
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path escapes template root");
        Error::io(path, source)
    })
}

fn walk_error(dir: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    Error::Io { path, source }
}
