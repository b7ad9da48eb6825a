//! Configuration loading from layered directory trees.
//!
//! Walks a base directory and an overlay directory, parses every YAML
//! document, and folds them into a single merged tree. Overlay documents
//! merge after base documents, so the overlay wins at every shared key path.

use super::merge::deep_merge;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Result of composing one base/overlay directory pair.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration tree. The root is always a mapping.
    pub tree: Value,
    /// Number of documents that contributed to the tree.
    pub documents: usize,
}

/// Load and compose all configuration documents under `base_dir` and
/// `overlay_dir`.
///
/// Both directories are walked recursively with siblings visited in file
/// name order, so document precedence is deterministic: within a directory
/// later names override earlier ones, and every overlay document overrides
/// every base document. Files without a `.yaml` or `.yml` extension are
/// skipped. A document must have a mapping at its root; an empty document
/// merges as a no-op.
///
/// The pass never stops at the first bad input: unreadable or malformed
/// documents, and a missing or unreadable root directory, are all recorded
/// and reported together as [`Error::Documents`], so one run surfaces every
/// problem from both trees.
pub fn load_config_dirs(base_dir: &Path, overlay_dir: &Path) -> Result<LoadedConfig> {
    let mut documents = Vec::new();
    let mut errors = Vec::new();

    for dir in [base_dir, overlay_dir] {
        collect_documents(dir, &mut documents, &mut errors);
    }

    if !errors.is_empty() {
        return Err(Error::Documents { errors });
    }

    let count = documents.len();
    let tree = documents
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge);
    debug!(documents = count, "composed configuration tree");
    Ok(LoadedConfig {
        tree,
        documents: count,
    })
}

/// Walk one directory, parsing every document into `documents` and
/// recording failures in `errors`. A missing or non-directory root counts
/// as one error for that root; the caller still walks the other root.
fn collect_documents(dir: &Path, documents: &mut Vec<Value>, errors: &mut Vec<Error>) {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            let source =
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory");
            errors.push(Error::io(dir, source));
            return;
        }
        Err(source) => {
            errors.push(Error::io(dir, source));
            return;
        }
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                errors.push(walk_error(dir, err));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_yaml(path) {
            debug!(path = %path.display(), "skipping non-document file");
            continue;
        }
        match load_document(path) {
            Ok(Some(tree)) => {
                debug!(path = %path.display(), "loaded configuration document");
                documents.push(tree);
            }
            Ok(None) => {
                debug!(path = %path.display(), "empty document");
            }
            Err(err) => errors.push(err),
        }
    }
}

/// Parse one YAML document. Returns `None` for an empty document.
fn load_document(path: &Path) -> Result<Option<Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    // An empty document deserializes to `None`; any root other than a
    // mapping fails with a type error from the deserializer.
    let doc: Option<Map<String, Value>> =
        serde_yaml::from_str(&content).map_err(|source| Error::parse(path, source))?;
    Ok(doc.map(Value::Object))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base");
        let overlay = temp.path().join("overlay");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&overlay).unwrap();
        (temp, base, overlay)
    }

    #[test]
    fn test_overlay_overrides_base() {
        let (_temp, base, overlay) = setup();
        write(&base, "app.yaml", "image: api\nreplicas: 2\n");
        write(&overlay, "app.yaml", "replicas: 6\n");

        let loaded = load_config_dirs(&base, &overlay).unwrap();
        assert_eq!(loaded.tree, json!({"image": "api", "replicas": 6}));
        assert_eq!(loaded.documents, 2);
    }

    #[test]
    fn test_sibling_files_merge_in_name_order() {
        let (_temp, base, overlay) = setup();
        write(&base, "10-defaults.yaml", "tier: low\n");
        write(&base, "20-site.yaml", "tier: high\n");

        let loaded = load_config_dirs(&base, &overlay).unwrap();
        assert_eq!(loaded.tree, json!({"tier": "high"}));
    }

    #[test]
    fn test_subdirectories_are_recursed() {
        let (_temp, base, overlay) = setup();
        write(&base, "app.yaml", "name: api\n");
        write(&base, "db/primary.yaml", "db:\n  host: primary.internal\n");
        write(&overlay, "db/primary.yaml", "db:\n  pool: 20\n");

        let loaded = load_config_dirs(&base, &overlay).unwrap();
        assert_eq!(
            loaded.tree,
            json!({
                "name": "api",
                "db": {"host": "primary.internal", "pool": 20}
            })
        );
    }

    #[test]
    fn test_non_yaml_files_skipped() {
        let (_temp, base, overlay) = setup();
        write(&base, "app.yaml", "name: api\n");
        write(&base, "notes.txt", "not a document");
        write(&base, "README.md", "# readme");

        let loaded = load_config_dirs(&base, &overlay).unwrap();
        assert_eq!(loaded.tree, json!({"name": "api"}));
        assert_eq!(loaded.documents, 1);
    }

    #[test]
    fn test_empty_document_is_noop() {
        let (_temp, base, overlay) = setup();
        write(&base, "app.yaml", "name: api\n");
        write(&overlay, "empty.yaml", "");
        write(&overlay, "null.yaml", "null\n");

        let loaded = load_config_dirs(&base, &overlay).unwrap();
        assert_eq!(loaded.tree, json!({"name": "api"}));
        assert_eq!(loaded.documents, 1);
    }

    #[test]
    fn test_empty_dirs_give_empty_tree() {
        let (_temp, base, overlay) = setup();
        let loaded = load_config_dirs(&base, &overlay).unwrap();
        assert_eq!(loaded.tree, json!({}));
        assert_eq!(loaded.documents, 0);
    }

    #[test]
    fn test_missing_base_dir_reported_in_aggregate() {
        let temp = TempDir::new().unwrap();
        let overlay = temp.path().join("overlay");
        std::fs::create_dir_all(&overlay).unwrap();

        let err = load_config_dirs(&temp.path().join("missing"), &overlay).unwrap_err();
        match err {
            Error::Documents { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(errors[0], Error::Io { .. }), "got {:?}", errors[0]);
            }
            other => panic!("expected Documents error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_root_does_not_mask_file_errors() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base");
        std::fs::create_dir_all(&base).unwrap();
        write(&base, "broken.yaml", "name: [unterminated\n");

        // The malformed base document and the missing overlay root both
        // survive into one aggregate.
        let err = load_config_dirs(&base, &temp.path().join("missing")).unwrap_err();
        match err {
            Error::Documents { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(errors[0], Error::Parse { .. }), "got {:?}", errors[0]);
                assert!(matches!(errors[1], Error::Io { .. }), "got {:?}", errors[1]);
            }
            other => panic!("expected Documents error, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_root_rejected() {
        let (_temp, base, overlay) = setup();
        write(&base, "bad.yaml", "just a string\n");

        let err = load_config_dirs(&base, &overlay).unwrap_err();
        match err {
            Error::Documents { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(errors[0], Error::Parse { .. }));
            }
            other => panic!("expected Documents error, got {other:?}"),
        }
    }

    #[test]
    fn test_list_root_rejected() {
        let (_temp, base, overlay) = setup();
        write(&base, "bad.yaml", "- a\n- b\n");

        let err = load_config_dirs(&base, &overlay).unwrap_err();
        assert!(matches!(err, Error::Documents { .. }));
    }

    #[test]
    fn test_all_malformed_files_reported_together() {
        let (_temp, base, overlay) = setup();
        write(&base, "a.yaml", "key: [unclosed\n");
        write(&base, "b.yaml", "ok: true\n");
        write(&overlay, "c.yaml", "also: [bad\n");

        let err = load_config_dirs(&base, &overlay).unwrap_err();
        match err {
            Error::Documents { errors } => {
                assert_eq!(errors.len(), 2);
                let text = format!("{}", Error::Documents { errors });
                assert!(text.contains("a.yaml"));
                assert!(text.contains("c.yaml"));
            }
            other => panic!("expected Documents error, got {other:?}"),
        }
    }
}
