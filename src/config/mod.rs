//! Layered configuration composition.
//!
//! A configuration is assembled from two directory trees of YAML documents:
//! a **base** tree holding shared defaults and an **overlay** tree holding
//! environment-specific overrides. Every document is deep-merged into a
//! single tree, field by field, with the overlay taking precedence.
//!
//! ## Merge strategy
//! - Mappings merge recursively, key by key
//! - Everything else (lists, scalars, explicit nulls) is replaced wholesale
//! - Document order is deterministic: siblings in file name order, base
//!   before overlay

mod loader;
mod merge;

pub use loader::{LoadedConfig, load_config_dirs};
pub use merge::{deep_merge, deep_merge_all};
