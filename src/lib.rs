//! envstamp library
//!
//! Building blocks of the composition pipeline: layered configuration
//! loading and merging, schema validation, secret token resolution, and
//! template rendering. The [`pipeline`] module wires the stages together;
//! the binary in `main.rs` is a thin CLI over it.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod secrets;
