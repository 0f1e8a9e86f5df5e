//! Voice model catalog and resolution.
//!
//! A Piper voice is a pair of files: `<name>.onnx` (weights) and
//! `<name>.onnx.json` (config). [`VoiceCatalog`] maps short voice names to
//! the base URL both files live under; [`ModelResolver`] turns a configured
//! model name into a local `.onnx` path, downloading the pair on first use.
//!
//! The catalog is injected — there is no process-wide table — so embedders
//! and tests can supply their own mapping, and users can extend the built-in
//! set with a JSON file.

pub mod catalog;
pub mod resolver;

pub use catalog::VoiceCatalog;
pub use resolver::{ModelResolver, ResolveError};
