//! External process invocation.
//!
//! # Overview
//!
//! [`CommandRunner`] is the single seam between this crate and the operating
//! system's processes. Everything that shells out — Piper, `say`, ffmpeg,
//! dependency probes — goes through it, which keeps every caller testable
//! with the in-memory `MockRunner`.
//!
//! The contract (deliberately thin):
//!
//! - a non-zero exit is **data**, not an error — callers inspect the code;
//! - `Err` is reserved for "the process could not be driven at all"
//!   (spawn failure, broken pipes other than early child exit);
//! - stdin is streamed line by line, with an optional callback after each
//!   written line so progress can advance in lockstep with the feed;
//! - stdout/stderr lines are forwarded to optional callbacks as they
//!   arrive, concurrently with the stdin feed.

pub mod runner;

pub use runner::{probe, CommandRunner, CommandSpec, ExecError, OutputSink, StdinFeed, TokioRunner};

#[cfg(test)]
pub use runner::{MockRunner, RecordedCall};
