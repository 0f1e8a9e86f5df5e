//! Document pipeline orchestration.
//!
//! # Architecture
//!
//! ```text
//! process_file(path)
//!        │
//!        ▼
//! Stabilizing   bounded open-retry loop (10 × 500 ms by default)
//!        ▼
//! Extracting    PdfParser::parse on the blocking pool, pages drained once
//!        ▼
//! Synthesizing  TtsEngine::generate → <output>/<basename>.wav
//!        ▼
//! Transcoding   AudioConverter::convert → <basename>.mp3, WAV deleted
//!        ▼
//! Done | Failed
//! ```
//!
//! Every error is caught at the `process_file` boundary and converted into
//! reporter output — a bad document can never take the host down or affect
//! other documents.

pub mod processor;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use processor::{FileProcessor, ProcessError, Processor, StabilizePolicy};
pub use state::DocumentState;

#[cfg(test)]
pub use processor::MockFileProcessor;
