//! Speech synthesis.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TtsEngine (trait)                         │
//! │                                                             │
//! │  FallbackTts ──── primary ───▶ PiperTts                     │
//! │      │                          │  one process per page     │
//! │      │                          ▼                           │
//! │      │                    PartsWorkspace                    │
//! │      │                    part_0001.wav … → concat → .wav   │
//! │      │                                                      │
//! │      └──── on failure ──▶ SayTts (single `say` process)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All engines share one contract: synthesize the whole document's pages
//! into a single WAV file, advancing an optional progress sink once per
//! page. A document with no speakable text produces **no** output file and
//! is not an error; the pipeline detects that case afterwards.

pub mod engine;
pub mod fallback;
pub mod parts;
pub mod piper;
pub mod say;

pub use engine::{TtsEngine, TtsError};
pub use fallback::FallbackTts;
pub use parts::{PartArtifact, PartsWorkspace};
pub use piper::{locate_piper, PiperTts};
pub use say::SayTts;

#[cfg(test)]
pub use engine::{MockTts, MockTtsCall};
