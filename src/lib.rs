//! PDF to Speech — narrate PDF documents into MP3 audio files.
//!
//! # Pipeline
//!
//! ```text
//! <input>/doc.pdf
//!     │
//!     ▼ pdf::LopdfParser              (per-page text, lazy)
//! ordered page texts + page count
//!     │
//!     ▼ tts::FallbackTts              (Piper primary, `say` fallback)
//!       └─ tts::PiperTts              (one engine process per page)
//!            └─ exec::TokioRunner     (spawn, stream stdin, exit code)
//! <output>/doc_parts/part_NNNN.wav
//!     │
//!     ▼ tts::PartsWorkspace           (ffmpeg concat demuxer, stream copy)
//! <output>/doc.wav
//!     │
//!     ▼ audio::FfmpegConverter        (transcode)
//! <output>/doc.mp3
//! ```
//!
//! The orchestration lives in [`pipeline::Processor`]; every external
//! collaborator sits behind an object-safe trait so the pipeline can be
//! unit-tested without Piper, ffmpeg or a real PDF on the machine.

pub mod audio;
pub mod config;
pub mod exec;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod report;
pub mod tts;
pub mod watch;
