//! Configuration for pdf-to-speech.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for the platform settings-file location, and TOML persistence
//! via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, FallbackConfig, PiperConfig, StabilizeConfig, TranscodeConfig, WatchConfig,
};
