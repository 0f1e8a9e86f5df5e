//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// PiperConfig
// ---------------------------------------------------------------------------

/// Settings for the primary (Piper) synthesis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiperConfig {
    /// Piper executable — a bare name resolved via `PATH` or a full path.
    /// A working `./piper/piper` next to the binary takes precedence.
    pub path: String,
    /// Voice model name: a catalog alias (e.g. `"lessac-medium"`), a file
    /// name under the models directory, or a direct `.onnx` path.
    pub model: String,
    /// Speaker id for multi-speaker voices (`--speaker`); `None` for
    /// single-speaker models.
    pub speaker: Option<u32>,
}

impl Default for PiperConfig {
    fn default() -> Self {
        Self {
            path: "piper".into(),
            model: "lessac-medium".into(),
            speaker: None,
        }
    }
}

// ---------------------------------------------------------------------------
// FallbackConfig
// ---------------------------------------------------------------------------

/// Settings for the fallback synthesis engine (macOS `say`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Path to the `say` executable.
    pub say_path: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            say_path: "/usr/bin/say".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TranscodeConfig
// ---------------------------------------------------------------------------

/// Settings for WAV → MP3 transcoding and part concatenation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// ffmpeg executable — a bare name resolved via `PATH` or a full path.
    pub ffmpeg_path: String,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// WatchConfig
// ---------------------------------------------------------------------------

/// Settings for the input-directory monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between directory scans.
    pub poll_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { poll_secs: 2 }
    }
}

// ---------------------------------------------------------------------------
// StabilizeConfig
// ---------------------------------------------------------------------------

/// Bounded retry policy used while waiting for a newly arrived file to
/// become readable (e.g. still being copied into the watch folder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilizeConfig {
    /// Maximum open attempts before giving up on the file.
    pub attempts: u32,
    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for StabilizeConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use pdf_to_speech::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory watched for incoming PDF files.
    pub input_dir: PathBuf,
    /// Directory receiving the final MP3 (and transient WAV) files.
    pub output_dir: PathBuf,
    /// Directory holding downloaded voice models.
    pub models_dir: PathBuf,
    /// Optional JSON file of extra catalog entries (`name → base URL`),
    /// merged over the built-in voice catalog.
    pub catalog_file: Option<PathBuf>,
    /// Primary synthesis engine settings.
    pub piper: PiperConfig,
    /// Fallback synthesis engine settings.
    pub fallback: FallbackConfig,
    /// Transcoding settings.
    pub transcode: TranscodeConfig,
    /// Directory monitor settings.
    pub watch: WatchConfig,
    /// File-readiness retry policy.
    pub stabilize: StabilizeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            models_dir: PathBuf::from("models"),
            catalog_file: None,
            piper: PiperConfig::default(),
            fallback: FallbackConfig::default(),
            transcode: TranscodeConfig::default(),
            watch: WatchConfig::default(),
            stabilize: StabilizeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests and `--config`).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
