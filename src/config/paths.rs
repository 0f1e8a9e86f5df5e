//! Cross-platform settings location using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + user voice catalog):
//!   Windows: %APPDATA%\pdf-to-speech\
//!   macOS:   ~/Library/Application Support/pdf-to-speech/
//!   Linux:   ~/.config/pdf-to-speech/
//!
//! Working directories (input/output/models) are configured in
//! `settings.toml` and default to cwd-relative paths.

use std::path::PathBuf;

/// Holds the resolved settings-file locations.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `voices.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default path for a user voice-catalog file (`voices.json`).
    pub catalog_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "pdf-to-speech";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let catalog_file = config_dir.join("voices.json");

        Self {
            config_dir,
            settings_file,
            catalog_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .catalog_file
            .file_name()
            .is_some_and(|n| n == "voices.json"));
    }
}
