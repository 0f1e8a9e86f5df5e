//! Voice-name → base-URL catalog.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

// ---------------------------------------------------------------------------
// VoiceCatalog
// ---------------------------------------------------------------------------

/// Maps short voice names (e.g. `"lessac-medium"`) to the base URL under
/// which `<base>.onnx` and `<base>.onnx.json` are published.
///
/// Ordered (`BTreeMap`) so error messages list voices deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceCatalog {
    entries: BTreeMap<String, String>,
}

const HF_VOICES: &str = "https://huggingface.co/rhasspy/piper-voices/resolve/main";

impl VoiceCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in set of English Piper voices.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            "lessac-medium",
            format!("{HF_VOICES}/en/en_US/lessac/medium/en_US-lessac-medium"),
        );
        catalog.insert(
            "lessac-high",
            format!("{HF_VOICES}/en/en_US/lessac/high/en_US-lessac-high"),
        );
        catalog.insert(
            "ryan-medium",
            format!("{HF_VOICES}/en/en_US/ryan/medium/en_US-ryan-medium"),
        );
        catalog.insert(
            "ryan-high",
            format!("{HF_VOICES}/en/en_US/ryan/high/en_US-ryan-high"),
        );
        catalog.insert(
            "alan-medium",
            format!("{HF_VOICES}/en/en_GB/alan/medium/en_GB-alan-medium"),
        );
        catalog.insert(
            "southern-low",
            format!(
                "{HF_VOICES}/en/en_GB/southern_english_female/low/en_GB-southern_english_female-low"
            ),
        );
        catalog
    }

    /// Load a `name → base URL` mapping from a JSON file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading voice catalog {}", path.display()))?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("parsing voice catalog {}", path.display()))?;
        Ok(Self { entries })
    }

    pub fn insert(&mut self, name: impl Into<String>, base_url: impl Into<String>) {
        self.entries.insert(name.into(), base_url.into());
    }

    /// Merge `other` over this catalog; entries in `other` win.
    pub fn merge(&mut self, other: VoiceCatalog) {
        self.entries.extend(other.entries);
    }

    pub fn base_url(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Known voice names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
