//! Per-document pipeline state machine.

// ---------------------------------------------------------------------------
// DocumentState
// ---------------------------------------------------------------------------

/// States a document moves through while being processed.
///
/// ```text
/// Pending ─▶ Stabilizing ─▶ Extracting ─▶ Synthesizing ─▶ Transcoding ─▶ Done
///                │              │              │              │
///                └──────────────┴──────────────┴──────────────┴─▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Queued, nothing has happened yet.
    Pending,

    /// Waiting for the file to become readable (a writer may still be
    /// copying it into the watch folder).
    Stabilizing,

    /// The PDF is being opened and its page texts drained.
    Extracting,

    /// Page-by-page speech synthesis is running.
    Synthesizing,

    /// The intermediate WAV is being transcoded to MP3.
    Transcoding,

    /// The MP3 exists and intermediates are cleaned up.
    Done,

    /// A terminal failure was reported for this document.
    Failed,
}

impl DocumentState {
    /// Returns `true` for the two states no document ever leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentState::Done | DocumentState::Failed)
    }

    /// A short human-readable label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentState::Pending => "Pending",
            DocumentState::Stabilizing => "Stabilizing",
            DocumentState::Extracting => "Extracting",
            DocumentState::Synthesizing => "Synthesizing",
            DocumentState::Transcoding => "Transcoding",
            DocumentState::Done => "Done",
            DocumentState::Failed => "Failed",
        }
    }
}

impl Default for DocumentState {
    fn default() -> Self {
        DocumentState::Pending
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
