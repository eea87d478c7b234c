//! Error taxonomy shared by the engine and its collaborators.

use thiserror::Error;

/// Raised when a word sequence cannot back a reading session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum DocumentError {
    #[error("document contains no words")]
    Empty,
}

/// Failures while turning a source file into words and chapters.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum IngestError {
    #[error("document contains no words")]
    Empty,

    #[error("unsupported document format: {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("document has no readable content (protected or empty)")]
    ProtectedContent,
}

impl From<DocumentError> for IngestError {
    fn from(value: DocumentError) -> Self {
        match value {
            DocumentError::Empty => Self::Empty,
        }
    }
}

/// Durable storage failures. Progress writes are best-effort, so callers log
/// these instead of propagating them into playback.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Audio cue could not be produced; the tick is skipped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Unavailable,
}

/// Screen wake lock could not be changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum WakeLockError {
    #[error("wake lock unsupported on this platform")]
    Unsupported,
}
