//! Error types for deckcheck-common

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding layout data reported by the page
#[derive(Error, Debug)]
pub enum Error {
    #[error("Snapshot decode error: {0}")]
    SnapshotDecode(#[from] serde_json::Error),

    #[error("Snapshot has no slides")]
    EmptySnapshot,

    #[error("Slide {index} not present in snapshot (found {found:?})")]
    SlideNotFound { index: u32, found: Vec<u32> },
}
