//! Error types for layout verification runs

use deckcheck_common::ViolationReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Content server failed to start: {0}")]
    ServerStartup(String),

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Browser configuration error: {0}")]
    BrowserConfig(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Deck hook `{hook}` failed: {reason}")]
    Hook { hook: &'static str, reason: String },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] deckcheck_common::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Violations(ViolationReport),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl E2eError {
    /// Setup failures abort a run before any layout rule is evaluated
    pub fn is_setup_failure(&self) -> bool {
        !matches!(self, E2eError::Violations(_))
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        if self.is_setup_failure() {
            2
        } else {
            1
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
