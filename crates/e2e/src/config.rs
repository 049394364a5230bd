//! Harness configuration
//!
//! Defaults reproduce the reference scenarios. A TOML file may override any
//! subset of fields; command-line flags are applied on top by the binary.

use deckcheck_common::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Complete harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub timing: TimingConfig,
    pub deck: DeckConfig,
    pub thresholds: Thresholds,
}

impl HarnessConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(text: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(E2eError::Config(format!(
                "viewport must be non-empty, got {}x{}",
                self.browser.viewport_width, self.browser.viewport_height
            )));
        }
        if self.browser.ready_timeout_ms == 0 {
            return Err(E2eError::Config("ready_timeout_ms must be positive".to_string()));
        }
        if !is_aspect_ratio(&self.deck.aspect_ratio) {
            return Err(E2eError::Config(format!(
                "aspect_ratio must look like W:H, got {:?}",
                self.deck.aspect_ratio
            )));
        }
        Ok(())
    }
}

fn is_aspect_ratio(value: &str) -> bool {
    let mut parts = value.split(':');
    let ok = |p: Option<&str>| p.and_then(|s| s.trim().parse::<u32>().ok()).is_some_and(|n| n > 0);
    ok(parts.next()) && ok(parts.next()) && parts.next().is_none()
}

/// Ephemeral content server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory holding the deck application (index.html and assets)
    pub root_dir: PathBuf,

    /// Loopback host to bind
    pub host: String,

    /// Port to listen on (None = OS-assigned)
    pub port: Option<u16>,

    /// Entry document requested by the browser
    pub entry: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            host: "127.0.0.1".to_string(),
            port: None,
            entry: "index.html".to_string(),
        }
    }
}

/// Rendering surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,

    /// Chrome sandboxing; containers running as root usually need it off
    pub sandbox: bool,

    /// Explicit Chrome/Chromium binary (None = auto-detect)
    pub chrome_executable: Option<PathBuf>,

    /// How long to wait for the deck's test hooks to appear
    pub ready_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            headless: true,
            sandbox: true,
            chrome_executable: None,
            ready_timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

/// Settle intervals waited out after asynchronous re-layout triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// After `loadMarkdown`
    pub load_settle_ms: u64,

    /// After `goToSlide` in the render check
    pub nav_settle_ms: u64,

    /// After `loadMarkdown` in the alignment diagnostics
    pub align_load_settle_ms: u64,

    /// After `goToSlide` in the alignment diagnostics
    pub align_nav_settle_ms: u64,

    /// Readiness poll interval
    pub ready_poll_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            load_settle_ms: 500,
            nav_settle_ms: 250,
            align_load_settle_ms: 600,
            align_nav_settle_ms: 350,
            ready_poll_ms: 50,
        }
    }
}

impl TimingConfig {
    /// Zero every settle interval; for in-process fakes that re-layout synchronously
    pub fn immediate() -> Self {
        Self {
            load_settle_ms: 0,
            nav_settle_ms: 0,
            align_load_settle_ms: 0,
            align_nav_settle_ms: 0,
            ready_poll_ms: 1,
        }
    }
}

/// Deck settings applied before content injection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub aspect_ratio: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
        }
    }
}
