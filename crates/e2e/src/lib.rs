//! deckcheck layout verification runner
//!
//! This crate drives a markdown slide deck in a real browser and checks the
//! rendered geometry:
//! - Serves the deck application from a local directory on an ephemeral port
//! - Launches an isolated headless Chromium and waits for the deck's test hooks
//! - Injects generated fixture decks and walks their slides one by one
//! - Extracts layout snapshots and checks them against layout invariants
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Layout Verification Runner                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── ContentServer::start(root) -> base_url               │
//! │    ├── Session::open(url) -> DeckHooks + RegionProbe        │
//! │    ├── ScenarioRunner::prepare(ratio, markdown)             │
//! │    ├── ScenarioRunner::verify(slides) -> [SlideResult]      │
//! │    └── ScenarioRunner::diagnose(slides) -> [Metrics]        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DeckHooks (window.__mdSlideViewerTest)                     │
//! │    ├── setAspectRatio(ratio)                                │
//! │    ├── loadMarkdown(document)                               │
//! │    ├── goToSlide(index)                                     │
//! │    └── getLayoutSnapshot(activeOnly)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod hooks;
pub mod report;
pub mod runner;
pub mod server;

pub use config::{BrowserConfig, DeckConfig, HarnessConfig, ServerConfig, TimingConfig};
pub use driver::{ChromeLauncher, Session, SessionLauncher};
pub use error::{E2eError, E2eResult};
pub use hooks::{DeckHooks, RegionProbe};
pub use report::{AlignmentReport, RunReport, SlideResult};
pub use runner::{ScenarioRunner, TestRunner};
pub use server::ContentServer;
