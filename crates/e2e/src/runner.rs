//! Scenario orchestration: content server, browser session, navigation and checks

use deckcheck_common::{check_figure_count, check_with, Fixture, Thresholds};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::{HarnessConfig, TimingConfig};
use crate::driver::{self, ChromeLauncher, SessionLauncher};
use crate::error::E2eResult;
use crate::extract;
use crate::hooks::{DeckHooks, RegionProbe};
use crate::report::{AlignmentReport, RunReport, SlideResult};
use crate::server::ContentServer;

/// Drives a loaded deck through a list of slides.
///
/// Works against any [`DeckHooks`] implementation; slides are processed one
/// at a time, never concurrently.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    timing: TimingConfig,
    thresholds: Thresholds,
}

impl ScenarioRunner {
    pub fn new(timing: TimingConfig, thresholds: Thresholds) -> Self {
        Self { timing, thresholds }
    }

    /// Configure the deck, inject the document and wait out the initial re-layout
    pub async fn prepare<H>(
        &self,
        hooks: &H,
        aspect_ratio: &str,
        document: &str,
        settle: Duration,
    ) -> E2eResult<()>
    where
        H: DeckHooks + ?Sized,
    {
        driver::configure(hooks, aspect_ratio).await?;
        driver::inject(hooks, document, settle).await
    }

    /// Extract and check each slide in order.
    ///
    /// With a fixture, each slide's figure count is also compared against the
    /// images authored on it.
    pub async fn verify<H>(
        &self,
        hooks: &H,
        slides: &[u32],
        fixture: Option<Fixture>,
    ) -> E2eResult<Vec<SlideResult>>
    where
        H: DeckHooks + ?Sized,
    {
        let settle = Duration::from_millis(self.timing.nav_settle_ms);
        let mut results = Vec::with_capacity(slides.len());

        for &index in slides {
            let snapshot = extract::snapshot(hooks, index, true, settle).await?;

            let mut violations = check_with(&snapshot, &self.thresholds);
            if let Some(expected) = fixture.and_then(|f| f.expected_figures(index)) {
                violations.merge(check_figure_count(&snapshot, expected));
            }

            if violations.is_empty() {
                info!("✓ slide {} {}", index, snapshot.title);
            } else {
                error!("✗ slide {} {} ({} violation(s))", index, snapshot.title, violations.len());
            }
            results.push(SlideResult::new(index, &snapshot, violations));
        }

        Ok(results)
    }

    /// Measure raw region geometry of each slide in order
    pub async fn diagnose<H>(
        &self,
        hooks: &H,
        slides: &[u32],
    ) -> E2eResult<Vec<deckcheck_common::ActiveSlideMetrics>>
    where
        H: DeckHooks + RegionProbe + ?Sized,
    {
        let settle = Duration::from_millis(self.timing.align_nav_settle_ms);
        let mut rows = Vec::with_capacity(slides.len());

        for &index in slides {
            match extract::measure_active(hooks, index, settle).await? {
                Some(metrics) => rows.push(metrics),
                None => warn!("slide {}: no active slide to measure", index),
            }
        }

        Ok(rows)
    }
}

/// Main layout verification runner.
///
/// Owns the content server and the browser session for each run and
/// releases both on every exit path.
pub struct TestRunner<L = ChromeLauncher> {
    config: HarnessConfig,
    scenario: ScenarioRunner,
    launcher: L,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self::with_launcher(config, ChromeLauncher)
    }
}

impl<L: SessionLauncher> TestRunner<L> {
    pub fn with_launcher(config: HarnessConfig, launcher: L) -> Self {
        let scenario = ScenarioRunner::new(config.timing.clone(), config.thresholds);
        Self {
            config,
            scenario,
            launcher,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Check the image-grid fixture on every image slide
    pub async fn run_render_check(&self) -> E2eResult<RunReport> {
        self.run_verification(Fixture::ImageGrid).await
    }

    /// Load `fixture` and check its target slides
    pub async fn run_verification(&self, fixture: Fixture) -> E2eResult<RunReport> {
        self.config.validate()?;
        let start = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();
        info!("Running layout verification: {}", fixture);

        let mut server = ContentServer::start(&self.config.server).await?;
        let outcome = self.verify_served(&server, fixture).await;
        server.stop().await;

        let slides = outcome?;
        let mut report = RunReport::new(fixture.name(), server.base_url(), started_at, slides);
        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.passed {
            info!("{}: {} slide(s) passed ({} ms)", fixture, report.slides.len(), report.duration_ms);
        } else {
            warn!("{}: {} violation(s)", fixture, report.violations().len());
        }
        Ok(report)
    }

    /// Load the alignment fixture and collect region diagnostics
    pub async fn run_alignment(&self) -> E2eResult<AlignmentReport> {
        self.config.validate()?;
        let fixture = Fixture::Alignment;
        let started_at = chrono::Utc::now().to_rfc3339();
        info!("Running alignment diagnostics: {}", fixture);

        let mut server = ContentServer::start(&self.config.server).await?;
        let outcome = self.diagnose_served(&server, fixture).await;
        server.stop().await;

        Ok(AlignmentReport {
            scenario: fixture.name().to_string(),
            started_at,
            rows: outcome?,
        })
    }

    async fn open_session(&self, server: &ContentServer) -> E2eResult<L::Session> {
        let url = server.url_for(&self.config.server.entry);
        let poll = Duration::from_millis(self.config.timing.ready_poll_ms.max(1));
        self.launcher.launch(&url, &self.config.browser, poll).await
    }

    async fn verify_served(
        &self,
        server: &ContentServer,
        fixture: Fixture,
    ) -> E2eResult<Vec<SlideResult>> {
        let session = self.open_session(server).await?;
        let outcome = async {
            let settle = Duration::from_millis(self.config.timing.load_settle_ms);
            self.scenario
                .prepare(&session, &self.config.deck.aspect_ratio, &fixture.markdown(), settle)
                .await?;
            self.scenario
                .verify(&session, &fixture.target_slides(), Some(fixture))
                .await
        }
        .await;
        self.launcher.close(session).await;
        outcome
    }

    async fn diagnose_served(
        &self,
        server: &ContentServer,
        fixture: Fixture,
    ) -> E2eResult<Vec<deckcheck_common::ActiveSlideMetrics>> {
        let session = self.open_session(server).await?;
        let outcome = async {
            let settle = Duration::from_millis(self.config.timing.align_load_settle_ms);
            self.scenario
                .prepare(&session, &self.config.deck.aspect_ratio, &fixture.markdown(), settle)
                .await?;
            self.scenario.diagnose(&session, &fixture.target_slides()).await
        }
        .await;
        self.launcher.close(session).await;
        outcome
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}
