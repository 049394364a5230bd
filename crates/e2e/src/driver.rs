//! Render driver - owns the headless browser and the loaded deck page
//!
//! A [`Session`] is one isolated Chromium instance (fresh profile directory)
//! pointed at the content server's entry document. It implements
//! [`DeckHooks`] and [`RegionProbe`] by evaluating expressions in the page.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::js::EvaluationResult;
use chromiumoxide::Page;
use deckcheck_common::{ActiveSlideMetrics, LayoutSnapshot};
use futures::StreamExt;
use serde_json::json;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserConfig;
use crate::error::{E2eError, E2eResult};
use crate::hooks::{hook_call, DeckHooks, RegionProbe, MEASURE_ACTIVE_SCRIPT, READY_EXPRESSION};

/// A loaded deck page in its own browser process
pub struct Session {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Page,
    url: String,
    // Removed after the browser has exited.
    profile_dir: Option<TempDir>,
}

impl Session {
    /// Launch the browser, open `url` and block until the deck's hooks exist.
    ///
    /// Readiness is polled every `poll` up to `config.ready_timeout()`; running
    /// out of time is fatal for the run.
    pub async fn open(url: &str, config: &BrowserConfig, poll: Duration) -> E2eResult<Self> {
        let profile_dir = tempfile::Builder::new().prefix("deckcheck-profile-").tempdir()?;

        let mut builder = CdpBrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: config.viewport_width >= config.viewport_height,
                has_touch: false,
            })
            .user_data_dir(profile_dir.path());

        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(E2eError::BrowserConfig)?;

        info!(
            "Launching browser ({}x{}, headless: {})",
            config.viewport_width, config.viewport_height, config.headless
        );
        let (mut browser, mut handler) = Browser::launch(cdp_config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser.new_page(url).await;
        let mut session = match page {
            Ok(page) => Self {
                browser: Some(browser),
                handler: Some(handler),
                page,
                url: url.to_string(),
                profile_dir: Some(profile_dir),
            },
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(e.into());
            }
        };

        if let Err(e) = session.wait_until_ready(config.ready_timeout(), poll).await {
            session.close_inner().await;
            return Err(e);
        }

        info!("Deck ready at {}", url);
        Ok(session)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn wait_until_ready(&self, timeout: Duration, poll: Duration) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0usize;

        loop {
            attempts += 1;
            match self.is_ready().await {
                Ok(true) => {
                    debug!("deck hooks present after {} poll(s)", attempts);
                    return Ok(());
                }
                Ok(false) => {}
                // The page may still be navigating; keep polling until the deadline.
                Err(e) => debug!("readiness probe failed: {}", e),
            }

            if start.elapsed() >= timeout {
                return Err(E2eError::Timeout(format!(
                    "{} after {:?} ({} polls)",
                    READY_EXPRESSION, timeout, attempts
                )));
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Evaluate an expression in the page, returning its value by value
    async fn eval(&self, hook: &'static str, expression: String) -> E2eResult<EvaluationResult> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|reason| E2eError::Hook { hook, reason })?;

        self.page
            .evaluate_expression(params)
            .await
            .map_err(|e| E2eError::Hook {
                hook,
                reason: e.to_string(),
            })
    }

    /// Tear down the browser. Consumes the session, so it runs at most once.
    pub async fn close(mut self) {
        self.close_inner().await;
    }

    async fn close_inner(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("browser did not exit cleanly: {}", e);
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        if let Some(dir) = self.profile_dir.take() {
            if let Err(e) = dir.close() {
                warn!("failed to remove browser profile: {}", e);
            }
        }
        debug!("session for {} closed", self.url);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Only reached without `close` on a panic path; dropping the browser
        // kills its process.
        if self.browser.is_some() {
            warn!("session for {} dropped without close", self.url);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Opens and tears down deck sessions for a runner
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: DeckHooks + RegionProbe;

    /// Open `url` and block until the deck is ready
    async fn launch(
        &self,
        url: &str,
        config: &BrowserConfig,
        poll: Duration,
    ) -> E2eResult<Self::Session>;

    /// Release everything `launch` acquired
    async fn close(&self, session: Self::Session);
}

/// Launches an isolated headless Chromium per session
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = Session;

    async fn launch(&self, url: &str, config: &BrowserConfig, poll: Duration) -> E2eResult<Session> {
        Session::open(url, config, poll).await
    }

    async fn close(&self, session: Session) {
        session.close().await;
    }
}

/// Apply the deck aspect ratio. Must precede [`inject`].
pub async fn configure<H>(hooks: &H, aspect_ratio: &str) -> E2eResult<()>
where
    H: DeckHooks + ?Sized,
{
    debug!("setting aspect ratio {}", aspect_ratio);
    hooks.set_aspect_ratio(aspect_ratio).await
}

/// Load a markdown document and wait `settle` for the deck to re-lay out
pub async fn inject<H>(hooks: &H, document: &str, settle: Duration) -> E2eResult<()>
where
    H: DeckHooks + ?Sized,
{
    hooks.load_markdown(document).await?;
    debug!("injected {} bytes of markdown, settling {:?}", document.len(), settle);
    tokio::time::sleep(settle).await;
    Ok(())
}

#[async_trait]
impl DeckHooks for Session {
    async fn is_ready(&self) -> E2eResult<bool> {
        let result = self.eval("ready", READY_EXPRESSION.to_string()).await?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }

    async fn set_aspect_ratio(&self, ratio: &str) -> E2eResult<()> {
        self.eval("setAspectRatio", hook_call("setAspectRatio", &[json!(ratio)]))
            .await?;
        Ok(())
    }

    async fn load_markdown(&self, document: &str) -> E2eResult<()> {
        self.eval("loadMarkdown", hook_call("loadMarkdown", &[json!(document)]))
            .await?;
        Ok(())
    }

    async fn go_to_slide(&self, index: u32) -> E2eResult<()> {
        self.eval("goToSlide", hook_call("goToSlide", &[json!(index)]))
            .await?;
        Ok(())
    }

    async fn layout_snapshot(&self, active_only: bool) -> E2eResult<LayoutSnapshot> {
        let result = self
            .eval(
                "getLayoutSnapshot",
                hook_call("getLayoutSnapshot", &[json!(active_only)]),
            )
            .await?;
        let value = result.value().cloned().ok_or_else(|| E2eError::Hook {
            hook: "getLayoutSnapshot",
            reason: "returned undefined".to_string(),
        })?;
        Ok(LayoutSnapshot::from_value(value)?)
    }
}

#[async_trait]
impl RegionProbe for Session {
    async fn measure_active(&self) -> E2eResult<Option<ActiveSlideMetrics>> {
        let result = self
            .eval("measureActive", MEASURE_ACTIVE_SCRIPT.to_string())
            .await?;
        match result.value() {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }
}
