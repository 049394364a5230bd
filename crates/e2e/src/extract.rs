//! Layout snapshot extraction
//!
//! Navigation, settle and read always happen in that order: the deck
//! re-lays out the new slide on its own schedule (next frame plus timers), so
//! a read taken before the settle interval has elapsed sees stale geometry.

use deckcheck_common::{ActiveSlideMetrics, SlideSnapshot};
use std::time::Duration;
use tracing::debug;

use crate::error::E2eResult;
use crate::hooks::{DeckHooks, RegionProbe};

/// Navigate to `slide` (1-based), wait `settle`, and read its snapshot.
///
/// With `include_figures` false the figure list is dropped; overflow and
/// title are still reported.
pub async fn snapshot<H>(
    hooks: &H,
    slide: u32,
    include_figures: bool,
    settle: Duration,
) -> E2eResult<SlideSnapshot>
where
    H: DeckHooks + ?Sized,
{
    hooks.go_to_slide(slide).await?;
    tokio::time::sleep(settle).await;

    let mut snapshot = hooks.layout_snapshot(true).await?.into_slide(slide)?;
    if !include_figures {
        snapshot.figures.clear();
        snapshot.figure_count = 0;
    }

    debug!(
        slide,
        title = %snapshot.title,
        overflow = snapshot.overflow,
        figures = snapshot.figures.len(),
        "captured slide snapshot"
    );
    Ok(snapshot)
}

/// Navigate to `slide`, wait `settle`, and read raw region geometry.
/// Purely observational.
pub async fn measure_active<H>(
    hooks: &H,
    slide: u32,
    settle: Duration,
) -> E2eResult<Option<ActiveSlideMetrics>>
where
    H: DeckHooks + RegionProbe + ?Sized,
{
    hooks.go_to_slide(slide).await?;
    tokio::time::sleep(settle).await;
    hooks.measure_active().await
}
