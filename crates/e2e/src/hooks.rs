//! The deck application's test-hook contract
//!
//! The application under test exposes `window.__mdSlideViewerTest` once it has
//! booted. The harness only ever talks to the page through these traits, so a
//! drifting contract shows up as a typed [`E2eError::Hook`] instead of a
//! silently wrong measurement.
//!
//! [`E2eError::Hook`]: crate::error::E2eError::Hook

use async_trait::async_trait;
use deckcheck_common::{ActiveSlideMetrics, LayoutSnapshot};

use crate::error::E2eResult;

/// Global object the deck installs for tests
pub const HOOK_OBJECT: &str = "window.__mdSlideViewerTest";

/// Expression that is truthy once the hooks and the markdown parser exist
pub const READY_EXPRESSION: &str = "Boolean(window.__mdSlideViewerTest && window.marked)";

/// Operations the deck exposes for tests
#[async_trait]
pub trait DeckHooks: Send + Sync {
    /// Whether the hook object and the markdown dependency are both present
    async fn is_ready(&self) -> E2eResult<bool>;

    /// `setAspectRatio(ratio)`; must precede content injection
    async fn set_aspect_ratio(&self, ratio: &str) -> E2eResult<()>;

    /// `loadMarkdown(document)`; re-layout continues asynchronously
    async fn load_markdown(&self, document: &str) -> E2eResult<()>;

    /// `goToSlide(index)` with a 1-based index; re-layout continues asynchronously
    async fn go_to_slide(&self, index: u32) -> E2eResult<()>;

    /// `getLayoutSnapshot(activeOnly)`
    async fn layout_snapshot(&self, active_only: bool) -> E2eResult<LayoutSnapshot>;
}

/// Raw region geometry of the rendered page, outside the hook contract
#[async_trait]
pub trait RegionProbe: Send + Sync {
    /// Measure the active slide's header, content and footer boxes.
    /// `None` when no slide is active.
    async fn measure_active(&self) -> E2eResult<Option<ActiveSlideMetrics>>;
}

/// Build `window.__mdSlideViewerTest.<method>(<args>)` with JSON-encoded arguments
pub fn hook_call(method: &str, args: &[serde_json::Value]) -> String {
    let args = args
        .iter()
        .map(serde_json::Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{HOOK_OBJECT}.{method}({args})")
}

/// Script returning the active slide's region geometry, or `null`
pub const MEASURE_ACTIVE_SCRIPT: &str = r#"(() => {
  const slide = document.querySelector('.slide.is-active');
  if (!slide) return null;
  const box = (el) => el ? el.getBoundingClientRect() : null;
  const header = slide.querySelector('.slide__header');
  const footer = slide.querySelector('.slide__footer');
  const content = slide.querySelector('.slide__content');
  const s = slide.getBoundingClientRect();
  const h = box(header);
  const f = box(footer);
  const c = box(content);
  return {
    title: slide.querySelector('.slide__header h2')?.textContent || '',
    slideTop: s.top,
    slideBottom: s.bottom,
    headerTopFromSlide: h ? h.top - s.top : 0,
    footerTopFromSlide: f ? f.top - s.top : 0,
    contentTopFromSlide: c ? c.top - s.top : 0,
    contentHeight: c ? c.height : 0,
    contentScrollHeight: content ? content.scrollHeight : 0,
    contentOverflow: content ? Math.max(0, content.scrollHeight - content.clientHeight) : 0,
    fitClasses: Array.from(slide.classList).filter((name) => name.startsWith('fit-')),
  };
})()"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hook_call_encodes_arguments() {
        assert_eq!(
            hook_call("goToSlide", &[json!(3)]),
            "window.__mdSlideViewerTest.goToSlide(3)"
        );
        assert_eq!(
            hook_call("getLayoutSnapshot", &[json!(true)]),
            "window.__mdSlideViewerTest.getLayoutSnapshot(true)"
        );
    }

    #[test]
    fn test_hook_call_escapes_markdown() {
        let doc = "# T\n\n## It's \"quoted\"\n`code` ${x}";
        let call = hook_call("loadMarkdown", &[json!(doc)]);
        assert_eq!(
            call,
            r##"window.__mdSlideViewerTest.loadMarkdown("# T\n\n## It's \"quoted\"\n`code` ${x}")"##
        );
        assert!(!call.contains('\n'));
    }
}
