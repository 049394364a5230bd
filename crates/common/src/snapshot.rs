//! Layout snapshot types
//!
//! These mirror the objects returned by the deck's introspection hook
//! (`getLayoutSnapshot`) and by the raw region probe. The page is dynamically
//! typed, so numeric fields are coerced on the way in: numbers and numeric
//! strings become `f64`, `null` or missing values become `0.0`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Everything the introspection hook returned for one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSnapshot {
    pub slides: Vec<SlideSnapshot>,
}

impl LayoutSnapshot {
    /// Decode a snapshot from the JSON value handed back by the page
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Select the slide with the given 1-based index.
    ///
    /// The reported index must match: a navigation that did not take effect
    /// leaves another slide active, and its geometry is not the one asked for.
    pub fn into_slide(self, index: u32) -> Result<SlideSnapshot> {
        let mut slides = self.slides;
        if slides.is_empty() {
            return Err(Error::EmptySnapshot);
        }

        match slides.iter().position(|s| s.index == index) {
            Some(pos) => Ok(slides.swap_remove(pos)),
            None => {
                let found: Vec<u32> = slides.iter().map(|s| s.index).collect();
                tracing::warn!(requested = index, ?found, "requested slide is not active");
                Err(Error::SlideNotFound { index, found })
            }
        }
    }
}

/// Point-in-time geometry of one rendered slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlideSnapshot {
    /// 1-based slide index as reported by the deck
    #[serde(deserialize_with = "lenient_u32")]
    pub index: u32,

    #[serde(deserialize_with = "lenient_string")]
    pub title: String,

    /// Content scroll overflow in pixels
    #[serde(deserialize_with = "lenient_f64")]
    pub overflow: f64,

    #[serde(deserialize_with = "lenient_u32")]
    pub figure_count: u32,

    pub figures: Vec<Figure>,
}

impl SlideSnapshot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_overflow(mut self, overflow: f64) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_figure(mut self, figure: Figure) -> Self {
        self.figures.push(figure);
        self.figure_count = self.figures.len() as u32;
        self
    }
}

/// Rendered state of one image figure within a slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Figure {
    #[serde(deserialize_with = "lenient_bool")]
    pub in_bounds: bool,

    #[serde(deserialize_with = "lenient_string")]
    pub caption_text: String,

    #[serde(deserialize_with = "lenient_bool")]
    pub caption_visible: bool,

    /// Vertical distance between the image bottom and the caption top
    #[serde(deserialize_with = "lenient_f64")]
    pub caption_gap: f64,

    #[serde(rename = "imgW", deserialize_with = "lenient_f64")]
    pub img_w: f64,

    #[serde(rename = "imgH", deserialize_with = "lenient_f64")]
    pub img_h: f64,

    #[serde(rename = "figureW", deserialize_with = "lenient_f64")]
    pub figure_w: f64,

    #[serde(rename = "figureH", deserialize_with = "lenient_f64")]
    pub figure_h: f64,

    #[serde(rename = "captionH", deserialize_with = "lenient_f64")]
    pub caption_h: f64,
}

impl Figure {
    /// An in-bounds, uncaptioned figure of the given image size
    pub fn sized(img_w: f64, img_h: f64) -> Self {
        Self {
            in_bounds: true,
            img_w,
            img_h,
            figure_w: img_w,
            figure_h: img_h,
            ..Default::default()
        }
    }

    pub fn has_caption(&self) -> bool {
        !self.caption_text.is_empty()
    }
}

/// Raw region geometry of the active slide, for alignment diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActiveSlideMetrics {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub slide_top: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub slide_bottom: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub header_top_from_slide: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub footer_top_from_slide: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub content_top_from_slide: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub content_height: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub content_scroll_height: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub content_overflow: f64,
    pub fit_classes: Vec<String>,
}

impl std::fmt::Display for ActiveSlideMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fit = if self.fit_classes.is_empty() {
            "none".to_string()
        } else {
            self.fit_classes.join(",")
        };
        write!(
            f,
            "{}: headerY={:.1}, contentY={:.1}, footerY={:.1}, overflow={:.1}, fit={}",
            self.title,
            self.header_top_from_slide,
            self.content_top_from_slide,
            self.footer_top_from_slide,
            self.content_overflow,
            fit
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Flag(bool),
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Number(n)) if n.is_finite() => n,
        Some(Loose::Text(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0),
        Some(Loose::Flag(b)) => f64::from(u8::from(b)),
        _ => 0.0,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = lenient_f64(deserializer)?;
    Ok(if n <= 0.0 { 0 } else { n.min(u32::MAX as f64) as u32 })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Flag(b)) => b,
        Some(Loose::Number(n)) => n != 0.0,
        Some(Loose::Text(s)) => s == "true",
        None => false,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Text(s)) => s,
        Some(Loose::Number(n)) => n.to_string(),
        Some(Loose::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}
