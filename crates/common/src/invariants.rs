//! Layout invariants
//!
//! Rules evaluated against a [`SlideSnapshot`]:
//!
//! | Rule               | Fails when                                   |
//! |--------------------|----------------------------------------------|
//! | slide overflow     | `overflow > max_overflow`                    |
//! | figure bounds      | `!in_bounds`                                 |
//! | caption visibility | caption text present and `!caption_visible`  |
//! | caption gap        | caption text present and gap > `max_caption_gap` |
//! | minimum width      | `img_w < min_img_w`                          |
//! | minimum height     | `img_h < min_img_h`                          |
//!
//! Every rule is evaluated independently; nothing short-circuits. Violations
//! come out slide first, then figures in document order numbered from 1.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::snapshot::SlideSnapshot;

/// Numeric limits for the layout rules, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_overflow: f64,
    pub max_caption_gap: f64,
    pub min_img_w: f64,
    pub min_img_h: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_overflow: 3.0,
            max_caption_gap: 10.0,
            min_img_w: 80.0,
            min_img_h: 45.0,
        }
    }
}

/// Which rule a violation broke, with the offending measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ViolationKind {
    Overflow { overflow: f64 },
    OutOfBounds,
    CaptionHidden,
    CaptionGap { gap: f64 },
    ImageTooNarrow { width: f64, min: f64 },
    ImageTooShort { height: f64, min: f64 },
    FigureCount { expected: usize, found: usize },
}

/// A single broken rule on a slide or one of its figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub slide: String,
    /// 1-based figure number, `None` for slide-level rules
    pub figure: Option<usize>,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    fn slide(slide: &SlideSnapshot, kind: ViolationKind) -> Self {
        Self {
            slide: slide.title.clone(),
            figure: None,
            kind,
        }
    }

    fn figure(slide: &SlideSnapshot, number: usize, kind: ViolationKind) -> Self {
        Self {
            slide: slide.title.clone(),
            figure: Some(number),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.figure {
            Some(n) => write!(f, "{} fig#{}: ", self.slide, n)?,
            None => write!(f, "{}: ", self.slide)?,
        }
        match &self.kind {
            ViolationKind::Overflow { overflow } => write!(f, "overflow={overflow:?}"),
            ViolationKind::OutOfBounds => write!(f, "out of bounds"),
            ViolationKind::CaptionHidden => write!(f, "caption hidden"),
            ViolationKind::CaptionGap { gap } => write!(f, "caption gap too large ({gap:?})"),
            ViolationKind::ImageTooNarrow { width, min } => {
                write!(f, "image too narrow ({width:?} < {min})")
            }
            ViolationKind::ImageTooShort { height, min } => {
                write!(f, "image too short ({height:?} < {min})")
            }
            ViolationKind::FigureCount { expected, found } => {
                write!(f, "expected {expected} figures, found {found}")
            }
        }
    }
}

/// Ordered collection of violations; empty means the layout passed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViolationReport(Vec<Violation>);

impl ViolationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    /// Append another report, keeping both orders
    pub fn merge(&mut self, other: ViolationReport) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// One line per violation, in report order
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Render checks failed:")?;
        for violation in &self.0 {
            write!(f, "\n- {violation}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ViolationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Violation> for ViolationReport {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Check a slide against the default thresholds
pub fn check(slide: &SlideSnapshot) -> ViolationReport {
    check_with(slide, &Thresholds::default())
}

/// Check a slide against explicit thresholds
pub fn check_with(slide: &SlideSnapshot, limits: &Thresholds) -> ViolationReport {
    let mut report = ViolationReport::new();

    if slide.overflow > limits.max_overflow {
        report.push(Violation::slide(
            slide,
            ViolationKind::Overflow {
                overflow: slide.overflow,
            },
        ));
    }

    for (i, fig) in slide.figures.iter().enumerate() {
        let n = i + 1;

        if !fig.in_bounds {
            report.push(Violation::figure(slide, n, ViolationKind::OutOfBounds));
        }
        if fig.has_caption() && !fig.caption_visible {
            report.push(Violation::figure(slide, n, ViolationKind::CaptionHidden));
        }
        if fig.has_caption() && fig.caption_gap > limits.max_caption_gap {
            report.push(Violation::figure(
                slide,
                n,
                ViolationKind::CaptionGap {
                    gap: fig.caption_gap,
                },
            ));
        }
        if fig.img_w < limits.min_img_w {
            report.push(Violation::figure(
                slide,
                n,
                ViolationKind::ImageTooNarrow {
                    width: fig.img_w,
                    min: limits.min_img_w,
                },
            ));
        }
        if fig.img_h < limits.min_img_h {
            report.push(Violation::figure(
                slide,
                n,
                ViolationKind::ImageTooShort {
                    height: fig.img_h,
                    min: limits.min_img_h,
                },
            ));
        }
    }

    if !report.is_empty() {
        tracing::debug!(slide = %slide.title, violations = report.len(), "layout rules failed");
    }

    report
}

/// Compare the rendered figure count with the number of images authored
pub fn check_figure_count(slide: &SlideSnapshot, expected: usize) -> ViolationReport {
    let found = slide.figures.len();
    if found == expected {
        return ViolationReport::new();
    }
    std::iter::once(Violation::slide(
        slide,
        ViolationKind::FigureCount { expected, found },
    ))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Figure;
    use test_case::test_case;

    fn captioned(text: &str, visible: bool, gap: f64) -> Figure {
        Figure {
            caption_text: text.to_string(),
            caption_visible: visible,
            caption_gap: gap,
            ..Figure::sized(200.0, 150.0)
        }
    }

    #[test]
    fn test_clean_slide_passes() {
        let slide = SlideSnapshot::new("Clean").with_figure(Figure {
            caption_visible: false,
            ..Figure::sized(200.0, 150.0)
        });
        assert!(check(&slide).is_empty());
    }

    #[test]
    fn test_overflow_message() {
        let slide = SlideSnapshot::new("Long").with_overflow(5.0);
        let report = check(&slide);
        assert_eq!(report.lines(), vec!["Long: overflow=5.0".to_string()]);
    }

    #[test_case(3.0, false ; "at limit passes")]
    #[test_case(3.1, true ; "just above fails")]
    #[test_case(0.0, false ; "zero passes")]
    fn test_overflow_threshold(overflow: f64, fails: bool) {
        let slide = SlideSnapshot::new("S").with_overflow(overflow);
        assert_eq!(!check(&slide).is_empty(), fails);
    }

    #[test]
    fn test_out_of_bounds_without_caption() {
        let slide = SlideSnapshot::new("Edge").with_figure(Figure {
            in_bounds: false,
            caption_visible: false,
            caption_gap: 50.0,
            ..Figure::sized(100.0, 100.0)
        });
        let report = check(&slide);
        assert_eq!(report.lines(), vec!["Edge fig#1: out of bounds".to_string()]);
    }

    #[test]
    fn test_all_figure_rules_reported_together() {
        let slide = SlideSnapshot::new("Tiny").with_figure(Figure {
            caption_text: "caption".to_string(),
            caption_visible: false,
            caption_gap: 12.0,
            ..Figure::sized(50.0, 20.0)
        });
        let report = check(&slide);
        assert_eq!(
            report.lines(),
            vec![
                "Tiny fig#1: caption hidden".to_string(),
                "Tiny fig#1: caption gap too large (12.0)".to_string(),
                "Tiny fig#1: image too narrow (50.0 < 80)".to_string(),
                "Tiny fig#1: image too short (20.0 < 45)".to_string(),
            ]
        );
    }

    #[test_case(false, 0.0 ; "hidden with no gap")]
    #[test_case(false, 99.0 ; "hidden with large gap")]
    #[test_case(true, 99.0 ; "visible with large gap")]
    fn test_empty_caption_never_checked(visible: bool, gap: f64) {
        let slide = SlideSnapshot::new("S").with_figure(captioned("", visible, gap));
        assert!(check(&slide).is_empty());
    }

    #[test_case(10.0, false ; "gap at limit")]
    #[test_case(10.5, true ; "gap above limit")]
    fn test_caption_gap_threshold(gap: f64, fails: bool) {
        let slide = SlideSnapshot::new("S").with_figure(captioned("c", true, gap));
        assert_eq!(!check(&slide).is_empty(), fails);
    }

    #[test_case(80.0, 45.0, 0 ; "exact minimum")]
    #[test_case(79.9, 45.0, 1 ; "narrow")]
    #[test_case(80.0, 44.9, 1 ; "short")]
    #[test_case(0.0, 0.0, 2 ; "collapsed")]
    fn test_minimum_image_size(w: f64, h: f64, expected: usize) {
        let slide = SlideSnapshot::new("S").with_figure(Figure::sized(w, h));
        assert_eq!(check(&slide).len(), expected);
    }

    #[test]
    fn test_figure_numbering_and_order() {
        let slide = SlideSnapshot::new("Grid")
            .with_overflow(8.5)
            .with_figure(Figure::sized(200.0, 150.0))
            .with_figure(Figure {
                in_bounds: false,
                ..Figure::sized(200.0, 150.0)
            })
            .with_figure(captioned("c3", false, 0.0));

        assert_eq!(
            check(&slide).lines(),
            vec![
                "Grid: overflow=8.5".to_string(),
                "Grid fig#2: out of bounds".to_string(),
                "Grid fig#3: caption hidden".to_string(),
            ]
        );
    }

    #[test]
    fn test_check_is_idempotent() {
        let slide = SlideSnapshot::new("Twice")
            .with_overflow(4.0)
            .with_figure(captioned("x", false, 30.0));
        assert_eq!(check(&slide), check(&slide));
    }

    #[test]
    fn test_custom_thresholds() {
        let limits = Thresholds {
            min_img_w: 300.0,
            ..Thresholds::default()
        };
        let slide = SlideSnapshot::new("S").with_figure(Figure::sized(200.0, 150.0));
        assert!(check(&slide).is_empty());
        assert_eq!(
            check_with(&slide, &limits).lines(),
            vec!["S fig#1: image too narrow (200.0 < 300)".to_string()]
        );
    }

    #[test]
    fn test_merge_keeps_slide_order() {
        let first = check(&SlideSnapshot::new("A").with_overflow(9.0));
        let second = check(&SlideSnapshot::new("B").with_overflow(7.0));

        let mut all = ViolationReport::new();
        all.merge(first);
        all.merge(second);

        assert_eq!(
            all.to_string(),
            "Render checks failed:\n- A: overflow=9.0\n- B: overflow=7.0"
        );
    }

    #[test]
    fn test_figure_count_mismatch() {
        let slide = SlideSnapshot::new("画像3枚")
            .with_figure(Figure::sized(200.0, 150.0))
            .with_figure(Figure::sized(200.0, 150.0));

        assert!(check_figure_count(&slide, 2).is_empty());
        assert_eq!(
            check_figure_count(&slide, 3).lines(),
            vec!["画像3枚: expected 3 figures, found 2".to_string()]
        );
    }

    #[test]
    fn test_report_serializes_as_list() {
        let report = check(&SlideSnapshot::new("J").with_overflow(6.0));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value[0]["rule"], "overflow");
        assert_eq!(value[0]["slide"], "J");
        assert_eq!(value[0]["overflow"], 6.0);
    }
}
