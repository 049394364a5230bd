use deckcheck_common::{check, Figure, LayoutSnapshot, SlideSnapshot, ViolationReport};
use serde_json::json;

/// Layout Rule Scenarios
///
/// Feeds hook-shaped JSON through decoding and checking, the same path a
/// live run takes, and asserts the exact violation lines.
#[test]
fn clean_single_figure_slide_has_no_violations() {
    let snapshot = LayoutSnapshot::from_value(json!({
        "slides": [{
            "index": 2, "title": "画像1枚", "overflow": 0,
            "figures": [{
                "inBounds": true, "captionText": "", "captionVisible": false,
                "captionGap": 0, "imgW": 200, "imgH": 150
            }]
        }]
    }))
    .expect("decode snapshot");

    let slide = snapshot.into_slide(2).expect("slide 2");
    assert!(check(&slide).is_empty());
}

#[test]
fn overflow_only_slide_reports_single_line() {
    let slide = SlideSnapshot::new("テキスト多め").with_overflow(5.0);
    assert_eq!(
        check(&slide).lines(),
        vec!["テキスト多め: overflow=5.0".to_string()]
    );
}

#[test]
fn broken_figures_across_slides_aggregate_in_order() {
    let slides = vec![
        SlideSnapshot::new("画像2枚")
            .with_figure(Figure::sized(300.0, 170.0))
            .with_figure(Figure {
                in_bounds: false,
                ..Figure::sized(100.0, 100.0)
            }),
        SlideSnapshot::new("画像3枚").with_figure(Figure {
            caption_text: "caption".to_string(),
            caption_visible: false,
            caption_gap: 12.0,
            ..Figure::sized(50.0, 20.0)
        }),
    ];

    let mut report = ViolationReport::new();
    for slide in &slides {
        report.merge(check(slide));
    }

    assert_eq!(
        report.lines(),
        vec![
            "画像2枚 fig#2: out of bounds",
            "画像3枚 fig#1: caption hidden",
            "画像3枚 fig#1: caption gap too large (12.0)",
            "画像3枚 fig#1: image too narrow (50.0 < 80)",
            "画像3枚 fig#1: image too short (20.0 < 45)",
        ]
    );
}
