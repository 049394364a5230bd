//! Deterministic deck fixtures
//!
//! Each [`Fixture`] renders to the same markdown on every call so a failing
//! layout can be reproduced exactly. Images are inlined as SVG data URLs;
//! nothing on disk is referenced.

use serde::{Deserialize, Serialize};

const LANDSCAPE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="960" height="540" viewBox="0 0 960 540">
  <rect width="960" height="540" rx="16" fill="#f8e5d5"/>
  <rect x="110" y="190" width="240" height="150" rx="14" fill="#fff" stroke="#c9b59a"/>
  <rect x="370" y="190" width="240" height="150" rx="14" fill="#fff" stroke="#c9b59a"/>
  <rect x="630" y="190" width="220" height="150" rx="14" fill="#fff" stroke="#c9b59a"/>
</svg>"##;

const PORTRAIT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="540" height="960" viewBox="0 0 540 960">
  <rect width="540" height="960" rx="24" fill="#f8e5d5"/>
  <rect x="70" y="120" width="400" height="720" rx="18" fill="#fff" stroke="#c9b59a"/>
</svg>"##;

/// Presentation metadata written under the deck title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckMeta {
    pub title: String,
    pub author: String,
    pub organization: String,
    pub position: String,
    pub date: String,
    pub footer: String,
}

/// One authored slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSlide {
    pub title: String,
    pub body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(String),
    Image { alt: String, src: String },
}

impl FixtureSlide {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: Vec::new(),
        }
    }

    fn text(mut self, line: impl Into<String>) -> Self {
        self.body.push(Block::Text(line.into()));
        self
    }

    fn image(mut self, alt: &str, src: &str) -> Self {
        self.body.push(Block::Image {
            alt: alt.to_string(),
            src: src.to_string(),
        });
        self
    }

    /// Number of images authored on this slide
    pub fn image_count(&self) -> usize {
        self.body
            .iter()
            .filter(|b| matches!(b, Block::Image { .. }))
            .count()
    }
}

/// Scenario selector for fixture generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fixture {
    /// Slides carrying one, two, three and four landscape images
    #[default]
    ImageGrid,
    /// Short text, many lines, overlong text and a tall image
    Alignment,
}

impl Fixture {
    pub fn name(&self) -> &'static str {
        match self {
            Fixture::ImageGrid => "image-grid",
            Fixture::Alignment => "alignment",
        }
    }

    pub fn meta(&self) -> DeckMeta {
        match self {
            Fixture::ImageGrid => DeckMeta {
                title: "Render Check".to_string(),
                author: "Test Bot".to_string(),
                organization: "QA".to_string(),
                position: "CI".to_string(),
                date: "2026-02-27".to_string(),
                footer: "Render Check Footer".to_string(),
            },
            Fixture::Alignment => DeckMeta {
                title: "Alignment Check".to_string(),
                author: "Bot".to_string(),
                organization: "QA".to_string(),
                position: "Test".to_string(),
                date: "2026-02-27".to_string(),
                footer: "Footer".to_string(),
            },
        }
    }

    /// Content slides in document order; deck slide `n + 2` is `slides()[n]`
    /// because the title slide comes first.
    pub fn slides(&self) -> Vec<FixtureSlide> {
        match self {
            Fixture::ImageGrid => {
                let src = svg_data_url(LANDSCAPE_SVG);
                vec![
                    FixtureSlide::new("画像1枚").image("img-1", &src),
                    FixtureSlide::new("画像2枚")
                        .image("img-2a", &src)
                        .image("img-2b", &src),
                    FixtureSlide::new("画像3枚")
                        .image("img-3a", &src)
                        .image("img-3b", &src)
                        .image("img-3c", &src),
                    FixtureSlide::new("画像4枚")
                        .image("img-4a", &src)
                        .image("img-4b", &src)
                        .image("img-4c", &src)
                        .image("img-4d", &src),
                ]
            }
            Fixture::Alignment => {
                let many = (1..=21).fold(FixtureSlide::new("テキスト多め"), |s, i| {
                    s.text(format!("- テキスト行 {i}"))
                });
                let overlong = (1..=60).fold(FixtureSlide::new("テキスト超過"), |s, i| {
                    s.text(format!(
                        "- 長い説明文 {i}: 表示領域の高さを超えるまで同じ幅の行を積み重ねます。"
                    ))
                });
                vec![
                    FixtureSlide::new("テキスト少なめ").text("短いテキストです。"),
                    many,
                    overlong,
                    FixtureSlide::new("縦長画像").image("縦長サンプル", &svg_data_url(PORTRAIT_SVG)),
                ]
            }
        }
    }

    /// 1-based deck slide indices the scenario inspects
    pub fn target_slides(&self) -> Vec<u32> {
        (0..self.slides().len() as u32).map(|i| i + 2).collect()
    }

    /// Images authored on the given 1-based deck slide
    pub fn expected_figures(&self, slide_index: u32) -> Option<usize> {
        match slide_index {
            0 => None,
            1 => Some(0),
            n => self
                .slides()
                .get(n as usize - 2)
                .map(FixtureSlide::image_count),
        }
    }

    /// Render the fixture document
    pub fn markdown(&self) -> String {
        render(&self.meta(), &self.slides())
    }
}

impl std::fmt::Display for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Render metadata and slides to deck markdown
pub fn render(meta: &DeckMeta, slides: &[FixtureSlide]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n", meta.title));
    out.push_str(&format!("- author: {}\n", meta.author));
    out.push_str(&format!("- organization: {}\n", meta.organization));
    out.push_str(&format!("- position: {}\n", meta.position));
    out.push_str(&format!("- date: {}\n", meta.date));
    out.push_str(&format!("- footer: {}\n", meta.footer));

    for slide in slides {
        out.push_str(&format!("\n## {}\n", slide.title));
        for block in &slide.body {
            match block {
                Block::Text(line) => out.push_str(line),
                Block::Image { alt, src } => out.push_str(&format!("![{alt}]({src})")),
            }
            out.push('\n');
        }
    }

    out
}

/// Inline an SVG document as a `data:` URL.
///
/// Every byte except ASCII alphanumerics and `-_.~` is percent-encoded, so the
/// URL survives markdown link parsing untouched.
pub fn svg_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;utf8,{}", urlencoding::encode(svg.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_is_deterministic() {
        for fixture in [Fixture::ImageGrid, Fixture::Alignment] {
            assert_eq!(fixture.markdown(), fixture.markdown());
        }
        assert_ne!(Fixture::ImageGrid.markdown(), Fixture::Alignment.markdown());
    }

    #[test]
    fn test_image_grid_layout() {
        let md = Fixture::ImageGrid.markdown();
        assert!(md.starts_with("# Render Check\n- author: Test Bot\n"));
        assert!(md.contains("- footer: Render Check Footer\n"));
        assert_eq!(md.matches("\n## ").count(), 4);
        assert_eq!(md.matches("![img-").count(), 10);

        let fixture = Fixture::ImageGrid;
        assert_eq!(fixture.target_slides(), vec![2, 3, 4, 5]);
        let counts: Vec<_> = fixture
            .target_slides()
            .into_iter()
            .map(|i| fixture.expected_figures(i))
            .collect();
        assert_eq!(counts, vec![Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(fixture.expected_figures(1), Some(0));
        assert_eq!(fixture.expected_figures(6), None);
    }

    #[test]
    fn test_alignment_layout() {
        let fixture = Fixture::Alignment;
        let slides = fixture.slides();
        assert_eq!(slides.len(), 4);
        assert_eq!(slides[1].body.len(), 21);
        assert!(slides[2].body.len() > slides[1].body.len());
        assert_eq!(fixture.expected_figures(5), Some(1));
        assert_eq!(fixture.target_slides(), vec![2, 3, 4, 5]);
        assert!(fixture.markdown().contains("\n## 縦長画像\n![縦長サンプル](data:image/svg+xml;utf8,"));
    }

    #[test]
    fn test_data_url_is_self_contained() {
        let url = svg_data_url(PORTRAIT_SVG);
        assert!(url.starts_with("data:image/svg+xml;utf8,%3Csvg%20xmlns%3D%22http%3A%2F%2F"));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
        assert!(!url.contains('('));
        assert!(!url.contains(')'));
        assert!(url.contains("%23f8e5d5"));
    }
}
