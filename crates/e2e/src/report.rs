//! Run results and their JSON output

use deckcheck_common::{ActiveSlideMetrics, SlideSnapshot, ViolationReport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{E2eError, E2eResult};

/// Outcome of checking one slide
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideResult {
    pub index: u32,
    pub title: String,
    pub overflow: f64,
    pub figure_count: usize,
    pub violations: ViolationReport,
}

impl SlideResult {
    pub fn new(index: u32, snapshot: &SlideSnapshot, violations: ViolationReport) -> Self {
        Self {
            index,
            title: snapshot.title.clone(),
            overflow: snapshot.overflow,
            figure_count: snapshot.figures.len(),
            violations,
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of a full layout verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub base_url: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub passed: bool,
    pub slides: Vec<SlideResult>,
}

impl RunReport {
    pub fn new(scenario: &str, base_url: &str, started_at: String, slides: Vec<SlideResult>) -> Self {
        let passed = slides.iter().all(SlideResult::passed);
        Self {
            scenario: scenario.to_string(),
            base_url: base_url.to_string(),
            started_at,
            duration_ms: 0,
            passed,
            slides,
        }
    }

    /// Every violation of the run, slide order then figure order
    pub fn violations(&self) -> ViolationReport {
        let mut all = ViolationReport::new();
        for slide in &self.slides {
            all.merge(slide.violations.clone());
        }
        all
    }

    /// Turn a failing report into [`E2eError::Violations`]
    pub fn into_result(self) -> E2eResult<Self> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(self)
        } else {
            Err(E2eError::Violations(violations))
        }
    }

    /// Write the report to `<dir>/deckcheck-<scenario>.json`
    pub fn write_to(&self, dir: &Path) -> E2eResult<PathBuf> {
        write_json(dir, &format!("deckcheck-{}.json", self.scenario), self)
    }
}

/// Alignment diagnostics for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub scenario: String,
    pub started_at: String,
    pub rows: Vec<ActiveSlideMetrics>,
}

impl AlignmentReport {
    /// Human-readable summary, one line per measured slide
    pub fn render(&self) -> String {
        let mut out = String::from("Alignment diagnostics:");
        for row in &self.rows {
            out.push_str(&format!("\n- {row}"));
        }
        out
    }

    pub fn write_to(&self, dir: &Path) -> E2eResult<PathBuf> {
        write_json(dir, &format!("deckcheck-{}.json", self.scenario), self)
    }
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckcheck_common::check;

    fn report_with(slides: Vec<SlideSnapshot>) -> RunReport {
        let results = slides
            .iter()
            .enumerate()
            .map(|(i, s)| SlideResult::new(i as u32 + 2, s, check(s)))
            .collect();
        RunReport::new("image-grid", "http://127.0.0.1:1", "2026-02-27T00:00:00Z".into(), results)
    }

    #[test]
    fn test_passing_report() {
        let report = report_with(vec![SlideSnapshot::new("a"), SlideSnapshot::new("b")]);
        assert!(report.passed);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_failing_report_carries_every_violation() {
        let report = report_with(vec![
            SlideSnapshot::new("a").with_overflow(4.0),
            SlideSnapshot::new("b"),
            SlideSnapshot::new("c").with_overflow(9.0),
        ]);
        assert!(!report.passed);

        match report.into_result() {
            Err(E2eError::Violations(v)) => {
                assert_eq!(v.lines(), vec!["a: overflow=4.0", "c: overflow=9.0"]);
            }
            other => panic!("expected violations, got {:?}", other.map(|r| r.passed)),
        }
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with(vec![SlideSnapshot::new("a").with_overflow(4.0)]);

        let path = report.write_to(&dir.path().join("out")).unwrap();
        assert!(path.ends_with("deckcheck-image-grid.json"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["slides"][0]["violations"][0]["rule"], "overflow");
    }

    #[test]
    fn test_alignment_render() {
        let report = AlignmentReport {
            scenario: "alignment".to_string(),
            started_at: String::new(),
            rows: vec![ActiveSlideMetrics {
                title: "テキスト少なめ".to_string(),
                ..Default::default()
            }],
        };
        assert_eq!(
            report.render(),
            "Alignment diagnostics:\n- テキスト少なめ: headerY=0.0, contentY=0.0, footerY=0.0, overflow=0.0, fit=none"
        );
    }
}
