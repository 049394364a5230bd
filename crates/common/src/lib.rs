//! deckcheck common library
//!
//! Browser-independent pieces of the layout harness: the slide snapshot
//! model, the layout invariant checker and the deck fixture generator.

pub mod error;
pub mod fixture;
pub mod invariants;
pub mod snapshot;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fixture::{svg_data_url, DeckMeta, Fixture, FixtureSlide};
pub use invariants::{
    check, check_figure_count, check_with, Thresholds, Violation, ViolationKind, ViolationReport,
};
pub use snapshot::{ActiveSlideMetrics, Figure, LayoutSnapshot, SlideSnapshot};

/// deckcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
