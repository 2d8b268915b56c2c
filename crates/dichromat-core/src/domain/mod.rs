//! Core domain types for color-vision screening.

mod answer;
mod catalog;
mod color;
mod deficiency;
mod outcome;

pub use answer::AnswerRecord;
pub use catalog::{sha256_hex, Catalog, CatalogEntry, CatalogStats, SESSION_COMPOSITION};
pub use color::Color;
pub use deficiency::{DeficiencyType, Dichromacy, ImageIndex};
pub use outcome::{Confidence, ErrorBreakdown, Outcome, SuspectedType, VisionStatus};
