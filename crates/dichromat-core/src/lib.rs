//! Dichromat Core - deterministic plate synthesis and screening analysis
//!
//! This crate contains the domain types, colorimetry and dichromat simulation,
//! the plate and parameter-explorer generators, the catalog sampler, and the
//! results analyzer. Nothing here performs I/O; adapters sit behind [`ports`].

pub mod analyzer;
pub mod batch;
pub mod colorimetry;
pub mod domain;
pub mod encode;
mod error;
pub mod explorer;
pub mod plate;
pub mod ports;
pub mod sampler;
pub mod simulate;

pub use analyzer::classify;
pub use domain::{
    AnswerRecord, Catalog, CatalogEntry, CatalogStats, Color, Confidence, DeficiencyType,
    Dichromacy, ErrorBreakdown, ImageIndex, Outcome, SuspectedType, VisionStatus,
};
pub use encode::PlateFormat;
pub use error::{CoreError, Result};
pub use explorer::{ExplorerImage, ExplorerParams};
pub use plate::{PlateConfig, PlateRenderer, PlateSpec};
pub use ports::{CatalogSource, PlateOutput, ProgressEvent, ProgressSink};
pub use sampler::{map_session_to_catalog, SessionAssignment};
pub use simulate::{simulate_color, simulate_image};
