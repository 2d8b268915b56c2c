//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the engine and external adapters.

mod catalog_source;
mod plate_output;
mod progress;

pub use catalog_source::CatalogSource;
pub use plate_output::PlateOutput;
pub use progress::{ProgressEvent, ProgressSink};
