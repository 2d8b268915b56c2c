//! Test support utilities for dichromat.
//!
//! Provides answer-set and catalog builders plus mocks of the core ports.
//!
//! # Example
//!
//! ```
//! use dichromat_test_support::{AnswerSetBuilder, CatalogBuilder, MockCatalogSource};
//!
//! // A session that misses two protanopia plates
//! let answers = AnswerSetBuilder::all_correct().wrong(&[1, 2]).build();
//! assert_eq!(answers.len(), 10);
//!
//! // A catalog just large enough for one session
//! let (catalog, plates) = CatalogBuilder::minimal().build_with_plates();
//! let source = MockCatalogSource::new(catalog, plates);
//! ```

mod builders;
mod mocks;

pub use builders::{AnswerSetBuilder, CatalogBuilder};
pub use mocks::{MockCatalogSource, MockPlateOutput, MockProgressSink};
