//! Output port for batch pre-generation.

use crate::domain::Catalog;

/// Port for persisting generated plates and their catalog.
pub trait PlateOutput: Send + Sync {
    /// Stores one encoded plate under `filename`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plate cannot be written.
    fn write_plate(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<()>;

    /// Stores the catalog record once every plate is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write_catalog(&self, catalog: &Catalog) -> anyhow::Result<()>;
}
