//! Catalog source port for reading pre-generated plates.

use crate::domain::{Catalog, CatalogEntry};

/// Port for reading a catalog and the plates it lists.
pub trait CatalogSource: Send + Sync {
    /// Loads and version-checks the catalog record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or is not a supported
    /// catalog.
    fn load(&self) -> anyhow::Result<Catalog>;

    /// Reads the encoded plate for `entry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plate cannot be read.
    fn read_plate(&self, entry: &CatalogEntry) -> anyhow::Result<Vec<u8>>;
}
