//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use dichromat_core::domain::{Catalog, CatalogEntry};
use dichromat_core::ports::{CatalogSource, PlateOutput, ProgressEvent, ProgressSink};

/// Mock implementation of `CatalogSource` for testing.
///
/// Serves an in-memory catalog and counts loads for assertions.
pub struct MockCatalogSource {
    catalog: Option<Catalog>,
    plates: HashMap<String, Vec<u8>>,
    load_count: Arc<Mutex<usize>>,
}

impl MockCatalogSource {
    /// Creates a source serving `catalog` and `plates`, keyed by file name.
    #[must_use]
    pub fn new(catalog: Catalog, plates: HashMap<String, Vec<u8>>) -> Self {
        Self {
            catalog: Some(catalog),
            plates,
            load_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a source whose every load fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            catalog: None,
            plates: HashMap::new(),
            load_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Replaces the body served for `filename`.
    #[must_use]
    pub fn with_plate(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.plates.insert(filename.into(), bytes);
        self
    }

    /// Returns the number of times the catalog has been loaded.
    #[must_use]
    pub fn load_count(&self) -> usize {
        *self.load_count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CatalogSource for MockCatalogSource {
    fn load(&self) -> anyhow::Result<Catalog> {
        *self.load_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        let catalog = self.catalog.clone().ok_or_else(|| anyhow!("mock catalog unavailable"))?;
        catalog.check_version()?;
        Ok(catalog)
    }

    fn read_plate(&self, entry: &CatalogEntry) -> anyhow::Result<Vec<u8>> {
        self.plates
            .get(&entry.filename)
            .cloned()
            .ok_or_else(|| anyhow!("no plate named {}", entry.filename))
    }
}

/// Mock implementation of `PlateOutput` for testing.
///
/// Captures plates and the catalog for later assertions.
pub struct MockPlateOutput {
    plates: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    catalog: Arc<Mutex<Option<Catalog>>>,
}

impl MockPlateOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plates: Arc::new(Mutex::new(Vec::new())),
            catalog: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns all captured plates in write order.
    #[must_use]
    pub fn plates(&self) -> Vec<(String, Vec<u8>)> {
        self.plates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the captured catalog, if written.
    #[must_use]
    pub fn catalog(&self) -> Option<Catalog> {
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockPlateOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl PlateOutput for MockPlateOutput {
    fn write_plate(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.plates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn write_catalog(&self, catalog: &Catalog) -> anyhow::Result<()> {
        *self.catalog.lock().unwrap_or_else(PoisonError::into_inner) = Some(catalog.clone());
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Generated` events.
    #[must_use]
    pub fn generated_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Generated { .. }))
            .count()
    }

    /// Returns the totals from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, u64)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                generated,
                total_bytes,
            } => Some((*generated, *total_bytes)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
