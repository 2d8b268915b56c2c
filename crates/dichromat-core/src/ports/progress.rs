//! Progress reporting port for batch generation.

use crate::domain::DeficiencyType;

/// Events emitted while pre-generating a batch.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Generation started.
    Started {
        /// Plates to generate.
        total: usize,
    },
    /// One plate was rendered and stored.
    Generated {
        /// Catalog id.
        id: u32,
        /// File name written.
        filename: String,
        /// What the plate screens for.
        deficiency_type: DeficiencyType,
        /// Hidden number.
        correct_answer: u8,
        /// Encoded size.
        bytes: u64,
    },
    /// All plates have been generated.
    Finished {
        /// Plates generated.
        generated: usize,
        /// Sum of encoded sizes.
        total_bytes: u64,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
