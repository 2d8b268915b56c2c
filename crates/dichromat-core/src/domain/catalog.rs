//! Catalog of pre-generated plates.
//!
//! The catalog is produced by the batch generator and read by the session
//! sampler. It is versioned; consumers reject versions they do not know.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::DeficiencyType;
use crate::error::{CoreError, Result};

/// Plates drawn per type for one session, in plate-index order.
pub const SESSION_COMPOSITION: [(DeficiencyType, usize); 4] = [
    (DeficiencyType::PROTANOPIA, 3),
    (DeficiencyType::DEUTERANOPIA, 3),
    (DeficiencyType::TRITANOPIA, 3),
    (DeficiencyType::Control, 1),
];

/// One pre-generated plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Numeric id, unique within the catalog.
    pub id: u32,
    /// File name relative to the catalog directory.
    pub filename: String,
    /// The number hidden in the plate.
    pub correct_answer: u8,
    /// What the plate screens for.
    #[serde(rename = "dichromism_type")]
    pub deficiency_type: DeficiencyType,
    /// Free-form difficulty tag.
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
    /// File size in bytes.
    pub file_size: u64,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

/// The on-disk catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Format version.
    pub version: String,
    /// RFC 3339 generation time, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Number of images the generator was asked for.
    pub total_images: usize,
    /// Seed the batch was generated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// The plates.
    pub images: Vec<CatalogEntry>,
}

/// Summary figures for a catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    /// Number of entries.
    pub total_images: usize,
    /// Protanopia entries.
    pub protanopia_count: usize,
    /// Deuteranopia entries.
    pub deuteranopia_count: usize,
    /// Tritanopia entries.
    pub tritanopia_count: usize,
    /// Control entries.
    pub control_count: usize,
    /// Sum of file sizes.
    pub total_size_bytes: u64,
    /// Sum of file sizes in MiB.
    pub total_size_mb: f64,
    /// Generation time.
    pub generated_at: Option<String>,
    /// Format version.
    pub version: String,
}

impl Catalog {
    /// The only version this crate reads and writes.
    pub const SUPPORTED_VERSION: &'static str = "1.0";

    /// Creates a catalog at the supported version.
    #[must_use]
    pub fn new(images: Vec<CatalogEntry>, seed: Option<String>, generated_at: Option<String>) -> Self {
        Self {
            version: Self::SUPPORTED_VERSION.to_string(),
            generated_at,
            total_images: images.len(),
            seed,
            images,
        }
    }

    /// Parses and version-checks a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CatalogParse`] for malformed JSON,
    /// [`CoreError::UnsupportedFormat`] for an unknown version and
    /// [`CoreError::DuplicateEntryId`] when an id repeats.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.check_version()?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    /// Serializes the catalog as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CatalogParse`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects versions other than [`Self::SUPPORTED_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedFormat`].
    pub fn check_version(&self) -> Result<()> {
        if self.version == Self::SUPPORTED_VERSION {
            Ok(())
        } else {
            Err(CoreError::UnsupportedFormat {
                version: self.version.clone(),
            })
        }
    }

    /// Rejects catalogs where two entries share an id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateEntryId`] for the first repeated id.
    pub fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.images.len());
        match self.images.iter().find(|e| !seen.insert(e.id)) {
            Some(dup) => Err(CoreError::DuplicateEntryId(dup.id)),
            None => Ok(()),
        }
    }

    /// Entries tagged with `deficiency_type`, in catalog order.
    pub fn pool(&self, deficiency_type: DeficiencyType) -> Vec<&CatalogEntry> {
        self.images
            .iter()
            .filter(|e| e.deficiency_type == deficiency_type)
            .collect()
    }

    /// Checks every type holds enough entries for one session.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CatalogInsufficient`] for the first short pool.
    pub fn check_pools(&self) -> Result<()> {
        for (deficiency_type, required) in SESSION_COMPOSITION {
            let available = self.pool(deficiency_type).len();
            if available < required {
                return Err(CoreError::CatalogInsufficient {
                    deficiency_type,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Looks up an entry by id.
    #[must_use]
    pub fn entry(&self, id: u32) -> Option<&CatalogEntry> {
        self.images.iter().find(|e| e.id == id)
    }

    /// Looks up an entry by file name.
    #[must_use]
    pub fn entry_by_filename(&self, filename: &str) -> Option<&CatalogEntry> {
        self.images.iter().find(|e| e.filename == filename)
    }

    /// Checks `bytes` against the recorded SHA-256 of entry `id`.
    ///
    /// Unknown ids never verify.
    #[must_use]
    pub fn verify_integrity(&self, id: u32, bytes: &[u8]) -> bool {
        self.entry(id)
            .is_some_and(|e| e.sha256.eq_ignore_ascii_case(&sha256_hex(bytes)))
    }

    /// Computes summary figures.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics(&self) -> CatalogStats {
        let count = |t| self.images.iter().filter(|e| e.deficiency_type == t).count();
        let total_size_bytes: u64 = self.images.iter().map(|e| e.file_size).sum();
        CatalogStats {
            total_images: self.images.len(),
            protanopia_count: count(DeficiencyType::PROTANOPIA),
            deuteranopia_count: count(DeficiencyType::DEUTERANOPIA),
            tritanopia_count: count(DeficiencyType::TRITANOPIA),
            control_count: count(DeficiencyType::Control),
            total_size_bytes,
            total_size_mb: total_size_bytes as f64 / 1024.0 / 1024.0,
            generated_at: self.generated_at.clone(),
            version: self.version.clone(),
        }
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
