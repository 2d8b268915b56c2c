//! Builders for answer sets and catalogs.

use std::collections::HashMap;

use dichromat_core::domain::{sha256_hex, AnswerRecord, Catalog, CatalogEntry, DeficiencyType, ImageIndex};

/// Plate type for a 1-based index in the standard schedule.
fn scheduled(index: u8) -> DeficiencyType {
    match index {
        1..=3 => DeficiencyType::PROTANOPIA,
        4..=6 => DeficiencyType::DEUTERANOPIA,
        7..=9 => DeficiencyType::TRITANOPIA,
        _ => DeficiencyType::Control,
    }
}

/// Builder for a session's answer records.
///
/// Starts from ten correct answers in schedule order.
#[derive(Debug, Clone)]
pub struct AnswerSetBuilder {
    records: Vec<AnswerRecord>,
}

impl AnswerSetBuilder {
    /// Ten correct answers; plate `i` hides the number `10 + i`.
    #[must_use]
    pub fn all_correct() -> Self {
        let records = ImageIndex::all()
            .map(|index| {
                let answer = 10 + index.get();
                AnswerRecord::new(index, scheduled(index.get()), answer, Some(answer))
            })
            .collect();
        Self { records }
    }

    /// Answers the given 1-based plates incorrectly.
    #[must_use]
    pub fn wrong(mut self, indices: &[u8]) -> Self {
        for record in &mut self.records {
            if indices.contains(&record.image_index.get()) {
                record.user_answer = Some(record.correct_answer.wrapping_add(1) % 100);
            }
        }
        self
    }

    /// Leaves the given 1-based plates unanswered.
    #[must_use]
    pub fn unanswered(mut self, indices: &[u8]) -> Self {
        for record in &mut self.records {
            if indices.contains(&record.image_index.get()) {
                record.user_answer = None;
            }
        }
        self
    }

    /// Keeps only the first `n` records.
    #[must_use]
    pub fn take(mut self, n: usize) -> Self {
        self.records.truncate(n);
        self
    }

    /// The records.
    #[must_use]
    pub fn build(self) -> Vec<AnswerRecord> {
        self.records
    }
}

/// Builder for in-memory catalogs with matching plate bytes.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    counts: [u32; 4],
    version: String,
}

impl CatalogBuilder {
    /// A catalog with the given number of entries per type, in
    /// protanopia, deuteranopia, tritanopia, control order.
    #[must_use]
    pub fn with_counts(counts: [u32; 4]) -> Self {
        Self {
            counts,
            version: Catalog::SUPPORTED_VERSION.to_string(),
        }
    }

    /// The standard 30/30/30/10 layout.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_counts([30, 30, 30, 10])
    }

    /// Exactly enough for one session.
    #[must_use]
    pub fn minimal() -> Self {
        Self::with_counts([3, 3, 3, 1])
    }

    /// Overrides the version string.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Builds the catalog and a fake plate body per file name.
    ///
    /// Each body is `plate-{id}`; the recorded hash and size match it.
    #[must_use]
    pub fn build_with_plates(self) -> (Catalog, HashMap<String, Vec<u8>>) {
        let mut images = Vec::new();
        let mut plates = HashMap::new();
        let mut id = 0u32;
        for (deficiency_type, n) in DeficiencyType::ALL.into_iter().zip(self.counts) {
            for _ in 0..n {
                let filename = format!("image_{id:03}.png");
                let body = format!("plate-{id}").into_bytes();
                images.push(CatalogEntry {
                    id,
                    filename: filename.clone(),
                    correct_answer: u8::try_from(10 + id % 80).unwrap_or(10),
                    deficiency_type,
                    difficulty: "medium".to_string(),
                    sha256: sha256_hex(&body),
                    file_size: body.len() as u64,
                });
                plates.insert(filename, body);
                id += 1;
            }
        }
        let mut catalog = Catalog::new(images, Some("test-seed".to_string()), None);
        catalog.version = self.version;
        (catalog, plates)
    }

    /// Builds only the catalog.
    #[must_use]
    pub fn build(self) -> Catalog {
        self.build_with_plates().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_set_defaults() {
        let records = AnswerSetBuilder::all_correct().build();
        assert_eq!(records.len(), 10);
        assert!(records.iter().all(AnswerRecord::is_correct));
        assert_eq!(records[9].deficiency_type, DeficiencyType::Control);
    }

    #[test]
    fn test_answer_set_modifiers() {
        let records = AnswerSetBuilder::all_correct()
            .wrong(&[1])
            .unanswered(&[2])
            .take(5)
            .build();
        assert_eq!(records.len(), 5);
        assert!(!records[0].is_correct());
        assert_eq!(records[1].user_answer, None);
        assert!(records[2].is_correct());
    }

    #[test]
    fn test_catalog_builder_hashes_match() {
        let (catalog, plates) = CatalogBuilder::minimal().build_with_plates();
        assert_eq!(catalog.images.len(), 10);
        for entry in &catalog.images {
            assert!(catalog.verify_integrity(entry.id, &plates[&entry.filename]));
        }
    }
}
