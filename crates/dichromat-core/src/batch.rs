//! Batch pre-generation of catalog plates.
//!
//! Plate ids are split into type buckets by position (30% protanopia,
//! 30% deuteranopia, 30% tritanopia, 10% control). Each plate is rendered
//! with the batch seed as salt and a per-id session, so a batch is fully
//! reproducible from its seed.

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::domain::{sha256_hex, Catalog, CatalogEntry, DeficiencyType};
use crate::encode::PlateFormat;
use crate::plate::{PlateConfig, PlateRenderer, PlateSpec, DEFAULT_IMAGE_SIZE};
use crate::ports::{PlateOutput, ProgressEvent, ProgressSink};

/// Plates generated when no count is given.
pub const DEFAULT_BATCH_COUNT: u32 = 100;

/// Difficulty tag written for every generated plate.
const DIFFICULTY: &str = "medium";

/// Batch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of plates.
    pub count: u32,
    /// Batch seed; also the render salt.
    pub seed: String,
    /// Encoding for the plate files.
    pub format: PlateFormat,
    /// Plate edge length.
    pub image_size: u32,
}

impl BatchConfig {
    /// Config for `seed` with default count, PNG and default size.
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            count: DEFAULT_BATCH_COUNT,
            seed: seed.into(),
            format: PlateFormat::Png,
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }
}

/// Type of plate `id` in a batch of `count`.
#[must_use]
pub fn bucket(id: u32, count: u32) -> DeficiencyType {
    let (id, count) = (u64::from(id) * 10, u64::from(count));
    if id < 3 * count {
        DeficiencyType::PROTANOPIA
    } else if id < 6 * count {
        DeficiencyType::DEUTERANOPIA
    } else if id < 9 * count {
        DeficiencyType::TRITANOPIA
    } else {
        DeficiencyType::Control
    }
}

/// Hidden number for plate `id`, uniform in 10..=89.
#[must_use]
pub fn batch_answer(seed: &str, id: u32) -> u8 {
    let mut key = [0u8; 32];
    key.copy_from_slice(&Sha256::digest(format!("{seed}-{id}").as_bytes()));
    ChaCha8Rng::from_seed(key).random_range(10..=89)
}

/// File name for plate `id`.
#[must_use]
pub fn batch_filename(id: u32, format: PlateFormat) -> String {
    format!("image_{id:03}.{}", format.extension())
}

/// Renders every plate, stores it through `output` and returns the catalog,
/// which is also written through `output`.
///
/// # Errors
///
/// Returns an error if the renderer rejects the config, a plate fails to
/// encode, or the output cannot be written.
pub fn generate_batch(
    config: &BatchConfig,
    generated_at: Option<String>,
    output: &dyn PlateOutput,
    progress: &dyn ProgressSink,
) -> anyhow::Result<Catalog> {
    let renderer = PlateRenderer::new(PlateConfig {
        salt: config.seed.clone(),
        image_size: config.image_size,
        format: config.format,
    })?;

    progress.on_event(ProgressEvent::Started {
        total: config.count as usize,
    });

    let mut images = Vec::with_capacity(config.count as usize);
    let mut total_bytes = 0;
    for id in 0..config.count {
        let spec = PlateSpec {
            deficiency_type: bucket(id, config.count),
            correct_answer: batch_answer(&config.seed, id),
        };
        let bytes = renderer
            .render_encoded(&format!("pregenerated-{id}"), 1, spec)
            .with_context(|| format!("failed to render plate {id}"))?;
        let filename = batch_filename(id, config.format);
        output.write_plate(&filename, &bytes)?;

        let file_size = bytes.len() as u64;
        total_bytes += file_size;
        progress.on_event(ProgressEvent::Generated {
            id,
            filename: filename.clone(),
            deficiency_type: spec.deficiency_type,
            correct_answer: spec.correct_answer,
            bytes: file_size,
        });
        images.push(CatalogEntry {
            id,
            filename,
            correct_answer: spec.correct_answer,
            deficiency_type: spec.deficiency_type,
            difficulty: DIFFICULTY.to_string(),
            sha256: sha256_hex(&bytes),
            file_size,
        });
    }

    let catalog = Catalog::new(images, Some(config.seed.clone()), generated_at);
    output.write_catalog(&catalog)?;
    progress.on_event(ProgressEvent::Finished {
        generated: catalog.images.len(),
        total_bytes,
    });
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_for_one_hundred() {
        let counts = |t| (0..100).filter(|&i| bucket(i, 100) == t).count();
        assert_eq!(counts(DeficiencyType::PROTANOPIA), 30);
        assert_eq!(counts(DeficiencyType::DEUTERANOPIA), 30);
        assert_eq!(counts(DeficiencyType::TRITANOPIA), 30);
        assert_eq!(counts(DeficiencyType::Control), 10);
        assert_eq!(bucket(29, 100), DeficiencyType::PROTANOPIA);
        assert_eq!(bucket(30, 100), DeficiencyType::DEUTERANOPIA);
        assert_eq!(bucket(90, 100), DeficiencyType::Control);
    }

    #[test]
    fn test_ten_plates_fill_one_session() {
        let types: Vec<_> = (0..10).map(|i| bucket(i, 10)).collect();
        assert_eq!(types[..3], [DeficiencyType::PROTANOPIA; 3]);
        assert_eq!(types[9], DeficiencyType::Control);
    }

    #[test]
    fn test_answers_in_range_and_stable() {
        for id in 0..200 {
            let a = batch_answer("seed", id);
            assert!((10..=89).contains(&a));
            assert_eq!(a, batch_answer("seed", id));
        }
        let a: Vec<u8> = (0..20).map(|i| batch_answer("one", i)).collect();
        let b: Vec<u8> = (0..20).map(|i| batch_answer("two", i)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_filenames() {
        assert_eq!(batch_filename(7, PlateFormat::Png), "image_007.png");
        assert_eq!(
            batch_filename(123, PlateFormat::Jpeg { quality: 90 }),
            "image_123.jpeg"
        );
    }
}
