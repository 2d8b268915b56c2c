//! Deterministic screening plates.
//!
//! Every plate is a function of `(salt, session_id, index)`: the derived
//! seed picks the hidden number and drives every random draw while
//! rendering, so the same inputs always give the same bytes.

mod glyph;
mod schedule;

use std::f64::consts::TAU;

use image::{GrayImage, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use glyph::number_mask;
pub use schedule::{candidates, palette, scheduled_type, Palette};

use crate::domain::{Color, DeficiencyType, ImageIndex};
use crate::encode::{encode_png, PlateFormat};
use crate::error::{CoreError, Result};

/// Salt used when none is configured.
pub const DEFAULT_SALT: &str = "dicromat-salt";
/// Plate edge length in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 400;
/// Smallest supported edge length.
pub const MIN_IMAGE_SIZE: u32 = 64;
/// Largest supported edge length.
pub const MAX_IMAGE_SIZE: u32 = 4096;

const DOT_COUNT_MIN: u32 = 500;
const DOT_COUNT_MAX: u32 = 800;
const DOT_SIZE_MIN: i32 = 8;
const DOT_SIZE_MAX: i32 = 20;
const COLOR_JITTER: i16 = 25;
/// Gap between the plate circle and the canvas edge.
const MARGIN: u32 = 10;
/// Mask values above this count as foreground.
const MASK_THRESHOLD: u8 = 128;

/// The pair a plate is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateSpec {
    /// What the plate screens for.
    #[serde(rename = "dichromism_type")]
    pub deficiency_type: DeficiencyType,
    /// Hidden number, 0..=99.
    pub correct_answer: u8,
}

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateConfig {
    /// Server-side secret mixed into every seed.
    pub salt: String,
    /// Edge length of the square canvas.
    pub image_size: u32,
    /// Encoding for [`PlateRenderer::render_encoded`].
    pub format: PlateFormat,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_string(),
            image_size: DEFAULT_IMAGE_SIZE,
            format: PlateFormat::Png,
        }
    }
}

impl PlateConfig {
    /// Config with the given salt and default size.
    #[must_use]
    pub fn with_salt(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            ..Self::default()
        }
    }
}

/// Derives the plate seed: the first 8 bytes (big-endian) of
/// SHA-256 over `"{salt}-{session_id}-{index}"`.
#[must_use]
pub fn derive_seed(salt: &str, session_id: &str, index: ImageIndex) -> u64 {
    let digest = Sha256::digest(format!("{salt}-{session_id}-{index}").as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Renders screening plates.
#[derive(Debug, Clone)]
pub struct PlateRenderer {
    config: PlateConfig,
}

impl PlateRenderer {
    /// Creates a renderer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidParameter`] if the image size is outside
    /// [`MIN_IMAGE_SIZE`]..=[`MAX_IMAGE_SIZE`].
    pub fn new(config: PlateConfig) -> Result<Self> {
        if !(MIN_IMAGE_SIZE..=MAX_IMAGE_SIZE).contains(&config.image_size) {
            return Err(CoreError::InvalidParameter {
                parameter: "image_size".to_string(),
                value: format!(
                    "{} (expected {MIN_IMAGE_SIZE}..={MAX_IMAGE_SIZE})",
                    config.image_size
                ),
            });
        }
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlateConfig {
        &self.config
    }

    fn rng(&self, session_id: &str, index: ImageIndex) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(derive_seed(&self.config.salt, session_id, index))
    }

    /// Type and hidden number for plate `index` of a session.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ImageIndexOutOfRange`] outside `1..=10`.
    pub fn test_config(&self, session_id: &str, index: u32) -> Result<PlateSpec> {
        let index = ImageIndex::new(index)?;
        let deficiency_type = scheduled_type(index);
        let choices = candidates(deficiency_type);
        let mut rng = self.rng(session_id, index);
        let correct_answer = choices[rng.random_range(0..choices.len())];
        Ok(PlateSpec {
            deficiency_type,
            correct_answer,
        })
    }

    /// Renders the plate as a raw raster.
    ///
    /// `spec` is normally the result of [`Self::test_config`]; callers with
    /// their own schedule (batch pre-generation) may pass any spec.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ImageIndexOutOfRange`] outside `1..=10`, or
    /// [`CoreError::InvalidParameter`] for an answer above 99.
    #[allow(clippy::cast_possible_truncation)]
    pub fn render_image(&self, session_id: &str, index: u32, spec: PlateSpec) -> Result<RgbImage> {
        let index = ImageIndex::new(index)?;
        if spec.correct_answer > 99 {
            return Err(CoreError::InvalidParameter {
                parameter: "correct_answer".to_string(),
                value: format!("{} (expected 0..=99)", spec.correct_answer),
            });
        }

        let size = self.config.image_size;
        let colors = palette(spec.deficiency_type);
        let mask = number_mask(spec.correct_answer, size);
        let mut rng = self.rng(session_id, index);
        let mut canvas = RgbImage::from_pixel(size, size, Color::WHITE.into());

        let center = f64::from(size / 2);
        let radius = f64::from(size / 2 - MARGIN);
        let dot_count = rng.random_range(DOT_COUNT_MIN..=DOT_COUNT_MAX);
        tracing::trace!(session_id, %index, dot_count, "rendering plate");

        for _ in 0..dot_count {
            let angle = rng.random_range(0.0..TAU);
            let r = rng.random_range(0.0..radius);
            // Truncation toward zero picks the pixel the dot center falls in.
            let x = (center + r * angle.cos()) as i32;
            let y = (center + r * angle.sin()) as i32;
            let dot_size = rng.random_range(DOT_SIZE_MIN..=DOT_SIZE_MAX);

            let base = if is_lit(&mask, x, y) {
                colors.foreground
            } else {
                colors.background
            };
            let color = jitter(base, &mut rng);
            draw_filled_circle_mut(&mut canvas, (x, y), dot_size / 2, color.into());
        }

        clip_to_circle(&mut canvas, center, radius);
        Ok(canvas)
    }

    /// Renders the plate as PNG, the format used for serving.
    ///
    /// # Errors
    ///
    /// See [`Self::render_image`]; also fails if encoding fails.
    pub fn render(&self, session_id: &str, index: u32, spec: PlateSpec) -> Result<Vec<u8>> {
        encode_png(&self.render_image(session_id, index, spec)?)
    }

    /// Renders the plate in the configured format.
    ///
    /// # Errors
    ///
    /// See [`Self::render_image`]; also fails if encoding fails.
    pub fn render_encoded(&self, session_id: &str, index: u32, spec: PlateSpec) -> Result<Vec<u8>> {
        self.config
            .format
            .encode(&self.render_image(session_id, index, spec)?)
    }

    /// Derives the spec for a scheduled plate and renders it as PNG.
    ///
    /// # Errors
    ///
    /// Same as [`Self::test_config`] and [`Self::render`].
    pub fn render_scheduled(&self, session_id: &str, index: u32) -> Result<(PlateSpec, Vec<u8>)> {
        let spec = self.test_config(session_id, index)?;
        let png = self.render(session_id, index, spec)?;
        Ok((spec, png))
    }
}

fn is_lit(mask: &GrayImage, x: i32, y: i32) -> bool {
    match (u32::try_from(x), u32::try_from(y)) {
        (Ok(x), Ok(y)) if x < mask.width() && y < mask.height() => {
            mask.get_pixel(x, y).0[0] > MASK_THRESHOLD
        }
        _ => false,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jitter(base: Color, rng: &mut impl Rng) -> Color {
    base.channels()
        .map(|c| {
            let v = i16::from(c) + rng.random_range(-COLOR_JITTER..=COLOR_JITTER);
            v.clamp(0, 255) as u8
        })
        .into()
}

/// Paints everything outside the plate circle white.
pub(crate) fn clip_to_circle(canvas: &mut RgbImage, center: f64, radius: f64) {
    let r2 = radius * radius;
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        if dx * dx + dy * dy > r2 {
            *pixel = Color::WHITE.into();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn renderer() -> PlateRenderer {
        PlateRenderer::new(PlateConfig::default()).unwrap()
    }

    #[test]
    fn test_schedule_contract() {
        let r = renderer();
        for session in ["a", "b", "session-123", ""] {
            for i in 1..=10 {
                let spec = r.test_config(session, i).unwrap();
                let expected = match i {
                    1..=3 => DeficiencyType::PROTANOPIA,
                    4..=6 => DeficiencyType::DEUTERANOPIA,
                    7..=9 => DeficiencyType::TRITANOPIA,
                    _ => DeficiencyType::Control,
                };
                assert_eq!(spec.deficiency_type, expected, "session {session:?} index {i}");
                assert!(candidates(expected).contains(&spec.correct_answer));
            }
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let r = renderer();
        assert!(matches!(
            r.test_config("s", 0),
            Err(CoreError::ImageIndexOutOfRange(0))
        ));
        assert!(r.test_config("s", 11).is_err());
        let spec = PlateSpec {
            deficiency_type: DeficiencyType::Control,
            correct_answer: 7,
        };
        assert!(r.render("s", 11, spec).is_err());
    }

    #[test]
    fn test_answers_vary_across_sessions() {
        let r = renderer();
        let answers: std::collections::HashSet<u8> = (0..50)
            .map(|s| r.test_config(&format!("session-{s}"), 1).unwrap().correct_answer)
            .collect();
        assert!(answers.len() > 1);
    }

    #[test]
    fn test_answers_vary_across_indices() {
        // Indices 1 and 2 share a candidate list, so roughly one session in five agrees.
        let r = renderer();
        let same = (0..200)
            .filter(|s| {
                let session = format!("session-{s}");
                let first = r.test_config(&session, 1).unwrap();
                let second = r.test_config(&session, 2).unwrap();
                assert_eq!(first.deficiency_type, second.deficiency_type);
                first.correct_answer == second.correct_answer
            })
            .count();
        assert!(same < 200, "index never changed the answer");
        assert!(same > 0, "answers at indices 1 and 2 never coincide");
    }

    #[test]
    fn test_seed_depends_on_every_input() {
        let i1 = ImageIndex::new(1).unwrap();
        let i2 = ImageIndex::new(2).unwrap();
        let base = derive_seed("salt", "s", i1);
        assert_eq!(base, derive_seed("salt", "s", i1));
        assert_ne!(base, derive_seed("pepper", "s", i1));
        assert_ne!(base, derive_seed("salt", "t", i1));
        assert_ne!(base, derive_seed("salt", "s", i2));
    }

    #[test]
    fn test_seed_matches_known_digest() {
        // Schedules depend only on SHA-256 and ChaCha8, never on float math.
        let seed = derive_seed(DEFAULT_SALT, "session-1", ImageIndex::new(1).unwrap());
        assert_eq!(seed, 0x7709_6c4e_afa4_3a45);
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = renderer();
        let spec = r.test_config("s1", 3).unwrap();
        let a = r.render("s1", 3, spec).unwrap();
        let b = r.render("s1", 3, spec).unwrap();
        assert_eq!(a, b);
        let other = r.render("s2", 3, spec).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_render_output_shape() {
        let r = renderer();
        let (_, png) = r.render_scheduled("shape", 5).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (400, 400));
        // Corners lie outside the plate circle.
        assert_eq!(*decoded.get_pixel(0, 0), image::Rgb([255, 255, 255]));
        assert_eq!(*decoded.get_pixel(399, 399), image::Rgb([255, 255, 255]));
        // Something was drawn.
        assert!(decoded.pixels().any(|p| *p != image::Rgb([255, 255, 255])));
    }

    #[test]
    fn test_foreground_dots_use_foreground_palette() {
        let r = renderer();
        let spec = PlateSpec {
            deficiency_type: DeficiencyType::Control,
            correct_answer: 88,
        };
        let img = r.render_image("fg", 1, spec).unwrap();
        // Control foreground is dark grey, background mid grey; both appear.
        assert!(img.pixels().any(|p| p.0[0] < 80));
        assert!(img.pixels().any(|p| (120..=180).contains(&p.0[0])));
    }

    #[test]
    fn test_rejects_bad_size_and_answer() {
        let config = PlateConfig {
            image_size: 10,
            ..PlateConfig::default()
        };
        assert!(PlateRenderer::new(config).is_err());
        let spec = PlateSpec {
            deficiency_type: DeficiencyType::Control,
            correct_answer: 100,
        };
        assert!(renderer().render_image("s", 1, spec).is_err());
    }

    #[test]
    fn test_jpeg_encoding() {
        let config = PlateConfig {
            format: PlateFormat::Jpeg { quality: 85 },
            ..PlateConfig::default()
        };
        let r = PlateRenderer::new(config).unwrap();
        let spec = r.test_config("j", 10).unwrap();
        let bytes = r.render_encoded("j", 10, spec).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
